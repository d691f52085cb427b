// SPDX-License-Identifier: MIT

//! Immutable, id-keyed survey graph

use std::collections::HashMap;

use crate::intake::analysis::TriggerRule;
use crate::intake::error::{GraphError, IntakeError};
use crate::intake::survey::types::{QuestionNode, SurveyDefinition};

use super::{orderer, validator};

/// A survey graph ready to be navigated
///
/// Nodes are stored by id so any number of transitions can point at the
/// same node. Built once per survey version and shared read-only between
/// runs.
#[derive(Debug, Clone)]
pub struct SurveyGraph {
    name: String,
    version: String,
    start_node: String,
    nodes: HashMap<String, QuestionNode>,
    node_order: Vec<String>, // Authored order
    rules: Vec<TriggerRule>,
}

impl SurveyGraph {
    /// Build a graph, checking only what navigation cannot work without
    pub fn new(def: &SurveyDefinition) -> Result<Self, GraphError> {
        if def.start_node.trim().is_empty() {
            return Err(GraphError::MissingStartNode);
        }

        let mut nodes = HashMap::with_capacity(def.nodes.len());
        let mut node_order = Vec::with_capacity(def.nodes.len());
        for node in &def.nodes {
            if nodes.insert(node.id.clone(), node.clone()).is_some() {
                return Err(GraphError::DuplicateNode(node.id.clone()));
            }
            node_order.push(node.id.clone());
        }

        if !nodes.contains_key(&def.start_node) {
            return Err(GraphError::UnknownNode(def.start_node.clone()));
        }

        Ok(Self {
            name: def.name.clone(),
            version: def.version.clone(),
            start_node: def.start_node.clone(),
            nodes,
            node_order,
            rules: def.analysis_rules.clone(),
        })
    }

    /// Validate the full definition first and refuse to build on any error
    pub fn publish(def: &SurveyDefinition) -> Result<Self, IntakeError> {
        let report = validator::validate(def);
        for warning in &report.warnings {
            log::warn!("Survey '{}': {}", def.name, warning.message);
        }
        if !report.is_valid() {
            return Err(IntakeError::invalid_survey(def.name.clone(), report));
        }
        Ok(Self::new(def)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn start_node(&self) -> &str {
        &self.start_node
    }

    pub fn node(&self, id: &str) -> Option<&QuestionNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Nodes in authored order
    pub fn nodes(&self) -> impl Iterator<Item = &QuestionNode> {
        self.node_order.iter().map(|id| &self.nodes[id])
    }

    pub fn len(&self) -> usize {
        self.node_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_order.is_empty()
    }

    /// Clinician rules shipped with this survey
    pub fn rules(&self) -> &[TriggerRule] {
        &self.rules
    }

    /// Linear reading order of all nodes, longest branch first
    pub fn reading_order(&self) -> Vec<String> {
        let nodes: Vec<QuestionNode> = self.nodes().cloned().collect();
        orderer::order(&nodes, &self.start_node)
    }
}

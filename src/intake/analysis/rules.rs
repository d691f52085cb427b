// SPDX-License-Identifier: MIT

//! Clinician rule evaluation
//!
//! A rule is evaluated in two levels. Triggers are grouped by the node they
//! inspect and a group is satisfied when any of its triggers matches (OR
//! within a node). The groups are then reduced by the rule's mode: `any`
//! needs one satisfied group, `all` needs every group (AND across nodes).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::intake::survey::answer::{Answer, AnswerMap};

use super::palette::TriggerColor;
use super::trigger::Trigger;

/// A clinician-authored warning rule
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct TriggerRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub triggers: Vec<Trigger>,
    #[serde(default)]
    pub trigger_mode: TriggerMode,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub color: TriggerColor,
}

/// How per-node results combine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TriggerMode {
    /// At least one node matches
    #[default]
    Any,
    /// Every referenced node matches
    All,
}

/// A rule that fired, ready for the clinician report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub message: String,
    pub color: TriggerColor,
}

/// Triggers that inspect the same node
#[derive(Debug)]
pub struct TriggerGroup<'a> {
    pub node_id: &'a str,
    pub triggers: Vec<&'a Trigger>,
}

impl TriggerGroup<'_> {
    /// OR within the node
    pub fn is_satisfied(&self, answer: Option<&Answer>) -> bool {
        self.triggers.iter().any(|t| t.matches(answer))
    }
}

impl TriggerRule {
    /// Group triggers by node, in order of first appearance
    pub fn groups(&self) -> Vec<TriggerGroup<'_>> {
        let mut groups: Vec<TriggerGroup<'_>> = Vec::new();
        for trigger in &self.triggers {
            match groups.iter_mut().find(|g| g.node_id == trigger.node_id) {
                Some(group) => group.triggers.push(trigger),
                None => groups.push(TriggerGroup {
                    node_id: &trigger.node_id,
                    triggers: vec![trigger],
                }),
            }
        }
        groups
    }

    /// Whether the rule fires for a set of answers.
    ///
    /// A rule without triggers never fires, in either mode.
    pub fn fires(&self, answers: &AnswerMap) -> bool {
        let groups = self.groups();
        if groups.is_empty() {
            return false;
        }

        let mut satisfied = groups
            .iter()
            .map(|group| group.is_satisfied(answers.get(group.node_id)));

        match self.trigger_mode {
            TriggerMode::Any => satisfied.any(|s| s),
            TriggerMode::All => satisfied.all(|s| s),
        }
    }

    fn has_message(&self) -> bool {
        !self.message.trim().is_empty()
    }
}

/// Evaluate every rule against a completed answer set, in rule order
pub fn evaluate_rules(rules: &[TriggerRule], answers: &AnswerMap) -> Vec<Finding> {
    rules
        .iter()
        .filter(|rule| rule.has_message())
        .filter(|rule| rule.fires(answers))
        .map(|rule| {
            log::debug!(
                "Rule {:?} fired: {}",
                rule.name.as_deref().unwrap_or("unnamed"),
                rule.message.trim()
            );
            Finding {
                name: rule.name.clone(),
                message: rule.message.trim().to_string(),
                color: rule.color,
            }
        })
        .collect()
}

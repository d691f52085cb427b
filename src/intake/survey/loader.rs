//! Survey loader - YAML and JSON file loading
//!
//! This module handles loading survey definitions from disk. The format is
//! picked from the file extension; anything other than `.json` is read as
//! YAML.

use super::graph::SurveyGraph;
use super::types::SurveyDefinition;
use crate::intake::error::IntakeError;
use std::fs;
use std::path::Path;

/// Loads survey definitions from YAML or JSON files
pub struct SurveyLoader;

impl SurveyLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a survey definition from a file
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<SurveyDefinition, IntakeError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            IntakeError::config(format!("Cannot read survey {}: {}", path.display(), e))
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let def = if is_json {
            Self::parse_json(&content)?
        } else {
            Self::parse_yaml(&content)?
        };
        log::info!(
            "Loaded survey '{}' v{} ({} nodes) from {}",
            def.name,
            def.version,
            def.nodes.len(),
            path.display()
        );
        Ok(def)
    }

    /// Load, validate and build a survey graph in one step
    pub fn load_graph<P: AsRef<Path>>(&self, path: P) -> Result<SurveyGraph, IntakeError> {
        let def = self.load(path)?;
        SurveyGraph::publish(&def)
    }

    /// Parse a survey definition from a YAML string
    pub fn parse_yaml(content: &str) -> Result<SurveyDefinition, IntakeError> {
        let def: SurveyDefinition = serde_yaml::from_str(content)?;
        Ok(def)
    }

    /// Parse a survey definition from a JSON string
    pub fn parse_json(content: &str) -> Result<SurveyDefinition, IntakeError> {
        let def: SurveyDefinition = serde_json::from_str(content)?;
        Ok(def)
    }
}

impl Default for SurveyLoader {
    fn default() -> Self {
        Self::new()
    }
}

// SPDX-License-Identifier: MIT

//! Typed error handling for intake-rs
//!
//! Malformed conditions and unanswered questions are not errors at all;
//! they evaluate to "no match". Only contradictions in a survey's own
//! structure, and answers that break a node's constraints, surface here.

use thiserror::Error;

use crate::intake::survey::graph::ValidationReport;

/// Top-level error type for intake-rs
#[derive(Debug, Error)]
pub enum IntakeError {
    /// Structural defect in a survey graph
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// A run could not proceed
    #[error("Run error: {0}")]
    Run(#[from] RunError),

    /// Survey failed validation before publishing
    #[error("Survey '{name}' is invalid: {errors} error(s)")]
    InvalidSurvey {
        name: String,
        errors: usize,
        report: ValidationReport,
    },

    /// Configuration errors (bad env vars, missing survey files)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Structural defects of a survey graph
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GraphError {
    /// The survey names no start node
    #[error("Survey has no start node")]
    MissingStartNode,

    /// A node id referenced at runtime does not exist
    #[error("Node '{0}' not found in survey")]
    UnknownNode(String),

    /// Two nodes share the same id
    #[error("Duplicate node id: {0}")]
    DuplicateNode(String),

    /// A transition points at a node that does not exist
    #[error("Node '{node_id}' transitions to missing node '{target}'")]
    DanglingTarget { node_id: String, target: String },

    /// A non-terminal node resolved to no next node
    #[error("Node '{0}' has no matching transition and is not terminal")]
    DeadEnd(String),
}

/// Condition text that matches none of the supported forms
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConditionError {
    #[error("Unrecognized condition: {0}")]
    Unrecognized(String),

    #[error("Invalid number '{literal}' in condition: {condition}")]
    InvalidNumber { condition: String, literal: String },
}

/// An answer rejected by the constraints of its node
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnswerError {
    #[error("Node '{0}' requires an answer")]
    Required(String),

    #[error("Value {value} for node '{node_id}' is outside [{min}, {max}]")]
    OutOfRange {
        node_id: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Option '{option}' is not defined on node '{node_id}'")]
    UnknownOption { node_id: String, option: String },

    #[error("Node '{node_id}' accepts a single selection")]
    ExpectedSingle { node_id: String },

    #[error("Exclusive option '{option}' on node '{node_id}' cannot be combined")]
    ExclusiveConflict { node_id: String, option: String },

    #[error("Text for node '{node_id}' exceeds {max_length} characters")]
    TooLong { node_id: String, max_length: usize },
}

/// Errors raised while advancing a single run
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RunError {
    #[error(transparent)]
    Answer(#[from] AnswerError),

    /// Fatal for the run touching the defect, harmless to every other run
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Run already completed at node '{0}'")]
    AlreadyCompleted(String),

    /// Jumps may only go back to a node on the active path
    #[error("Node '{0}' has not been visited in this run")]
    NotVisited(String),
}

impl IntakeError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid-survey error from a failed validation report
    pub fn invalid_survey(name: impl Into<String>, report: ValidationReport) -> Self {
        Self::InvalidSurvey {
            name: name.into(),
            errors: report.errors.len(),
            report,
        }
    }
}

impl GraphError {
    pub fn dangling(node_id: impl Into<String>, target: impl Into<String>) -> Self {
        Self::DanglingTarget {
            node_id: node_id.into(),
            target: target.into(),
        }
    }
}

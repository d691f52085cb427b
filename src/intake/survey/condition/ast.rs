// SPDX-License-Identifier: MIT

//! Abstract Syntax Tree for transition conditions

use std::fmt;

/// A parsed transition condition
///
/// Each variant is one of the closed set of forms the editor produces.
/// Combinators, if ever added, belong here as new variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `selected == "<id>"`
    SelectedEquals(String),
    /// `"<id>" in selected`
    InSelected(String),
    /// `value <op> <n>`
    Value { op: CompareOp, threshold: f64 },
    /// `"<substr>" in text`
    InText(String),
}

/// Numeric comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// >=
    Gte,
    /// >
    Gt,
    /// <=
    Lte,
    /// <
    Lt,
}

impl CompareOp {
    pub fn apply(&self, left: f64, right: f64) -> bool {
        match self {
            CompareOp::Gte => left >= right,
            CompareOp::Gt => left > right,
            CompareOp::Lte => left <= right,
            CompareOp::Lt => left < right,
        }
    }
}

impl Condition {
    /// Option id this condition refers to, if any
    pub fn option_ref(&self) -> Option<&str> {
        match self {
            Condition::SelectedEquals(id) | Condition::InSelected(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Gte => write!(f, ">="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Lte => write!(f, "<="),
            CompareOp::Lt => write!(f, "<"),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::SelectedEquals(id) => write!(f, "selected == \"{}\"", id),
            Condition::InSelected(id) => write!(f, "\"{}\" in selected", id),
            Condition::Value { op, threshold } => write!(f, "value {} {}", op, threshold),
            Condition::InText(needle) => write!(f, "\"{}\" in text", needle),
        }
    }
}

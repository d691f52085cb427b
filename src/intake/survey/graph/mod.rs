// SPDX-License-Identifier: MIT

//! Survey graph structure
//!
//! This module provides the id-keyed graph runs navigate over, transition
//! resolution, the display ordering used by the rule editor, and
//! authoring-time validation.

mod index;
pub mod orderer;
pub mod resolver;
pub mod validator;

pub use index::SurveyGraph;
pub use orderer::order;
pub use resolver::resolve;
pub use validator::{validate, IssueKind, ValidationIssue, ValidationReport};

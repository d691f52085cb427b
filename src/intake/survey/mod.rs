// SPDX-License-Identifier: MIT

//! Survey definitions, graph navigation and answer handling

pub mod answer;
pub mod condition;
pub mod graph;
pub mod loader;
pub mod run;
pub mod types;

pub use answer::{Answer, AnswerMap, Selection};
pub use graph::SurveyGraph;
pub use loader::SurveyLoader;
pub use run::{Advance, Navigator, RunState};
pub use types::{NodeKind, QuestionNode, SurveyDefinition, TransitionRule};

// SPDX-License-Identifier: MIT

//! Transition conditions
//!
//! A condition is a single predicate over the answer just given, e.g.
//! - `selected == "yes"`
//! - `"cough" in selected`
//! - `value >= 7`
//! - `"blood" in text`

mod ast;
mod evaluator;
mod parser;

pub use ast::{CompareOp, Condition};
pub use evaluator::{evaluate, evaluate_condition};
pub use parser::parse;

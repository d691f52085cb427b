// SPDX-License-Identifier: MIT

//! Clinician warning rules evaluated over finished runs

pub mod palette;
pub mod report;
pub mod rules;
pub mod trigger;

pub use palette::{Palette, TriggerColor};
pub use report::AnalysisReport;
pub use rules::{evaluate_rules, Finding, TriggerMode, TriggerRule};
pub use trigger::{MatchMode, Trigger};

// SPDX-License-Identifier: MIT

//! Questionnaire logic core: branching survey graphs, per-run navigation
//! and clinician warning rules.

pub mod intake;

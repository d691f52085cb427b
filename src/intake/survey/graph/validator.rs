// SPDX-License-Identifier: MIT

//! Authoring-time validation of survey definitions
//!
//! Errors block publishing; warnings are shown to the author but a survey
//! with warnings can still run.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::intake::analysis::{MatchMode, TriggerRule};
use crate::intake::survey::condition;
use crate::intake::survey::types::{NodeKind, QuestionNode, SurveyDefinition};

use super::resolver::fallback_rule;

/// What a validation finding is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingStartNode,
    StartNodeNotFound,
    DuplicateNode,
    MissingQuestionText,
    MissingOptions,
    MissingBounds,
    InvalidBounds,
    DanglingTarget,
    MultipleDefaults,
    UnrecognizedCondition,
    DeadEnd,
    PossibleDeadEnd,
    UnknownOption,
    NoFinalNode,
    NoTransitions,
    Unreachable,
    Cycle,
    UnknownTriggerNode,
    InvalidTrigger,
    InertRule,
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    pub message: String,
}

/// Result of validating a survey definition
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_error(&self, kind: IssueKind) -> bool {
        self.errors.iter().any(|i| i.kind == kind)
    }

    pub fn has_warning(&self, kind: IssueKind) -> bool {
        self.warnings.iter().any(|i| i.kind == kind)
    }

    fn error(&mut self, kind: IssueKind, node_id: Option<&str>, message: String) {
        self.errors.push(ValidationIssue {
            kind,
            node_id: node_id.map(str::to_string),
            message,
        });
    }

    fn warning(&mut self, kind: IssueKind, node_id: Option<&str>, message: String) {
        self.warnings.push(ValidationIssue {
            kind,
            node_id: node_id.map(str::to_string),
            message,
        });
    }
}

/// Validate a survey definition
pub fn validate(def: &SurveyDefinition) -> ValidationReport {
    let mut report = ValidationReport::default();

    let mut index: HashMap<&str, &QuestionNode> = HashMap::with_capacity(def.nodes.len());
    for node in &def.nodes {
        if index.insert(&node.id, node).is_some() {
            report.error(
                IssueKind::DuplicateNode,
                Some(&node.id),
                format!("Node id '{}' is used more than once", node.id),
            );
        }
    }

    let start = def.start_node.trim();
    if start.is_empty() {
        report.error(
            IssueKind::MissingStartNode,
            None,
            "No start node specified".to_string(),
        );
    } else if !index.contains_key(start) {
        report.error(
            IssueKind::StartNodeNotFound,
            Some(start),
            format!("Start node '{}' does not exist", start),
        );
    }

    let has_final = def
        .nodes
        .iter()
        .any(|n| n.is_final || n.kind == NodeKind::InfoScreen);
    if !has_final {
        report.warning(
            IssueKind::NoFinalNode,
            None,
            "No final node (info_screen or is_final)".to_string(),
        );
    }

    for node in &def.nodes {
        check_node(node, &index, &mut report);
    }

    if index.contains_key(start) {
        let reachable = reachable_from(start, &index);
        for node in &def.nodes {
            if node.id != start && !reachable.contains(node.id.as_str()) {
                report.warning(
                    IssueKind::Unreachable,
                    Some(&node.id),
                    format!("Node '{}' is unreachable from the start node", node.id),
                );
            }
        }

        for node_id in cycle_entries(start, &index) {
            report.warning(
                IssueKind::Cycle,
                Some(node_id),
                format!("Node '{}' can be revisited through a cycle", node_id),
            );
        }
    }

    for (i, rule) in def.analysis_rules.iter().enumerate() {
        check_rule(i, rule, &index, &mut report);
    }

    report
}

fn check_node(
    node: &QuestionNode,
    index: &HashMap<&str, &QuestionNode>,
    report: &mut ValidationReport,
) {
    let id = Some(node.id.as_str());

    if node.question_text.trim().is_empty() {
        report.error(
            IssueKind::MissingQuestionText,
            id,
            format!("Node '{}' has no question text", node.id),
        );
    }

    if node.kind.has_options() && node.options.is_empty() {
        report.error(
            IssueKind::MissingOptions,
            id,
            format!("Node '{}' of type {:?} has no options", node.id, node.kind),
        );
    }

    if node.kind.has_bounds() && (node.min_value.is_none() || node.max_value.is_none()) {
        report.error(
            IssueKind::MissingBounds,
            id,
            format!(
                "Node '{}' of type {:?} must define min_value and max_value",
                node.id, node.kind
            ),
        );
    }
    if let (Some(min), Some(max)) = (node.min_value, node.max_value) {
        if min > max {
            report.error(
                IssueKind::InvalidBounds,
                id,
                format!("Node '{}' has min_value {} above max_value {}", node.id, min, max),
            );
        }
    }

    if node.transitions.is_empty() {
        if !node.is_final && node.kind != NodeKind::InfoScreen {
            report.warning(
                IssueKind::NoTransitions,
                id,
                format!("Node '{}' has no transitions", node.id),
            );
        }
        return;
    }

    let defaults = node.transitions.iter().filter(|r| r.is_default).count();
    if defaults > 1 {
        report.error(
            IssueKind::MultipleDefaults,
            id,
            format!("Node '{}' has {} default transitions", node.id, defaults),
        );
    }

    let mut recognized = 0;
    for rule in &node.transitions {
        if !index.contains_key(rule.target.as_str()) {
            report.error(
                IssueKind::DanglingTarget,
                id,
                format!(
                    "Node '{}' transitions to missing node '{}'",
                    node.id, rule.target
                ),
            );
        }

        let Some(expr) = rule.condition() else {
            continue;
        };
        match condition::parse(expr) {
            Ok(cond) => {
                recognized += 1;
                if let Some(option) = cond.option_ref() {
                    if node.kind.has_options() && node.option(option).is_none() {
                        report.warning(
                            IssueKind::UnknownOption,
                            id,
                            format!(
                                "Condition '{}' on node '{}' refers to unknown option '{}'",
                                expr, node.id, option
                            ),
                        );
                    }
                }
            }
            // A default rule's condition is never evaluated
            Err(_) if rule.is_default => {}
            Err(e) => report.error(
                IssueKind::UnrecognizedCondition,
                id,
                format!("Node '{}': {} (never matches)", node.id, e),
            ),
        }
    }

    if fallback_rule(node).is_none() {
        if recognized == 0 {
            report.error(
                IssueKind::DeadEnd,
                id,
                format!("Node '{}' has no transition that can ever match", node.id),
            );
        } else {
            report.warning(
                IssueKind::PossibleDeadEnd,
                id,
                format!(
                    "Node '{}' has only conditioned transitions and no default",
                    node.id
                ),
            );
        }
    }
}

fn check_rule(
    position: usize,
    rule: &TriggerRule,
    index: &HashMap<&str, &QuestionNode>,
    report: &mut ValidationReport,
) {
    let label = rule
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| format!("#{}", position + 1));

    if rule.triggers.is_empty() {
        report.warning(
            IssueKind::InertRule,
            None,
            format!("Rule {} has no triggers and never fires", label),
        );
    }
    if rule.message.trim().is_empty() {
        report.warning(
            IssueKind::InertRule,
            None,
            format!("Rule {} has no message and is skipped", label),
        );
    }

    for trigger in &rule.triggers {
        if !index.contains_key(trigger.node_id.as_str()) {
            report.error(
                IssueKind::UnknownTriggerNode,
                Some(&trigger.node_id),
                format!(
                    "Rule {} references missing node '{}'",
                    label, trigger.node_id
                ),
            );
        }
        if trigger.match_mode == MatchMode::Gte && trigger.threshold().is_none() {
            report.error(
                IssueKind::InvalidTrigger,
                Some(&trigger.node_id),
                format!(
                    "Rule {} compares against non-numeric threshold '{}'",
                    label, trigger.option_value
                ),
            );
        }
    }
}

fn reachable_from<'a>(start: &'a str, index: &HashMap<&'a str, &'a QuestionNode>) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        if let Some(node) = index.get(id).copied() {
            stack.extend(
                node.targets()
                    .into_iter()
                    .filter(|t| index.contains_key(t) && !seen.contains(t)),
            );
        }
    }
    seen
}

/// Nodes that close a cycle reachable from `start`, in discovery order
fn cycle_entries<'a>(start: &'a str, index: &HashMap<&'a str, &'a QuestionNode>) -> Vec<&'a str> {
    fn walk<'a>(
        id: &'a str,
        index: &HashMap<&'a str, &'a QuestionNode>,
        on_path: &mut Vec<&'a str>,
        done: &mut HashSet<&'a str>,
        entries: &mut Vec<&'a str>,
    ) {
        if on_path.contains(&id) {
            if !entries.contains(&id) {
                entries.push(id);
            }
            return;
        }
        if !done.insert(id) {
            return;
        }
        let Some(node) = index.get(id).copied() else {
            return;
        };
        on_path.push(id);
        for target in node.targets() {
            walk(target, index, on_path, done, entries);
        }
        on_path.pop();
    }

    let mut entries = Vec::new();
    walk(start, index, &mut Vec::new(), &mut HashSet::new(), &mut entries);
    entries
}

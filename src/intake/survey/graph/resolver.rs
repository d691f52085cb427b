// SPDX-License-Identifier: MIT

//! Transition resolution
//!
//! Conditioned rules are tried first, in authored order, and the first one
//! that matches wins. Only then is the fallback taken: the rule flagged
//! `default` wherever it was authored, else the first unconditioned rule.

use crate::intake::survey::answer::Answer;
use crate::intake::survey::condition;
use crate::intake::survey::types::{QuestionNode, TransitionRule};

/// Pick the next node id for `answer`, or `None` if the node leads nowhere
pub fn resolve<'a>(node: &'a QuestionNode, answer: &Answer) -> Option<&'a str> {
    let matched = node
        .transitions
        .iter()
        .filter(|rule| !rule.is_default)
        .find(|rule| {
            rule.condition()
                .is_some_and(|expr| condition::evaluate(expr, answer))
        });

    if let Some(rule) = matched {
        log::debug!(
            "Node {}: condition {:?} matched -> {}",
            node.id,
            rule.condition(),
            rule.target
        );
        return Some(&rule.target);
    }

    let fallback = fallback_rule(node);
    if let Some(rule) = fallback {
        log::debug!("Node {}: fallback -> {}", node.id, rule.target);
    }
    fallback.map(|rule| rule.target.as_str())
}

/// The rule taken when no condition matches
pub fn fallback_rule(node: &QuestionNode) -> Option<&TransitionRule> {
    node.transitions
        .iter()
        .find(|rule| rule.is_default)
        .or_else(|| node.transitions.iter().find(|rule| rule.condition().is_none()))
}

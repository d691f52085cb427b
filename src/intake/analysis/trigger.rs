// SPDX-License-Identifier: MIT

//! Single-answer trigger matching

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::intake::survey::answer::{Answer, Selection};

/// One (node, value, mode) predicate of a clinician rule
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct Trigger {
    /// Node whose recorded answer is inspected
    pub node_id: String,
    /// Option id, substring or numeric threshold depending on the mode
    #[serde(alias = "match_value")]
    pub option_value: String,
    #[serde(default)]
    pub match_mode: MatchMode,
}

/// How a trigger compares its value to an answer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Selected option or body region equals the value
    #[default]
    Exact,
    /// Case-insensitive substring of free text
    Contains,
    /// Numeric answer is at least the value
    Gte,
}

impl Trigger {
    pub fn new(
        node_id: impl Into<String>,
        option_value: impl Into<String>,
        match_mode: MatchMode,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            option_value: option_value.into(),
            match_mode,
        }
    }

    /// The value as a number, for `gte` triggers
    pub fn threshold(&self) -> Option<f64> {
        self.option_value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
    }

    /// Whether this trigger fires for the answer recorded at its node.
    ///
    /// An unanswered node never matches.
    pub fn matches(&self, answer: Option<&Answer>) -> bool {
        let Some(answer) = answer else {
            return false;
        };
        match self.match_mode {
            MatchMode::Exact => self.matches_exact(answer),
            MatchMode::Contains => self.matches_contains(answer),
            MatchMode::Gte => self.matches_gte(answer),
        }
    }

    /// The first present part decides: `selected`, then `value`, then
    /// `locations`. A numeric `value` matches at or above the trigger value.
    fn matches_exact(&self, answer: &Answer) -> bool {
        let expected = self.option_value.as_str();

        if let Some(selected) = &answer.selected {
            return match selected {
                Selection::One(id) => id == expected,
                Selection::Many(ids) => ids.iter().any(|id| id == expected),
                Selection::Flag(flag) => flag.to_string().eq_ignore_ascii_case(expected.trim()),
            };
        }

        if let Some(value) = answer.value {
            return match self.threshold() {
                Some(n) => value >= n,
                None => value.to_string() == expected,
            };
        }

        answer
            .locations
            .as_ref()
            .is_some_and(|locations| locations.iter().any(|l| l == expected))
    }

    fn matches_contains(&self, answer: &Answer) -> bool {
        let needle = self.option_value.trim().to_lowercase();
        if needle.is_empty() {
            return false;
        }
        let hit = |haystack: &str| haystack.to_lowercase().contains(&needle);

        if answer.text.as_deref().is_some_and(hit) {
            return true;
        }
        if let Some(Selection::One(id)) = &answer.selected {
            if hit(id.as_str()) {
                return true;
            }
        }
        answer
            .additional_fields
            .values()
            .filter_map(|v| v.as_str())
            .any(hit)
    }

    fn matches_gte(&self, answer: &Answer) -> bool {
        let Some(threshold) = self.threshold() else {
            return false;
        };
        // Body maps carry their number as intensity
        answer
            .value
            .or(answer.intensity)
            .is_some_and(|value| value >= threshold)
    }
}

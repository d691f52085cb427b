// SPDX-License-Identifier: MIT

//! Recorded answers
//!
//! An answer is a record of named optional parts rather than a single
//! scalar, so that a body map answer (regions plus intensity) can be matched
//! by several kinds of rule at once.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

use super::types::NodeKind;

/// Answers of one run, keyed by node id
pub type AnswerMap = BTreeMap<String, Answer>;

/// The value recorded for one node in one run
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct Answer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<Selection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f64>,
    /// Sub-field values of `multi_choice_with_input`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_fields: BTreeMap<String, serde_json::Value>,
}

/// What was picked on a choice-like screen
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum Selection {
    /// Consent screens record a yes/no flag
    Flag(bool),
    /// Single option id
    One(String),
    /// Several option ids
    Many(Vec<String>),
}

impl Selection {
    /// Scalar form of the selection, if it is not a collection
    pub fn as_scalar(&self) -> Option<Cow<'_, str>> {
        match self {
            Selection::Flag(flag) => Some(Cow::Owned(flag.to_string())),
            Selection::One(id) => Some(Cow::Borrowed(id)),
            Selection::Many(_) => None,
        }
    }

    /// Collection form of the selection, if it is one
    pub fn as_many(&self) -> Option<&[String]> {
        match self {
            Selection::Many(ids) => Some(ids),
            _ => None,
        }
    }

    /// Selected option ids, flattened
    pub fn items(&self) -> Vec<&str> {
        match self {
            Selection::Flag(_) => vec![],
            Selection::One(id) => vec![id.as_str()],
            Selection::Many(ids) => ids.iter().map(String::as_str).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Selection::Flag(_) => false,
            Selection::One(id) => id.is_empty(),
            Selection::Many(ids) => ids.is_empty(),
        }
    }
}

impl Answer {
    pub fn single(id: impl Into<String>) -> Self {
        Self {
            selected: Some(Selection::One(id.into())),
            ..Default::default()
        }
    }

    pub fn multiple<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selected: Some(Selection::Many(ids.into_iter().map(Into::into).collect())),
            ..Default::default()
        }
    }

    pub fn consent(accepted: bool) -> Self {
        Self {
            selected: Some(Selection::Flag(accepted)),
            ..Default::default()
        }
    }

    pub fn number(value: f64) -> Self {
        Self {
            value: Some(value),
            ..Default::default()
        }
    }

    pub fn free_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn body_map<I, S>(locations: I, intensity: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            locations: Some(locations.into_iter().map(Into::into).collect()),
            intensity: Some(intensity),
            ..Default::default()
        }
    }

    /// Attach a sub-field value
    pub fn with_field(mut self, id: impl Into<String>, value: serde_json::Value) -> Self {
        self.additional_fields.insert(id.into(), value);
        self
    }

    /// Whether the part of the answer that `kind` collects was given
    pub fn is_present_for(&self, kind: NodeKind) -> bool {
        match kind {
            NodeKind::SingleChoice
            | NodeKind::MultiChoice
            | NodeKind::MultiChoiceWithInput
            | NodeKind::ConsentScreen => self.selected.as_ref().is_some_and(|s| !s.is_empty()),
            NodeKind::TextInput => self.text.as_deref().is_some_and(|t| !t.trim().is_empty()),
            NodeKind::Slider => self.value.is_some(),
            NodeKind::BodyMap => self.locations.as_ref().is_some_and(|l| !l.is_empty()),
            NodeKind::InfoScreen => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_selection_deserialize_shapes() {
        let one: Answer = serde_json::from_value(json!({"selected": "yes"})).unwrap();
        assert_eq!(one.selected, Some(Selection::One("yes".to_string())));

        let many: Answer = serde_json::from_value(json!({"selected": ["a", "b"]})).unwrap();
        assert_eq!(many.selected.unwrap().as_many().unwrap().len(), 2);

        let flag: Answer = serde_json::from_value(json!({"selected": true})).unwrap();
        assert_eq!(flag.selected, Some(Selection::Flag(true)));
    }

    #[test]
    fn test_body_map_answer() {
        let answer: Answer =
            serde_json::from_value(json!({"locations": ["head", "neck"], "intensity": 6}))
                .unwrap();
        assert_eq!(answer, Answer::body_map(["head", "neck"], 6.0));
    }

    #[test]
    fn test_flag_scalar_form() {
        assert_eq!(
            Selection::Flag(false).as_scalar().as_deref(),
            Some("false")
        );
        assert!(Selection::Many(vec![]).as_scalar().is_none());
    }

    #[test]
    fn test_serialize_skips_missing_parts() {
        let value = serde_json::to_value(Answer::number(7.0)).unwrap();
        assert_eq!(value, json!({"value": 7.0}));
    }

    #[test]
    fn test_presence_by_kind() {
        assert!(!Answer::default().is_present_for(NodeKind::SingleChoice));
        assert!(!Answer::multiple(Vec::<String>::new()).is_present_for(NodeKind::MultiChoice));
        assert!(!Answer::free_text("   ").is_present_for(NodeKind::TextInput));
        assert!(Answer::consent(false).is_present_for(NodeKind::ConsentScreen));
        assert!(Answer::number(0.0).is_present_for(NodeKind::Slider));
        assert!(Answer::default().is_present_for(NodeKind::InfoScreen));
    }
}

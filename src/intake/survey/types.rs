// SPDX-License-Identifier: MIT

//! Survey definition types
//!
//! These are the data contracts a survey is authored in. Field names follow
//! the stored document shape (`type`, `logic`, `next_node`, ...) so that
//! definitions exported by the editor deserialize without translation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::intake::analysis::TriggerRule;
use crate::intake::error::AnswerError;

use super::answer::{Answer, Selection};

/// A complete survey: question graph plus clinician rules
#[derive(Debug, Clone, Deserialize, Serialize, Default, JsonSchema)]
pub struct SurveyDefinition {
    /// Name of the survey
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Id of the node every run starts at
    #[serde(default)]
    pub start_node: String,
    /// Nodes in authored order
    #[serde(default)]
    pub nodes: Vec<QuestionNode>,
    /// Post-hoc rules evaluated over a completed run
    #[serde(default)]
    pub analysis_rules: Vec<TriggerRule>,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_required() -> bool {
    true
}

/// One screen of the questionnaire
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, JsonSchema)]
pub struct QuestionNode {
    /// Stable identifier, referenced by transitions and trigger rules
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub question_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<NodeOption>,
    /// Outgoing transitions; empty means terminal
    #[serde(default, rename = "logic", skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<TransitionRule>,
    /// Free-form sub-fields of `multi_choice_with_input`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_fields: Vec<AdditionalField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub is_final: bool,
}

/// Closed set of screen kinds
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    SingleChoice,
    MultiChoice,
    MultiChoiceWithInput,
    TextInput,
    Slider,
    BodyMap,
    InfoScreen,
    ConsentScreen,
}

/// A selectable option of a choice-like node
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, JsonSchema)]
pub struct NodeOption {
    pub id: String,
    #[serde(default)]
    pub text: String,
    /// Recorded value; defaults to `id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// "None of the above" style option that must be selected alone
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub exclusive: bool,
}

/// Conditional edge to another node
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, JsonSchema)]
pub struct TransitionRule {
    /// Expression in the condition grammar; absent means unconditional
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(rename = "next_node")]
    pub target: String,
    #[serde(default, rename = "default", skip_serializing_if = "std::ops::Not::not")]
    pub is_default: bool,
}

/// Sub-field rendered next to the options of `multi_choice_with_input`
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, JsonSchema)]
pub struct AdditionalField {
    pub id: String,
    /// text, number or single_choice
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_if: Option<String>,
}

impl NodeKind {
    /// Kinds whose answers are picked from `options`
    pub fn has_options(&self) -> bool {
        matches!(
            self,
            NodeKind::SingleChoice | NodeKind::MultiChoice | NodeKind::MultiChoiceWithInput
        )
    }

    /// Kinds bounded by `min_value`/`max_value`
    pub fn has_bounds(&self) -> bool {
        matches!(self, NodeKind::Slider | NodeKind::BodyMap)
    }
}

impl NodeOption {
    /// The value recorded when this option is picked
    pub fn value(&self) -> &str {
        self.value.as_deref().unwrap_or(&self.id)
    }

    /// Whether `selection` refers to this option by id or by value
    pub fn matches(&self, selection: &str) -> bool {
        self.id == selection || self.value() == selection
    }
}

impl TransitionRule {
    /// The condition text, treating blank strings as unconditional
    pub fn condition(&self) -> Option<&str> {
        self.condition
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

impl QuestionNode {
    /// A node completes the run when it is flagged final or has no way out
    pub fn is_terminal(&self) -> bool {
        self.is_final || self.transitions.is_empty()
    }

    /// Distinct transition targets in authored order
    pub fn targets(&self) -> Vec<&str> {
        let mut targets: Vec<&str> = Vec::with_capacity(self.transitions.len());
        for rule in &self.transitions {
            if !targets.contains(&rule.target.as_str()) {
                targets.push(&rule.target);
            }
        }
        targets
    }

    pub fn option(&self, selection: &str) -> Option<&NodeOption> {
        self.options.iter().find(|o| o.matches(selection))
    }

    /// Check an answer against this node's constraints
    pub fn check_answer(&self, answer: &Answer) -> Result<(), AnswerError> {
        if self.kind == NodeKind::InfoScreen {
            return Ok(());
        }

        if !answer.is_present_for(self.kind) {
            return if self.required {
                Err(AnswerError::Required(self.id.clone()))
            } else {
                Ok(())
            };
        }

        match self.kind {
            NodeKind::SingleChoice => match &answer.selected {
                Some(Selection::Many(items)) if items.len() > 1 => {
                    Err(AnswerError::ExpectedSingle {
                        node_id: self.id.clone(),
                    })
                }
                Some(selection) => self.check_known(selection.items()),
                None => Ok(()),
            },
            NodeKind::MultiChoice | NodeKind::MultiChoiceWithInput => {
                let items = answer
                    .selected
                    .as_ref()
                    .map(Selection::items)
                    .unwrap_or_default();
                self.check_known(items.clone())?;
                self.check_exclusive(&items)
            }
            NodeKind::Slider => match answer.value {
                Some(value) => self.check_range(value),
                None => Ok(()),
            },
            NodeKind::BodyMap => {
                if let Some(locations) = &answer.locations {
                    self.check_known(locations.iter().map(String::as_str).collect())?;
                }
                match answer.intensity {
                    Some(intensity) => self.check_range(intensity),
                    None => Ok(()),
                }
            }
            NodeKind::TextInput => match (self.max_length, &answer.text) {
                (Some(max_length), Some(text)) if text.chars().count() > max_length => {
                    Err(AnswerError::TooLong {
                        node_id: self.id.clone(),
                        max_length,
                    })
                }
                _ => Ok(()),
            },
            NodeKind::ConsentScreen | NodeKind::InfoScreen => Ok(()),
        }
    }

    fn check_known(&self, items: Vec<&str>) -> Result<(), AnswerError> {
        // Nodes authored without options accept anything
        if self.options.is_empty() {
            return Ok(());
        }
        match items.into_iter().find(|item| self.option(item).is_none()) {
            Some(unknown) => Err(AnswerError::UnknownOption {
                node_id: self.id.clone(),
                option: unknown.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn check_exclusive(&self, items: &[&str]) -> Result<(), AnswerError> {
        if items.len() < 2 {
            return Ok(());
        }
        let exclusive = items
            .iter()
            .find(|item| self.option(item).is_some_and(|o| o.exclusive));
        match exclusive {
            Some(option) => Err(AnswerError::ExclusiveConflict {
                node_id: self.id.clone(),
                option: option.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn check_range(&self, value: f64) -> Result<(), AnswerError> {
        let min = self.min_value.unwrap_or(f64::NEG_INFINITY);
        let max = self.max_value.unwrap_or(f64::INFINITY);
        if value < min || value > max {
            return Err(AnswerError::OutOfRange {
                node_id: self.id.clone(),
                value,
                min,
                max,
            });
        }
        Ok(())
    }
}

impl SurveyDefinition {
    pub fn node(&self, id: &str) -> Option<&QuestionNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

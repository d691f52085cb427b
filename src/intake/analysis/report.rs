// SPDX-License-Identifier: MIT

//! Clinician report over a finished run
//!
//! The report has two parts: the findings of every rule that fired, and the
//! patient's answers rendered for reading, in authored node order.

use serde::Serialize;

use crate::intake::survey::answer::{Answer, AnswerMap, Selection};
use crate::intake::survey::graph::SurveyGraph;
use crate::intake::survey::types::{NodeKind, QuestionNode};

use super::rules::{evaluate_rules, Finding, TriggerRule};

/// Scale used for body map intensity when the node has no `max_value`
const DEFAULT_INTENSITY_MAX: f64 = 10.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub findings: Vec<Finding>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub answers: Vec<AnswerLine>,
}

/// One answered question, rendered for the clinician
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerLine {
    pub node_id: String,
    pub question: String,
    pub answer: String,
    /// `label: value` of filled-in sub-fields
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<String>,
}

impl AnswerLine {
    /// Render an answer, or `None` for info screens and empty answers
    pub fn format(node: &QuestionNode, answer: &Answer) -> Option<Self> {
        if node.kind == NodeKind::InfoScreen {
            return None;
        }

        let mut text = match &answer.selected {
            Some(Selection::Flag(true)) => "Yes".to_string(),
            Some(Selection::Flag(false)) => "No".to_string(),
            Some(selection) => selection
                .items()
                .into_iter()
                .map(|item| option_text(node, item))
                .collect::<Vec<_>>()
                .join(", "),
            None => String::new(),
        };

        if text.is_empty() {
            if let Some(value) = answer.value {
                text = match node.max_value {
                    Some(max) => format!("{}/{}", value, max),
                    None => value.to_string(),
                };
            }
        }
        if text.is_empty() {
            if let Some(free) = answer.text.as_deref() {
                text = free.trim().to_string();
            }
        }
        if text.is_empty() {
            if let Some(locations) = &answer.locations {
                text = locations
                    .iter()
                    .map(|l| option_text(node, l))
                    .collect::<Vec<_>>()
                    .join(", ");
            }
        }

        if let Some(intensity) = answer.intensity {
            let max = node.max_value.unwrap_or(DEFAULT_INTENSITY_MAX);
            let part = format!("Intensity: {}/{}", intensity, max);
            text = if text.is_empty() {
                part
            } else {
                format!("{}; {}", text, part)
            };
        }

        let extras: Vec<String> = node
            .additional_fields
            .iter()
            .filter_map(|field| {
                let value = match answer.additional_fields.get(&field.id)? {
                    serde_json::Value::Null => return None,
                    serde_json::Value::String(s) => s.trim().to_string(),
                    other => other.to_string(),
                };
                if value.is_empty() {
                    return None;
                }
                let label = if field.label.trim().is_empty() {
                    &field.id
                } else {
                    &field.label
                };
                Some(format!("{}: {}", label, value))
            })
            .collect();

        if text.is_empty() && extras.is_empty() {
            return None;
        }

        let question = if node.question_text.trim().is_empty() {
            node.id.clone()
        } else {
            node.question_text.clone()
        };

        Some(Self {
            node_id: node.id.clone(),
            question,
            answer: text,
            extras,
        })
    }

    pub fn to_text(&self) -> String {
        let mut line = format!("• {}: {}", self.question, self.answer);
        if !self.extras.is_empty() {
            line.push_str(&format!(" ({})", self.extras.join("; ")));
        }
        line
    }
}

fn option_text(node: &QuestionNode, selection: &str) -> String {
    node.option(selection)
        .filter(|o| !o.text.trim().is_empty())
        .map(|o| o.text.clone())
        .unwrap_or_else(|| selection.to_string())
}

impl AnalysisReport {
    /// Findings only
    pub fn evaluate(rules: &[TriggerRule], answers: &AnswerMap) -> Self {
        let findings = evaluate_rules(rules, answers);
        log::info!(
            "Analysis: {} of {} rule(s) fired",
            findings.len(),
            rules.len()
        );
        Self {
            findings,
            answers: Vec::new(),
        }
    }

    /// Full report: the survey's own rules plus answers in authored order
    pub fn build(graph: &SurveyGraph, answers: &AnswerMap) -> Self {
        let mut report = Self::evaluate(graph.rules(), answers);
        report.answers = graph
            .nodes()
            .filter_map(|node| {
                let answer = answers.get(&node.id)?;
                AnswerLine::format(node, answer)
            })
            .collect();
        report
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn finding_lines(&self) -> Vec<String> {
        self.findings
            .iter()
            .map(|f| format!("{} {}", f.color.palette().emoji, f.message))
            .collect()
    }

    pub fn answer_lines(&self) -> Vec<String> {
        self.answers.iter().map(AnswerLine::to_text).collect()
    }

    /// Findings, one per line with their color marker, then the answers
    /// after a blank line if there are any
    pub fn to_text(&self) -> String {
        let mut text = self.finding_lines().join("\n");
        if !self.answers.is_empty() {
            if !text.is_empty() {
                text.push_str("\n\n");
            }
            text.push_str(&self.answer_lines().join("\n"));
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::analysis::{MatchMode, Trigger, TriggerColor, TriggerMode};
    use crate::intake::survey::types::SurveyDefinition;
    use serde_json::json;

    fn graph() -> SurveyGraph {
        let def: SurveyDefinition = serde_yaml::from_str(
            r#"
            name: Report
            start_node: intro
            nodes:
              - { id: intro, type: info_screen, question_text: Hello, logic: [{ next_node: agree }] }
              - { id: agree, type: consent_screen, question_text: Agree?, logic: [{ next_node: where }] }
              - id: where
                type: body_map
                question_text: Where?
                options: [{ id: head, text: Head }, { id: neck, text: Neck }]
                logic: [{ next_node: pain }]
              - { id: pain, type: slider, question_text: Pain?, min_value: 0, max_value: 10, logic: [{ next_node: symptoms }] }
              - id: symptoms
                type: multi_choice_with_input
                question_text: Symptoms?
                options: [{ id: cough, text: Cough }, { id: other, text: Other }]
                additional_fields: [{ id: other_text, type: text, label: Describe }]
                logic: [{ next_node: notes }]
              - { id: notes, type: text_input, question_text: Notes?, required: false }
            analysis_rules:
              - message: Strong pain
                color: orange
                triggers: [{ node_id: pain, option_value: "7", match_mode: gte }]
            "#,
        )
        .unwrap();
        SurveyGraph::new(&def).unwrap()
    }

    #[test]
    fn test_report_text() {
        let rules = vec![
            TriggerRule {
                name: None,
                triggers: vec![Trigger::new("pain", "6", MatchMode::Gte)],
                trigger_mode: TriggerMode::Any,
                message: "Severe pain".to_string(),
                color: TriggerColor::Red,
            },
            TriggerRule {
                name: None,
                triggers: vec![Trigger::new("mood", "low", MatchMode::Exact)],
                trigger_mode: TriggerMode::Any,
                message: "Low mood".to_string(),
                color: TriggerColor::Yellow,
            },
        ];
        let mut answers = AnswerMap::new();
        answers.insert("pain".to_string(), Answer::number(8.0));
        answers.insert("mood".to_string(), Answer::single("low"));

        let report = AnalysisReport::evaluate(&rules, &answers);
        assert_eq!(report.to_text(), "🔴 Severe pain\n🟡 Low mood");
    }

    #[test]
    fn test_empty_report() {
        let report = AnalysisReport::evaluate(&[], &AnswerMap::new());
        assert!(report.is_empty());
        assert_eq!(report.to_text(), "");
    }

    #[test]
    fn test_build_renders_answers_in_node_order() {
        let graph = graph();
        let mut answers = AnswerMap::new();
        answers.insert("notes".to_string(), Answer::free_text("  tired  "));
        answers.insert(
            "symptoms".to_string(),
            Answer::multiple(["cough", "other"]).with_field("other_text", json!("itchy eyes")),
        );
        answers.insert("pain".to_string(), Answer::number(8.0));
        answers.insert("where".to_string(), Answer::body_map(["neck", "back"], 4.0));
        answers.insert("agree".to_string(), Answer::consent(true));
        answers.insert("intro".to_string(), Answer::default());

        let report = AnalysisReport::build(&graph, &answers);
        assert_eq!(
            report.answer_lines(),
            vec![
                "• Agree?: Yes",
                "• Where?: Neck, back; Intensity: 4/10",
                "• Pain?: 8/10",
                "• Symptoms?: Cough, Other (Describe: itchy eyes)",
                "• Notes?: tired",
            ]
        );
        assert_eq!(
            report.to_text(),
            format!("🟠 Strong pain\n\n{}", report.answer_lines().join("\n"))
        );
    }

    #[test]
    fn test_unanswered_parts_are_skipped() {
        let graph = graph();
        let mut answers = AnswerMap::new();
        answers.insert("notes".to_string(), Answer::free_text("   "));
        answers.insert("agree".to_string(), Answer::consent(false));

        let report = AnalysisReport::build(&graph, &answers);
        assert!(report.is_empty());
        assert_eq!(report.answer_lines(), vec!["• Agree?: No"]);
        assert_eq!(report.to_text(), "• Agree?: No");
    }
}

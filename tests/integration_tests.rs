//! Integration tests for survey loading, navigation and rule evaluation
//!
//! These tests drive complete runs through the public API, from a survey
//! definition to the clinician report.

use intake_rs::intake::analysis::{AnalysisReport, TriggerColor};
use intake_rs::intake::error::{GraphError, IntakeError, RunError};
use intake_rs::intake::session::{MemoryRunStore, RunStore};
use intake_rs::intake::survey::graph::{order, validate, IssueKind};
use intake_rs::intake::survey::run::{Advance, Navigator, RunState};
use intake_rs::intake::survey::{Answer, SurveyGraph, SurveyLoader};
use serde_json::json;
use std::path::PathBuf;

// ============================================================================
// Fixtures
// ============================================================================

const PAIN_SURVEY: &str = r#"
name: Pain check
start_node: start
nodes:
  - id: start
    type: single_choice
    question_text: "Are you in pain?"
    options:
      - { id: "yes", text: "Yes" }
      - { id: "no", text: "No" }
    logic:
      - { condition: 'selected == "yes"', next_node: pain }
      - { condition: 'selected == "no"', next_node: end }
  - id: pain
    type: slider
    question_text: "How strong is the pain?"
    min_value: 1
    max_value: 10
    logic:
      - { next_node: end }
  - id: end
    type: info_screen
    question_text: "Thank you"
    is_final: true
analysis_rules:
  - message: "Pain 6 or above"
    trigger_mode: any
    triggers:
      - { node_id: pain, option_value: "6", match_mode: gte }
"#;

fn pain_graph() -> SurveyGraph {
    let def = SurveyLoader::parse_yaml(PAIN_SURVEY).expect("Failed to parse YAML");
    SurveyGraph::publish(&def).expect("Survey should publish")
}

fn demo_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("surveys/chest_pain.yaml")
}

// ============================================================================
// End-to-end Runs
// ============================================================================

#[test]
fn test_pain_scenario_end_to_end() {
    let graph = pain_graph();
    let mut nav = Navigator::start(&graph);

    nav.advance(Answer::single("yes")).unwrap();
    nav.advance(Answer::number(8.0)).unwrap();

    assert_eq!(nav.state().history, vec!["start", "pain"]);
    assert_eq!(nav.current_node_id(), "end");

    let report = AnalysisReport::evaluate(graph.rules(), &nav.active_answers());
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].message, "Pain 6 or above");
    assert_eq!(report.findings[0].color, TriggerColor::Red);
}

#[test]
fn test_pain_scenario_no_branch_does_not_fire() {
    let graph = pain_graph();
    let mut nav = Navigator::start(&graph);

    nav.advance(Answer::single("no")).unwrap();
    assert_eq!(nav.current_node_id(), "end");
    assert_eq!(nav.advance(Answer::default()).unwrap(), Advance::Completed);

    let report = AnalysisReport::evaluate(graph.rules(), &nav.active_answers());
    assert!(report.is_empty());
}

#[test]
fn test_abandoned_branch_does_not_feed_rules() {
    let graph = pain_graph();
    let mut nav = Navigator::start(&graph);

    nav.advance(Answer::single("yes")).unwrap();
    nav.advance(Answer::number(9.0)).unwrap();
    nav.retreat();
    nav.retreat();
    assert_eq!(nav.answer_for("start"), Some(&Answer::single("yes")));

    nav.advance(Answer::single("no")).unwrap();
    assert_eq!(nav.state().history, vec!["start"]);

    let report = AnalysisReport::evaluate(graph.rules(), &nav.active_answers());
    assert!(report.is_empty());
    // Still kept for pre-filling
    assert_eq!(nav.answer_for("pain"), Some(&Answer::number(9.0)));
}

#[test]
fn test_demo_survey_full_run() {
    let graph = SurveyLoader::new()
        .load_graph(demo_path())
        .expect("Demo survey should load");
    let mut nav = Navigator::start(&graph);

    nav.advance(Answer::default()).unwrap(); // welcome
    nav.advance(Answer::consent(true)).unwrap();
    nav.advance(Answer::single("yes")).unwrap();
    nav.advance(Answer::body_map(["chest", "left_arm"], 8.0)).unwrap();
    nav.advance(Answer::multiple(["sweating"])).unwrap();
    nav.advance(Answer::number(9.0)).unwrap();
    assert_eq!(nav.current_node_id(), "notes");
    nav.advance(Answer::free_text("Felt faint this morning")).unwrap();
    assert_eq!(nav.advance(Answer::default()).unwrap(), Advance::Completed);
    // Info screens do not count
    assert_eq!(nav.progress(), 100.0);

    let report = AnalysisReport::evaluate(graph.rules(), &nav.active_answers());
    let names: Vec<&str> = report
        .findings
        .iter()
        .filter_map(|f| f.name.as_deref())
        .collect();
    assert_eq!(names, vec!["acs_pattern", "high_intensity", "feels_unwell"]);
    assert_eq!(
        report.to_text(),
        "🔴 Chest pain radiating to arm or jaw\n🟠 Pain intensity 7 or above\n🟡 Patient reports feeling very unwell"
    );

    let full = AnalysisReport::build(&graph, &nav.active_answers());
    assert_eq!(full.findings, report.findings);
    assert_eq!(full.answers.len(), 6);
    assert_eq!(
        full.answer_lines().last().map(String::as_str),
        Some("• Tell us anything else we should know: Felt faint this morning")
    );
}

#[test]
fn test_demo_survey_report_lists_answers() {
    let graph = SurveyLoader::new().load_graph(demo_path()).unwrap();
    let mut nav = Navigator::start(&graph);

    nav.advance(Answer::default()).unwrap();
    nav.advance(Answer::consent(true)).unwrap();
    nav.advance(Answer::single("yes")).unwrap();
    nav.advance(Answer::body_map(["chest", "jaw"], 6.0)).unwrap();
    nav.advance(
        Answer::multiple(["breathless", "other"]).with_field("other_text", json!("dizzy")),
    )
    .unwrap();
    nav.advance(Answer::number(4.0)).unwrap();
    assert_eq!(nav.current_node_id(), "done");

    let report = AnalysisReport::build(&graph, &nav.active_answers());
    assert!(report.is_empty());
    assert_eq!(
        report.answer_lines(),
        vec![
            "• Do you agree to share your answers with the clinic?: Yes",
            "• Do you have chest pain right now?: Yes",
            "• Mark where it hurts and how strongly: Chest, Jaw; Intensity: 6/10",
            "• Any of the following?: Shortness of breath, Other (Describe: dizzy)",
            "• Overall, how unwell do you feel?: 4/10",
        ]
    );
}

#[test]
fn test_demo_survey_declined_consent() {
    let graph = SurveyLoader::new().load_graph(demo_path()).unwrap();
    let mut nav = Navigator::start(&graph);

    nav.advance(Answer::default()).unwrap();
    nav.advance(Answer::consent(false)).unwrap();
    assert_eq!(nav.current_node_id(), "declined");
    assert_eq!(nav.advance(Answer::default()).unwrap(), Advance::Completed);
}

#[test]
fn test_demo_survey_rejects_exclusive_combination() {
    let graph = SurveyLoader::new().load_graph(demo_path()).unwrap();
    let mut nav = Navigator::start(&graph);

    nav.advance(Answer::default()).unwrap();
    nav.advance(Answer::consent(true)).unwrap();
    nav.advance(Answer::single("no")).unwrap();
    assert_eq!(nav.current_node_id(), "symptoms");

    let err = nav
        .advance(Answer::multiple(["none", "sweating"]))
        .unwrap_err();
    assert!(matches!(err, RunError::Answer(_)));
    assert_eq!(nav.current_node_id(), "symptoms");

    let with_other =
        Answer::multiple(["other"]).with_field("other_text", json!("pressure in chest"));
    nav.advance(with_other).unwrap();
    assert_eq!(nav.current_node_id(), "severity");
}

// ============================================================================
// Snapshots and Storage
// ============================================================================

#[tokio::test]
async fn test_run_survives_store_round_trip() {
    let graph = pain_graph();
    let store = MemoryRunStore::new(3600);

    let mut nav = Navigator::start(&graph);
    nav.advance(Answer::single("yes")).unwrap();
    let id = store.create(nav.into_state()).await;

    // Next request picks the run back up
    let state = store.get(id).await.unwrap();
    let mut nav = Navigator::resume(&graph, state).unwrap();
    nav.advance(Answer::number(6.0)).unwrap();
    store.put(id, nav.snapshot()).await;

    let state = store.get(id).await.unwrap();
    assert_eq!(state.current_node_id, "end");
    assert_eq!(state.history, vec!["start", "pain"]);
}

#[test]
fn test_snapshot_json_shape() {
    let graph = pain_graph();
    let mut nav = Navigator::start(&graph);
    nav.advance(Answer::single("yes")).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&nav.snapshot().to_json().unwrap()).unwrap();
    assert_eq!(
        value,
        json!({
            "current_node_id": "pain",
            "answers": {"start": {"selected": "yes"}},
            "history": ["start"],
            "completed": false
        })
    );
    let state = RunState::from_json(&value.to_string()).unwrap();
    assert_eq!(state.current_node_id, "pain");
}

// ============================================================================
// Authoring
// ============================================================================

#[test]
fn test_demo_survey_reading_order() {
    let def = SurveyLoader::new().load(demo_path()).unwrap();
    let graph = SurveyGraph::new(&def).unwrap();
    let first = graph.reading_order();
    assert_eq!(first, order(&def.nodes, &def.start_node));
    assert_eq!(first.len(), def.nodes.len());
    assert_eq!(&first[..3], &["welcome", "consent", "has_pain"]);
    // Deterministic across calls
    assert_eq!(first, graph.reading_order());
}

#[test]
fn test_publish_rejects_dangling_target() {
    let yaml = PAIN_SURVEY.replace(
        "next_node: end }\n  - id: end",
        "next_node: finish }\n  - id: end",
    );
    let def = SurveyLoader::parse_yaml(&yaml).unwrap();

    let report = validate(&def);
    assert!(report.has_error(IssueKind::DanglingTarget));

    match SurveyGraph::publish(&def) {
        Err(IntakeError::InvalidSurvey { errors, .. }) => assert!(errors >= 1),
        Err(other) => panic!("expected InvalidSurvey, got {}", other),
        Ok(_) => panic!("survey with a dangling target was published"),
    }

    // An unvalidated graph still refuses to walk into the missing node
    let graph = SurveyGraph::new(&def).unwrap();
    let mut nav = Navigator::start(&graph);
    nav.advance(Answer::single("yes")).unwrap();
    assert_eq!(
        nav.advance(Answer::number(2.0)),
        Err(RunError::Graph(GraphError::dangling("pain", "finish")))
    );
}

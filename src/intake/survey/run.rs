// SPDX-License-Identifier: MIT

//! Per-run navigation state
//!
//! A [`RunState`] is the plain, serialisable record of one patient's run.
//! A [`Navigator`] borrows an immutable [`SurveyGraph`] and drives the state
//! forward and backward through it.

use serde::{Deserialize, Serialize};

use crate::intake::error::{GraphError, RunError};

use super::answer::{Answer, AnswerMap};
use super::graph::{resolve, SurveyGraph};
use super::types::{NodeKind, QuestionNode};

/// Snapshot of one run
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RunState {
    pub current_node_id: String,
    /// Every answer given, including those of abandoned branches
    #[serde(default)]
    pub answers: AnswerMap,
    /// Previously visited node ids, most recent last
    #[serde(default)]
    pub history: Vec<String>,
    #[serde(default)]
    pub completed: bool,
}

impl RunState {
    pub fn new(start_node: impl Into<String>) -> Self {
        Self {
            current_node_id: start_node.into(),
            answers: AnswerMap::new(),
            history: Vec::new(),
            completed: false,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Outcome of a successful `advance`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Moved { from: String, to: String },
    Completed,
}

/// Drives a [`RunState`] through a survey graph
#[derive(Debug)]
pub struct Navigator<'a> {
    graph: &'a SurveyGraph,
    state: RunState,
}

impl<'a> Navigator<'a> {
    /// Begin a fresh run at the graph's start node
    pub fn start(graph: &'a SurveyGraph) -> Self {
        Self {
            graph,
            state: RunState::new(graph.start_node()),
        }
    }

    /// Continue a run restored from a snapshot
    pub fn resume(graph: &'a SurveyGraph, state: RunState) -> Result<Self, GraphError> {
        if !graph.contains(&state.current_node_id) {
            return Err(GraphError::UnknownNode(state.current_node_id));
        }
        Ok(Self { graph, state })
    }

    pub fn current_node(&self) -> Option<&'a QuestionNode> {
        self.graph.node(&self.state.current_node_id)
    }

    pub fn current_node_id(&self) -> &str {
        &self.state.current_node_id
    }

    pub fn is_completed(&self) -> bool {
        self.state.completed
    }

    /// Record `answer` for the current node and move to the resolved next node
    ///
    /// A rejected answer leaves the run untouched.
    pub fn advance(&mut self, answer: Answer) -> Result<Advance, RunError> {
        if self.state.completed {
            return Err(RunError::AlreadyCompleted(
                self.state.current_node_id.clone(),
            ));
        }

        let graph = self.graph;
        let node = graph
            .node(&self.state.current_node_id)
            .ok_or_else(|| GraphError::UnknownNode(self.state.current_node_id.clone()))?;

        node.check_answer(&answer)?;

        let next = resolve(node, &answer);
        self.state.answers.insert(node.id.clone(), answer);

        match next {
            Some(target) if !graph.contains(target) => {
                log::error!(
                    "Survey '{}': node '{}' resolved to missing node '{}'",
                    graph.name(),
                    node.id,
                    target
                );
                Err(GraphError::dangling(&node.id, target).into())
            }
            Some(target) => {
                log::debug!("Advance {} -> {}", node.id, target);
                let from = std::mem::replace(&mut self.state.current_node_id, target.to_string());
                self.state.history.push(from.clone());
                Ok(Advance::Moved {
                    from,
                    to: target.to_string(),
                })
            }
            None if node.is_terminal() => {
                log::info!("Survey '{}': run completed at '{}'", graph.name(), node.id);
                self.state.completed = true;
                Ok(Advance::Completed)
            }
            None => {
                log::error!(
                    "Survey '{}': node '{}' has no transition for the given answer",
                    graph.name(),
                    node.id
                );
                Err(GraphError::DeadEnd(node.id.clone()).into())
            }
        }
    }

    /// Step back to the previously visited node. No-op at the start.
    ///
    /// Returns whether the run moved.
    pub fn retreat(&mut self) -> bool {
        match self.state.history.pop() {
            Some(previous) => {
                log::debug!("Retreat {} -> {}", self.state.current_node_id, previous);
                self.state.current_node_id = previous;
                self.state.completed = false;
                true
            }
            None => false,
        }
    }

    pub fn can_retreat(&self) -> bool {
        !self.state.history.is_empty()
    }

    /// Go back to a node on the active path, dropping history past it
    pub fn jump_to(&mut self, node_id: &str) -> Result<(), RunError> {
        if !self.graph.contains(node_id) {
            return Err(GraphError::UnknownNode(node_id.to_string()).into());
        }
        if node_id == self.state.current_node_id {
            self.state.completed = false;
            return Ok(());
        }

        let position = self
            .state
            .history
            .iter()
            .rposition(|id| id == node_id)
            .ok_or_else(|| RunError::NotVisited(node_id.to_string()))?;

        log::debug!("Jump {} -> {}", self.state.current_node_id, node_id);
        self.state.history.truncate(position);
        self.state.current_node_id = node_id.to_string();
        self.state.completed = false;
        Ok(())
    }

    /// Previously given answer for a node, for pre-filling its screen
    pub fn answer_for(&self, node_id: &str) -> Option<&Answer> {
        self.state.answers.get(node_id)
    }

    /// Share of answerable nodes answered so far, as a percentage
    pub fn progress(&self) -> f64 {
        let countable = |node: &QuestionNode| node.kind != NodeKind::InfoScreen;

        let total = self.graph.nodes().filter(|n| countable(n)).count();
        if total == 0 {
            return 100.0;
        }

        let answered = self
            .state
            .answers
            .keys()
            .filter_map(|id| self.graph.node(id))
            .filter(|n| countable(n))
            .count();

        (answered as f64 / total as f64 * 100.0).min(100.0)
    }

    /// Answers of nodes on the active path only
    ///
    /// Answers left behind on abandoned branches are kept for pre-filling
    /// but must not feed clinician rules.
    pub fn active_answers(&self) -> AnswerMap {
        self.state
            .history
            .iter()
            .chain(std::iter::once(&self.state.current_node_id))
            .filter_map(|id| {
                self.state
                    .answers
                    .get(id)
                    .map(|answer| (id.clone(), answer.clone()))
            })
            .collect()
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn snapshot(&self) -> RunState {
        self.state.clone()
    }

    pub fn into_state(self) -> RunState {
        self.state
    }
}

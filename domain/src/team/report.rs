//! The result of one coordinator invocation.

use crate::agent::entities::{AgentRun, RunStatus};
use crate::agent::value_objects::AgentId;
use crate::core::failure::{FailureKind, FailureReason};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the team answer was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMode {
    /// The backend merged the agent answers
    Synthesized,
    /// Synthesis failed; agent answers were concatenated in registration order
    Degraded,
}

impl MergeMode {
    pub fn as_str(&self) -> &str {
        match self {
            MergeMode::Synthesized => "synthesized",
            MergeMode::Degraded => "degraded",
        }
    }
}

/// A run that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentFailure {
    pub agent: AgentId,
    pub agent_name: String,
    pub reason: FailureReason,
}

/// Per-agent summary line of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub agent: AgentId,
    pub agent_name: String,
    pub status: RunStatus,
    pub tool_invocations: usize,
    pub elapsed: Duration,
}

impl From<&AgentRun> for RunSummary {
    fn from(run: &AgentRun) -> Self {
        Self {
            agent: run.agent.clone(),
            agent_name: run.agent_name.clone(),
            status: run.status().clone(),
            tool_invocations: run.invocations().len(),
            elapsed: run.elapsed(),
        }
    }
}

/// Final output of a team run.
///
/// `answer` and `merge` are either both set or both unset. When no agent
/// succeeded `team_failure` is `AllAgentsFailed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamReport {
    pub query: String,
    pub answer: Option<String>,
    pub merge: Option<MergeMode>,
    /// Agents whose answer fed the merge, in registration order
    pub contributors: Vec<AgentId>,
    /// Failed or cancelled runs, in registration order
    pub failures: Vec<AgentFailure>,
    pub team_failure: Option<FailureKind>,
    pub runs: Vec<RunSummary>,
    pub elapsed: Duration,
}

impl TeamReport {
    /// Build a report from finished runs (registration order).
    ///
    /// `merged` is the answer with its merge mode, or `None` when no agent
    /// succeeded.
    pub fn from_runs(
        query: impl Into<String>,
        runs: &[AgentRun],
        merged: Option<(String, MergeMode)>,
        elapsed: Duration,
    ) -> Self {
        let contributors = runs
            .iter()
            .filter(|r| r.is_success())
            .map(|r| r.agent.clone())
            .collect();
        let failures = runs.iter().filter_map(failure_of).collect();
        let team_failure = merged.is_none().then_some(FailureKind::AllAgentsFailed);
        let (answer, merge) = match merged {
            Some((answer, mode)) => (Some(answer), Some(mode)),
            None => (None, None),
        };

        Self {
            query: query.into(),
            answer,
            merge,
            contributors,
            failures,
            team_failure,
            runs: runs.iter().map(RunSummary::from).collect(),
            elapsed,
        }
    }

    pub fn is_success(&self) -> bool {
        self.answer.is_some()
    }

    pub fn is_degraded(&self) -> bool {
        self.merge == Some(MergeMode::Degraded)
    }

    pub fn failure_for(&self, agent: &str) -> Option<&AgentFailure> {
        self.failures.iter().find(|f| f.agent.as_str() == agent)
    }
}

fn failure_of(run: &AgentRun) -> Option<AgentFailure> {
    let reason = match run.status() {
        RunStatus::Failed { reason } => reason.clone(),
        RunStatus::Cancelled => FailureReason::new(FailureKind::Cancelled, "run was cancelled"),
        // A run that never reached a terminal state is reported as cancelled.
        RunStatus::Pending | RunStatus::Reasoning | RunStatus::ToolCall => {
            FailureReason::new(FailureKind::Cancelled, "run did not finish")
        }
        RunStatus::Succeeded => return None,
    };
    Some(AgentFailure {
        agent: run.agent.clone(),
        agent_name: run.agent_name.clone(),
        reason,
    })
}

/// Literal concatenation used when synthesis is unavailable.
///
/// `answers` are `(agent name, answer)` pairs in registration order.
pub fn concatenate_answers(answers: &[(String, String)]) -> String {
    answers
        .iter()
        .map(|(name, answer)| format!("## {}\n\n{}", name, answer.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

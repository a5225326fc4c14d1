//! Agent domain entities: the agent profile and the per-query run record.

use super::value_objects::{AgentId, Thought};
use crate::core::error::DomainError;
use crate::core::failure::FailureReason;
use crate::tool::value_objects::ToolInvocation;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Static description of an agent: who it is and how it should behave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub id: AgentId,
    /// Display name (e.g. "Web Researcher")
    pub name: String,
    /// Role description given to the model
    pub role: String,
    /// Extra standing instructions
    #[serde(default)]
    pub instructions: Vec<String>,
}

impl AgentProfile {
    pub fn new(id: impl Into<AgentId>, name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: role.into(),
            instructions: Vec::new(),
        }
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instructions.push(instruction.into());
        self
    }
}

/// Lifecycle state of an [`AgentRun`]
///
/// ```text
/// Pending → Reasoning ⇄ ToolCall
///              ├──→ Succeeded
///              └──→ Failed(reason)
/// (any non-terminal) ──→ Cancelled
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Reasoning,
    ToolCall,
    Succeeded,
    Failed { reason: FailureReason },
    Cancelled,
}

impl RunStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::Pending => "pending",
            RunStatus::Reasoning => "reasoning",
            RunStatus::ToolCall => "tool_call",
            RunStatus::Succeeded => "succeeded",
            RunStatus::Failed { .. } => "failed",
            RunStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Succeeded | RunStatus::Failed { .. } | RunStatus::Cancelled
        )
    }

    fn can_transition_to(&self, next: &RunStatus) -> bool {
        use RunStatus::*;
        match (self, next) {
            (s, Cancelled) => !s.is_terminal(),
            (Pending, Reasoning) => true,
            (Reasoning, ToolCall) => true,
            (ToolCall, Reasoning) => true,
            (Reasoning, Succeeded) => true,
            (Reasoning, Failed { .. }) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Failed { reason } => write!(f, "failed {}", reason),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// One execution of an agent against one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRun {
    pub agent: AgentId,
    pub agent_name: String,
    status: RunStatus,
    thoughts: Vec<Thought>,
    invocations: Vec<ToolInvocation>,
    answer: Option<String>,
    elapsed: Duration,
}

impl AgentRun {
    pub fn new(profile: &AgentProfile) -> Self {
        Self {
            agent: profile.id.clone(),
            agent_name: profile.name.clone(),
            status: RunStatus::Pending,
            thoughts: Vec::new(),
            invocations: Vec::new(),
            answer: None,
            elapsed: Duration::ZERO,
        }
    }

    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    pub fn thoughts(&self) -> &[Thought] {
        &self.thoughts
    }

    pub fn invocations(&self) -> &[ToolInvocation] {
        &self.invocations
    }

    /// Final answer; `Some` only once the run succeeded.
    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Succeeded
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match &self.status {
            RunStatus::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    fn transition(&mut self, next: RunStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(&next) {
            return Err(DomainError::IllegalTransition {
                from: self.status.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }
        self.status = next;
        Ok(())
    }

    /// `Pending → Reasoning` on the first step, `ToolCall → Reasoning` afterwards.
    pub fn reason(&mut self) -> Result<(), DomainError> {
        if self.status == RunStatus::Reasoning {
            return Ok(());
        }
        self.transition(RunStatus::Reasoning)
    }

    pub fn begin_tool_call(&mut self) -> Result<(), DomainError> {
        self.transition(RunStatus::ToolCall)
    }

    pub fn succeed(&mut self, answer: impl Into<String>) -> Result<(), DomainError> {
        self.transition(RunStatus::Succeeded)?;
        self.answer = Some(answer.into());
        Ok(())
    }

    pub fn fail(&mut self, reason: FailureReason) -> Result<(), DomainError> {
        self.transition(RunStatus::Failed { reason })
    }

    /// Cancel a run in progress. Cancelling a finished run is a no-op.
    pub fn cancel(&mut self) {
        if !self.status.is_terminal() {
            self.status = RunStatus::Cancelled;
        }
    }

    pub fn record_thought(&mut self, thought: Thought) {
        self.thoughts.push(thought);
    }

    pub fn record_invocation(&mut self, invocation: ToolInvocation) {
        self.invocations.push(invocation);
    }

    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
    }
}

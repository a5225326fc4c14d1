//! Tool domain value objects — invocation outcomes and their trace records.
//!
//! A tool returns either a [`ToolOutput`] or a [`ToolFailure`]. The agent
//! wraps the outcome in an immutable [`ToolInvocation`] and appends it to the
//! run's trace.

use crate::core::failure::FailureKind;
use crate::tool::entities::ToolCall;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Successful payload of a tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Text handed back to the model
    pub content: String,
    /// Optional structured data (e.g. the raw quote)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ToolOutput {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Typed failure of a tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl ToolFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(FailureKind::InvalidArgument, message)
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::new(
            FailureKind::Timeout,
            format!("Operation timed out: {}", operation.into()),
        )
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Transient, message)
    }

    pub fn permission_denied(resource: impl Into<String>) -> Self {
        Self::new(
            FailureKind::PermissionDenied,
            format!("Permission denied: {}", resource.into()),
        )
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

impl std::fmt::Display for ToolFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::error::Error for ToolFailure {}

/// Outcome recorded in a [`ToolInvocation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolOutcome {
    Output(ToolOutput),
    Failure(ToolFailure),
}

impl From<Result<ToolOutput, ToolFailure>> for ToolOutcome {
    fn from(result: Result<ToolOutput, ToolFailure>) -> Self {
        match result {
            Ok(output) => ToolOutcome::Output(output),
            Err(failure) => ToolOutcome::Failure(failure),
        }
    }
}

/// Immutable record of one tool call made during an agent run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub tool_name: String,
    pub arguments: HashMap<String, serde_json::Value>,
    pub outcome: ToolOutcome,
    /// Milliseconds since the Unix epoch when the first attempt started
    pub started_at: u64,
    /// Wall time across all attempts, including backoff
    pub elapsed: Duration,
    /// Attempts beyond the first
    pub retries: u32,
}

impl ToolInvocation {
    pub fn new(
        call: &ToolCall,
        outcome: ToolOutcome,
        started_at: u64,
        elapsed: Duration,
        retries: u32,
    ) -> Self {
        Self {
            tool_name: call.tool_name.clone(),
            arguments: call.arguments.clone(),
            outcome,
            started_at,
            elapsed,
            retries,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ToolOutcome::Output(_))
    }

    pub fn failure(&self) -> Option<&ToolFailure> {
        match &self.outcome {
            ToolOutcome::Failure(f) => Some(f),
            ToolOutcome::Output(_) => None,
        }
    }

    /// Text fed back to the model for the next reasoning step.
    pub fn observation(&self) -> String {
        match &self.outcome {
            ToolOutcome::Output(output) => output.content.clone(),
            ToolOutcome::Failure(failure) => format!("Tool error {}", failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_constructors() {
        let f = ToolFailure::timeout("get_stock_price");
        assert_eq!(f.kind, FailureKind::Timeout);
        assert!(f.is_retryable());
        assert!(f.message.contains("get_stock_price"));

        let f = ToolFailure::invalid_argument("symbol missing");
        assert!(!f.is_retryable());
        assert_eq!(f.to_string(), "[invalid_argument] symbol missing");
    }

    #[test]
    fn test_invocation_observation() {
        let call = ToolCall::new("web_search").with_arg("query", "NVIDIA");
        let ok = ToolInvocation::new(
            &call,
            Ok(ToolOutput::text("NVIDIA up 3%")).into(),
            1,
            Duration::from_millis(5),
            0,
        );
        assert!(ok.is_success());
        assert_eq!(ok.observation(), "NVIDIA up 3%");

        let failed = ToolInvocation::new(
            &call,
            ToolOutcome::Failure(ToolFailure::transient("503")),
            1,
            Duration::from_millis(5),
            2,
        );
        assert!(!failed.is_success());
        assert_eq!(failed.failure().unwrap().kind, FailureKind::Transient);
        assert_eq!(failed.observation(), "Tool error [transient] 503");
        assert_eq!(failed.arguments.get("query").unwrap(), "NVIDIA");
    }
}

//! Failure taxonomy shared by tools, the completion backend, agents and the team.
//!
//! | Kind | Retried? | Raised by |
//! |------|:---:|-----------|
//! | `InvalidArgument` | No | tool schema validation, malformed backend request |
//! | `Timeout` | Yes | tool or backend call exceeded its bound |
//! | `Transient` | Yes | network hiccup, 429/5xx |
//! | `PermissionDenied` | No | 401/403, access refused |
//! | `BackendUnavailable` | No | backend retries exhausted |
//! | `NoFinalAnswer` | No | agent ran out of rounds |
//! | `AllAgentsFailed` | No | team level, nothing succeeded |
//! | `Cancelled` | No | timeout or caller cancellation |
//! | `Internal` | No | agent task panicked |

use serde::{Deserialize, Serialize};

/// Category of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidArgument,
    Timeout,
    Transient,
    PermissionDenied,
    BackendUnavailable,
    NoFinalAnswer,
    AllAgentsFailed,
    Cancelled,
    Internal,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::InvalidArgument => "invalid_argument",
            FailureKind::Timeout => "timeout",
            FailureKind::Transient => "transient",
            FailureKind::PermissionDenied => "permission_denied",
            FailureKind::BackendUnavailable => "backend_unavailable",
            FailureKind::NoFinalAnswer => "no_final_answer",
            FailureKind::AllAgentsFailed => "all_agents_failed",
            FailureKind::Cancelled => "cancelled",
            FailureKind::Internal => "internal",
        }
    }

    /// Whether an operation failing with this kind may be retried with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FailureKind::Timeout | FailureKind::Transient)
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why an agent run failed.
///
/// `cause` records the underlying kind when the reported kind summarizes
/// several attempts, e.g. `BackendUnavailable` after repeated `Transient`
/// errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReason {
    pub kind: FailureKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<FailureKind>,
    pub message: String,
}

impl FailureReason {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            cause: None,
            message: message.into(),
        }
    }

    pub fn with_cause(mut self, cause: FailureKind) -> Self {
        self.cause = Some(cause);
        self
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.cause {
            Some(cause) => write!(f, "[{} <- {}] {}", self.kind, cause, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

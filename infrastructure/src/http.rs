//! Shared HTTP plumbing: client construction and failure classification.
//!
//! | Condition | Kind |
//! |-----------|------|
//! | 408, 429, 5xx | `Transient` |
//! | 401, 403 | `PermissionDenied` |
//! | other 4xx | `InvalidArgument` |
//! | request timeout | `Timeout` |
//! | connect / body errors | `Transient` |

use finteam_application::CompletionError;
use finteam_domain::{FailureKind, ToolFailure};
use reqwest::{Client, header};
use std::time::Duration;

pub const USER_AGENT: &str = concat!("finteam/", env!("CARGO_PKG_VERSION"));

/// Build a client with the given default headers and request timeout.
pub fn build_client(
    headers: header::HeaderMap,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(timeout)
        .build()
}

/// Classify an unsuccessful HTTP status.
pub fn kind_for_status(status: u16) -> FailureKind {
    match status {
        408 | 429 => FailureKind::Transient,
        401 | 403 => FailureKind::PermissionDenied,
        400..=499 => FailureKind::InvalidArgument,
        _ => FailureKind::Transient,
    }
}

/// Classify a transport-level error.
pub fn kind_for_error(err: &reqwest::Error) -> FailureKind {
    if err.is_timeout() {
        FailureKind::Timeout
    } else if let Some(status) = err.status() {
        kind_for_status(status.as_u16())
    } else if err.is_builder() {
        FailureKind::InvalidArgument
    } else {
        FailureKind::Transient
    }
}

/// Map a classified failure onto the completion port's error.
pub fn completion_error(kind: FailureKind, message: impl Into<String>) -> CompletionError {
    let message = message.into();
    match kind {
        FailureKind::Timeout => CompletionError::Timeout(message),
        FailureKind::Transient => CompletionError::Transient(message),
        FailureKind::PermissionDenied => CompletionError::PermissionDenied(message),
        FailureKind::InvalidArgument => CompletionError::InvalidRequest(message),
        _ => CompletionError::Unavailable(message),
    }
}

/// Map a transport error onto a tool failure, naming the operation.
pub fn tool_failure(operation: &str, err: &reqwest::Error) -> ToolFailure {
    match kind_for_error(err) {
        FailureKind::Timeout => ToolFailure::timeout(operation),
        kind => ToolFailure::new(kind, format!("{} failed: {}", operation, err)),
    }
}

/// Tool failure for an unsuccessful status.
pub fn tool_status_failure(operation: &str, status: u16) -> ToolFailure {
    match kind_for_status(status) {
        FailureKind::PermissionDenied => {
            ToolFailure::permission_denied(format!("{} (HTTP {})", operation, status))
        }
        kind => ToolFailure::new(kind, format!("{} returned HTTP {}", operation, status)),
    }
}

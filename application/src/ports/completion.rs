//! Completion backend port
//!
//! Defines the interface for asking a model for text.

use async_trait::async_trait;
use finteam_domain::FailureKind;
use thiserror::Error;

/// Errors that can occur during completion requests
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompletionError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Transient backend error: {0}")]
    Transient(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

impl CompletionError {
    /// Failure kind used for retry decisions and reporting.
    pub fn kind(&self) -> FailureKind {
        match self {
            CompletionError::Timeout(_) => FailureKind::Timeout,
            CompletionError::Transient(_) => FailureKind::Transient,
            CompletionError::PermissionDenied(_) => FailureKind::PermissionDenied,
            CompletionError::InvalidRequest(_) => FailureKind::InvalidArgument,
            CompletionError::Unavailable(_) => FailureKind::BackendUnavailable,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

/// One completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Text-completion service
///
/// This port defines how agents and the coordinator reach the model.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Model identifier, for logs and reports
    fn model(&self) -> &str;

    /// Send a request and get the response text
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;

    /// Cheap connectivity check run before a team starts.
    ///
    /// Default implementation sends a one-word prompt.
    async fn ping(&self) -> Result<(), CompletionError> {
        let request = CompletionRequest {
            system: "Reply with the single word OK.".to_string(),
            prompt: "ping".to_string(),
            temperature: 0.0,
            max_tokens: 8,
        };
        self.complete(&request).await.map(|_| ())
    }
}

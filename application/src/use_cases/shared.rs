//! Shared utilities for use cases.
//!
//! Cancellation-aware backend calls with retry, used by both the agent loop
//! and the coordinator's synthesis step.

use crate::config::RetryPolicy;
use crate::ports::completion::{CompletionBackend, CompletionRequest};
use finteam_domain::{DomainError, FailureKind, FailureReason};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Why a step stopped early.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StepExit {
    Failed(FailureReason),
    Cancelled,
}

impl From<DomainError> for StepExit {
    fn from(e: DomainError) -> Self {
        StepExit::Failed(FailureReason::new(FailureKind::InvalidArgument, e.to_string()))
    }
}

/// Check if cancellation has been requested.
pub(crate) fn check_cancelled(token: &CancellationToken) -> Result<(), StepExit> {
    if token.is_cancelled() {
        return Err(StepExit::Cancelled);
    }
    Ok(())
}

/// Sleep for `delay` unless cancelled first.
pub(crate) async fn backoff(delay: Duration, token: &CancellationToken) -> Result<(), StepExit> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(StepExit::Cancelled),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}

/// Send a request, retrying `Timeout`/`Transient` failures per `policy`.
///
/// Non-retryable failures are returned with their own kind. Exhausted
/// retries become `BackendUnavailable` with the last kind as cause. The
/// in-flight request is dropped as soon as `token` is cancelled.
pub(crate) async fn complete_with_retry(
    backend: &dyn CompletionBackend,
    request: &CompletionRequest,
    policy: &RetryPolicy,
    token: &CancellationToken,
) -> Result<String, StepExit> {
    let mut retries = 0u32;
    loop {
        check_cancelled(token)?;

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(StepExit::Cancelled),
            result = backend.complete(request) => result,
        };

        let error = match result {
            Ok(text) => return Ok(text),
            Err(e) => e,
        };

        let kind = error.kind();
        if !kind.is_retryable() {
            warn!("Backend {} failed: {}", backend.model(), error);
            return Err(StepExit::Failed(FailureReason::new(kind, error.to_string())));
        }

        if !policy.allows_retry(retries) {
            warn!(
                "Backend {} still failing after {} retries: {}",
                backend.model(),
                retries,
                error
            );
            return Err(StepExit::Failed(
                FailureReason::new(
                    FailureKind::BackendUnavailable,
                    format!("gave up after {} retries: {}", retries, error),
                )
                .with_cause(kind),
            ));
        }

        let delay = policy.delay_for(retries);
        retries += 1;
        debug!(
            "Backend error ({}), retry {}/{} in {:?}",
            kind, retries, policy.max_retries, delay
        );
        backoff(delay, token).await?;
    }
}

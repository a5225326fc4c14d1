//! Team configuration — everything the coordinator and its agents need
//! besides the collaborators themselves.

use super::retry_policy::RetryPolicy;
use finteam_domain::GenerationParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// A rejected configuration value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Coordinator and agent-loop parameters.
///
/// Generation values here are defaults; a [`Query`](finteam_domain::Query)
/// may override them per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamConfig {
    pub temperature: f32,
    pub max_tokens: u32,
    /// Tool rounds per agent before a final answer is forced
    pub tool_round_bound: usize,
    /// Wall-clock bound for a whole team run, synthesis included
    pub coordinator_timeout: Duration,
    /// Bound for a single tool attempt
    pub tool_timeout: Duration,
    pub backend_retry: RetryPolicy,
    pub tool_retry: RetryPolicy,
    pub event_queue_capacity: usize,
    /// How long the activity pump may keep draining after the run ends
    pub drain_grace: Duration,
}

impl Default for TeamConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 3000,
            tool_round_bound: 4,
            coordinator_timeout: Duration::from_secs(120),
            tool_timeout: Duration::from_secs(20),
            backend_retry: RetryPolicy::default(),
            tool_retry: RetryPolicy::default().with_max_retries(2),
            event_queue_capacity: 256,
            drain_grace: Duration::from_secs(2),
        }
    }
}

/// Generation parameters after applying query overrides to the config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedParams {
    pub temperature: f32,
    pub max_tokens: u32,
    pub tool_round_bound: usize,
}

impl TeamConfig {
    // ==================== Builder Methods ====================

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_tool_round_bound(mut self, bound: usize) -> Self {
        self.tool_round_bound = bound;
        self
    }

    pub fn with_coordinator_timeout(mut self, timeout: Duration) -> Self {
        self.coordinator_timeout = timeout;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    pub fn with_backend_retry(mut self, policy: RetryPolicy) -> Self {
        self.backend_retry = policy;
        self
    }

    pub fn with_tool_retry(mut self, policy: RetryPolicy) -> Self {
        self.tool_retry = policy;
        self
    }

    pub fn with_event_queue_capacity(mut self, capacity: usize) -> Self {
        self.event_queue_capacity = capacity;
        self
    }

    pub fn with_drain_grace(mut self, grace: Duration) -> Self {
        self.drain_grace = grace;
        self
    }

    // ==================== Validation ====================

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ConfigError::invalid(
                "temperature",
                format!("must be within [0, 1], got {}", self.temperature),
            ));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::invalid("max_tokens", "must be positive"));
        }
        if self.tool_round_bound == 0 {
            return Err(ConfigError::invalid("tool_round_bound", "must be positive"));
        }
        if self.coordinator_timeout.is_zero() {
            return Err(ConfigError::invalid("coordinator_timeout", "must be non-zero"));
        }
        if self.tool_timeout.is_zero() {
            return Err(ConfigError::invalid("tool_timeout", "must be non-zero"));
        }
        if self.event_queue_capacity == 0 {
            return Err(ConfigError::invalid("event_queue_capacity", "must be positive"));
        }
        for (field, policy) in [
            ("backend_retry", &self.backend_retry),
            ("tool_retry", &self.tool_retry),
        ] {
            if policy.initial_backoff > policy.max_backoff {
                return Err(ConfigError::invalid(
                    field,
                    "initial backoff exceeds max backoff",
                ));
            }
        }
        Ok(())
    }

    /// Apply per-query overrides.
    pub fn resolve(&self, params: &GenerationParams) -> ResolvedParams {
        ResolvedParams {
            temperature: params.temperature.unwrap_or(self.temperature),
            max_tokens: params.max_tokens.unwrap_or(self.max_tokens),
            tool_round_bound: params.tool_round_bound.unwrap_or(self.tool_round_bound),
        }
    }
}

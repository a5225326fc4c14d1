//! Raw TOML configuration data types
//!
//! These structs mirror the config file. They are deserialized directly and
//! turned into a validated [`TeamConfig`] with [`FileConfig::to_team_config`].

use finteam_application::{RetryPolicy, TeamConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// One problem found in a config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    /// Dotted key, e.g. `generation.temperature`
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors from validating the merged configuration
#[derive(Error, Debug)]
pub enum ConfigValidationError {
    #[error("invalid configuration ({} issue(s)): {}", .0.len(), join_issues(.0))]
    Invalid(Vec<ConfigIssue>),
}

fn join_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// `[backend]` — completion service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackendConfig {
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Inline API key; takes precedence over `api_key_env`
    pub api_key: Option<String>,
    pub base_url: String,
    pub request_timeout_seconds: u64,
}

impl Default for FileBackendConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            request_timeout_seconds: 60,
        }
    }
}

impl FileBackendConfig {
    /// Inline key, else the value of `api_key_env`. Empty values count as unset.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

/// `[generation]` — defaults for every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGenerationConfig {
    pub temperature: f32,
    pub max_tokens: u32,
    pub tool_round_bound: usize,
}

impl Default for FileGenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 3000,
            tool_round_bound: 4,
        }
    }
}

/// `[team]` — membership and coordinator limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTeamConfig {
    pub timeout_seconds: u64,
    pub web_agent: bool,
    pub finance_agent: bool,
    pub event_queue_capacity: usize,
}

impl Default for FileTeamConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 120,
            web_agent: true,
            finance_agent: true,
            event_queue_capacity: 256,
        }
    }
}

/// `[retry]` — backoff for backend and tool failures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    pub backend_max_retries: u32,
    pub tool_max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for FileRetryConfig {
    fn default() -> Self {
        Self {
            backend_max_retries: 3,
            tool_max_retries: 2,
            initial_backoff_ms: 500,
            max_backoff_ms: 8000,
        }
    }
}

/// `[tools]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileToolsConfig {
    pub timeout_seconds: u64,
}

impl Default for FileToolsConfig {
    fn default() -> Self {
        Self { timeout_seconds: 20 }
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub backend: FileBackendConfig,
    pub generation: FileGenerationConfig,
    pub team: FileTeamConfig,
    pub retry: FileRetryConfig,
    pub tools: FileToolsConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.backend.model.trim().is_empty() {
            issues.push(ConfigIssue::new("backend.model", "cannot be empty"));
        }
        if !self.backend.base_url.starts_with("http://")
            && !self.backend.base_url.starts_with("https://")
        {
            issues.push(ConfigIssue::new(
                "backend.base_url",
                format!("'{}' is not an http(s) URL", self.backend.base_url),
            ));
        }
        if self.backend.request_timeout_seconds == 0 {
            issues.push(ConfigIssue::new("backend.request_timeout_seconds", "cannot be 0"));
        }

        if !(0.0..=1.0).contains(&self.generation.temperature) {
            issues.push(ConfigIssue::new(
                "generation.temperature",
                format!("must be within [0, 1], got {}", self.generation.temperature),
            ));
        }
        if self.generation.max_tokens == 0 {
            issues.push(ConfigIssue::new("generation.max_tokens", "cannot be 0"));
        }
        if self.generation.tool_round_bound == 0 {
            issues.push(ConfigIssue::new("generation.tool_round_bound", "cannot be 0"));
        }

        if self.team.timeout_seconds == 0 {
            issues.push(ConfigIssue::new("team.timeout_seconds", "cannot be 0"));
        }
        if self.team.event_queue_capacity == 0 {
            issues.push(ConfigIssue::new("team.event_queue_capacity", "cannot be 0"));
        }

        if self.retry.initial_backoff_ms > self.retry.max_backoff_ms {
            issues.push(ConfigIssue::new(
                "retry.initial_backoff_ms",
                "cannot exceed retry.max_backoff_ms",
            ));
        }

        if self.tools.timeout_seconds == 0 {
            issues.push(ConfigIssue::new("tools.timeout_seconds", "cannot be 0"));
        }

        issues
    }

    /// Convert to the application's [`TeamConfig`], failing with every issue found.
    pub fn to_team_config(&self) -> Result<TeamConfig, ConfigValidationError> {
        let issues = self.validate();
        if !issues.is_empty() {
            return Err(ConfigValidationError::Invalid(issues));
        }

        let initial = Duration::from_millis(self.retry.initial_backoff_ms);
        let max = Duration::from_millis(self.retry.max_backoff_ms);
        let config = TeamConfig::default()
            .with_temperature(self.generation.temperature)
            .with_max_tokens(self.generation.max_tokens)
            .with_tool_round_bound(self.generation.tool_round_bound)
            .with_coordinator_timeout(Duration::from_secs(self.team.timeout_seconds))
            .with_tool_timeout(Duration::from_secs(self.tools.timeout_seconds))
            .with_event_queue_capacity(self.team.event_queue_capacity)
            .with_backend_retry(RetryPolicy::new(self.retry.backend_max_retries, initial, max))
            .with_tool_retry(RetryPolicy::new(self.retry.tool_max_retries, initial, max));

        config.validate().map_err(|e| {
            ConfigValidationError::Invalid(vec![ConfigIssue::new("team", e.to_string())])
        })?;
        Ok(config)
    }

    /// Effective configuration as TOML, with any inline API key masked.
    pub fn to_redacted_toml(&self) -> Result<String, toml::ser::Error> {
        let mut shown = self.clone();
        if shown.backend.api_key.is_some() {
            shown.backend.api_key = Some("********".to_string());
        }
        toml::to_string_pretty(&shown)
    }
}

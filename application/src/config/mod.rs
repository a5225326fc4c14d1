//! Application-level configuration.
//!
//! - [`TeamConfig`] — generation defaults, round bound, timeouts, queue sizing
//! - [`RetryPolicy`] — exponential backoff for backend and tool retries

pub mod retry_policy;
pub mod team_config;

pub use retry_policy::RetryPolicy;
pub use team_config::{ConfigError, ResolvedParams, TeamConfig};

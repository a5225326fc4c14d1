//! Application layer for finteam
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod activity;
pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use activity::{ActivityPump, ActivityQueue, EventEmitter};
pub use config::{ConfigError, ResolvedParams, RetryPolicy, TeamConfig};
pub use ports::{
    activity_observer::{ActivityObserver, CompositeObserver, NoActivity},
    capability_tool::CapabilityTool,
    completion::{CompletionBackend, CompletionError, CompletionRequest},
};
pub use use_cases::run_agent::{Agent, RunAgentUseCase};
pub use use_cases::run_team::TeamCoordinator;

//! Domain layer for finteam
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Team
//!
//! A query is fanned out to several agents, each with its own role and
//! tools. Their final answers are merged into one [`TeamReport`] in
//! registration order, independent of which agent finished first.
//!
//! ## Agent run
//!
//! Each agent runs a bounded reasoning loop recorded as an [`AgentRun`]:
//! thoughts, [`ToolInvocation`]s, and a terminal [`RunStatus`].
//!
//! ## Activity
//!
//! Progress is reported as ordered [`ActivityEvent`]s, numbered per source.

pub mod activity;
pub mod agent;
pub mod core;
pub mod prompt;
pub mod team;
pub mod tool;

// Re-export commonly used types
pub use activity::{ActivityEvent, EventKind, TEAM_SOURCE};
pub use agent::{
    entities::{AgentProfile, AgentRun, RunStatus},
    response_parser::{AgentStep, parse_step},
    value_objects::{AgentId, Thought, now_millis},
};
pub use core::{
    error::DomainError,
    failure::{FailureKind, FailureReason},
    query::{GenerationParams, Query},
};
pub use prompt::{PromptTemplate, ScratchpadEntry};
pub use team::{AgentFailure, MergeMode, RunSummary, TeamReport, concatenate_answers};
pub use tool::{
    entities::{ParamType, ToolCall, ToolDefinition, ToolParameter, ToolSpec},
    traits::{DefaultToolValidator, ToolValidator},
    value_objects::{ToolFailure, ToolInvocation, ToolOutcome, ToolOutput},
};

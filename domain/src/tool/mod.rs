//! Tool domain module
//!
//! Capability tools give agents access to the outside world (web search,
//! market data). This module holds the pure side of that contract:
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────────┐
//! │ ToolSpec     │───▶│ ToolCall     │───▶│ ToolInvocation   │
//! │ (catalogue)  │    │ (request)    │    │ (trace record)   │
//! └──────────────┘    └──────────────┘    └──────────────────┘
//! ```
//!
//! - [`ToolDefinition`] / [`ToolParameter`] — declared schema
//! - [`ToolValidator`] — schema check run before any invocation
//! - [`ToolOutput`] / [`ToolFailure`] — invocation result
//! - [`ToolInvocation`] — immutable record appended to an agent run
//!
//! Invocation itself (network I/O, timeouts) is behind the application
//! layer's `CapabilityTool` port.

pub mod entities;
pub mod traits;
pub mod value_objects;

pub use entities::{ParamType, ToolCall, ToolDefinition, ToolParameter, ToolSpec};
pub use traits::{DefaultToolValidator, ToolValidator};
pub use value_objects::{ToolFailure, ToolInvocation, ToolOutcome, ToolOutput};

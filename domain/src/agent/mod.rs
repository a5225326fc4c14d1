//! Agent domain module
//!
//! An agent is a bounded reasoning loop: it asks the backend for the next
//! step, calls tools when asked to, and stops at a final answer or when its
//! round budget runs out. This module holds the data side of that loop.
//!
//! - [`AgentProfile`](entities::AgentProfile) — id, display name, role, instructions
//! - [`AgentRun`](entities::AgentRun) — one execution against one query, with
//!   its [`RunStatus`](entities::RunStatus) state machine
//! - [`parse_step`](response_parser::parse_step) — backend text → [`AgentStep`](response_parser::AgentStep)

pub mod entities;
pub mod response_parser;
pub mod value_objects;

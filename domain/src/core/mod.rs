//! Core domain concepts shared across all subdomains.
//!
//! - [`query::Query`] — a validated user request with generation overrides
//! - [`failure::FailureKind`] — the failure taxonomy used by every layer
//! - [`error::DomainError`] — domain-level errors

pub mod error;
pub mod failure;
pub mod query;
pub mod string;

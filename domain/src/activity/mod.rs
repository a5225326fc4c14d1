//! Activity (live progress) domain: the [`ActivityEvent`] model.
//!
//! Delivery, backpressure and observers live in the application layer.

pub mod event;

pub use event::{ActivityEvent, EventKind, TEAM_SOURCE};

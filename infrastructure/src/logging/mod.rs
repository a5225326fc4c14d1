//! Logging infrastructure — activity transcripts.
//!
//! Provides [`JsonlActivityLog`], a JSONL file writer that implements the
//! [`ActivityObserver`](finteam_application::ActivityObserver) port.

mod jsonl_activity;

pub use jsonl_activity::JsonlActivityLog;

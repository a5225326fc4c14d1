//! Progress reporting for team runs

pub mod activity;

pub use activity::{ActivityDisplay, SimpleActivity, format_event};

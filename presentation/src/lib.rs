//! Presentation layer for finteam
//!
//! This crate contains the CLI definition, the live activity display and
//! report formatters.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, DEFAULT_QUERY, OutputFormat};
pub use output::{ConsoleFormatter, OutputFormatter};
pub use progress::{ActivityDisplay, SimpleActivity, format_event};

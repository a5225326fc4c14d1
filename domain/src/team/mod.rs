//! Team domain: the merged [`TeamReport`](report::TeamReport).

pub mod report;

pub use report::{AgentFailure, MergeMode, RunSummary, TeamReport, concatenate_answers};

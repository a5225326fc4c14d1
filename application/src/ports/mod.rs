//! Port definitions (interfaces for external dependencies)

pub mod activity_observer;
pub mod capability_tool;
pub mod completion;

//! Prompt domain
//!
//! Templates for agent reasoning steps and for team synthesis.

mod template;

pub use template::{PromptTemplate, ScratchpadEntry};

//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid generation parameter: {0}")]
    InvalidParameter(String),

    #[error("Duplicate agent id: {0}")]
    DuplicateAgent(String),

    #[error("Duplicate tool name '{tool}' for agent '{agent}'")]
    DuplicateTool { agent: String, tool: String },

    #[error("Illegal run transition: {from} -> {to}")]
    IllegalTransition { from: String, to: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_illegal_transition_display() {
        let error = DomainError::IllegalTransition {
            from: "succeeded".to_string(),
            to: "reasoning".to_string(),
        };
        assert_eq!(error.to_string(), "Illegal run transition: succeeded -> reasoning");
    }

    #[test]
    fn test_duplicate_tool_display() {
        let error = DomainError::DuplicateTool {
            agent: "web".to_string(),
            tool: "web_search".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Duplicate tool name 'web_search' for agent 'web'"
        );
    }
}

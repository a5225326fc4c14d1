//! Tool domain traits
//!
//! Pure argument validation against a [`ToolDefinition`]. The async
//! invocation contract lives in the application layer (`CapabilityTool`).

use super::entities::{ToolCall, ToolDefinition};
use super::value_objects::ToolFailure;

/// Validator for tool calls
pub trait ToolValidator {
    /// Validate a tool call against its definition
    fn validate(&self, call: &ToolCall, definition: &ToolDefinition) -> Result<(), ToolFailure>;
}

/// Default validator: required present, no unknown names, types match
#[derive(Debug, Clone, Default)]
pub struct DefaultToolValidator;

impl ToolValidator for DefaultToolValidator {
    fn validate(&self, call: &ToolCall, definition: &ToolDefinition) -> Result<(), ToolFailure> {
        for param in &definition.parameters {
            match call.arguments.get(&param.name) {
                None | Some(serde_json::Value::Null) if param.required => {
                    return Err(ToolFailure::invalid_argument(format!(
                        "Missing required parameter '{}' for tool '{}'",
                        param.name, definition.name
                    )));
                }
                Some(value) if !value.is_null() && !param.param_type.accepts(value) => {
                    return Err(ToolFailure::invalid_argument(format!(
                        "Parameter '{}' for tool '{}' must be {}",
                        param.name, definition.name, param.param_type
                    )));
                }
                _ => {}
            }
        }

        for arg_name in call.arguments.keys() {
            if !definition.parameters.iter().any(|p| &p.name == arg_name) {
                return Err(ToolFailure::invalid_argument(format!(
                    "Unknown parameter '{}' for tool '{}'",
                    arg_name, definition.name
                )));
            }
        }

        Ok(())
    }
}

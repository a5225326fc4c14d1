//! Capability tool port
//!
//! Defines the interface for tools an agent may call (web search, market data).

use async_trait::async_trait;
use finteam_domain::{ToolCall, ToolDefinition, ToolFailure, ToolOutput};

/// A named capability with a declared parameter schema
///
/// Arguments are validated against [`definition`](Self::definition) before
/// `invoke` is called, and each call is bounded by the agent's tool timeout.
/// Implementations must not retry on their own.
#[async_trait]
pub trait CapabilityTool: Send + Sync {
    /// Declared name, description and parameters
    fn definition(&self) -> &ToolDefinition;

    fn name(&self) -> &str {
        &self.definition().name
    }

    /// Execute a validated call
    async fn invoke(&self, call: &ToolCall) -> Result<ToolOutput, ToolFailure>;
}

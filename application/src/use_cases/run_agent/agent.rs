//! A configured team member: profile plus the tools it may call.

use crate::ports::capability_tool::CapabilityTool;
use finteam_domain::{AgentId, AgentProfile, DomainError, ToolSpec};
use std::collections::HashMap;
use std::sync::Arc;

/// An agent ready to run: who it is and which capabilities it holds.
///
/// Tool names are unique within one agent.
pub struct Agent {
    profile: AgentProfile,
    spec: ToolSpec,
    tools: HashMap<String, Arc<dyn CapabilityTool>>,
}

impl Agent {
    pub fn new(profile: AgentProfile) -> Self {
        Self {
            profile,
            spec: ToolSpec::new(),
            tools: HashMap::new(),
        }
    }

    /// Add a capability. Fails if the agent already has a tool of that name.
    pub fn with_tool(mut self, tool: Arc<dyn CapabilityTool>) -> Result<Self, DomainError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(DomainError::DuplicateTool {
                agent: self.profile.id.to_string(),
                tool: name,
            });
        }
        self.spec = std::mem::take(&mut self.spec).register(tool.definition().clone());
        self.tools.insert(name, tool);
        Ok(self)
    }

    /// Accept `alias` as another name for the registered tool `canonical`.
    pub fn with_tool_alias(mut self, alias: &str, canonical: &str) -> Self {
        self.spec = std::mem::take(&mut self.spec).register_alias(alias, canonical);
        self
    }

    pub fn id(&self) -> &AgentId {
        &self.profile.id
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    pub fn tool_spec(&self) -> &ToolSpec {
        &self.spec
    }

    /// Look up a tool by name or alias.
    pub fn tool(&self, name: &str) -> Option<&Arc<dyn CapabilityTool>> {
        let canonical = self.spec.resolve(name)?;
        self.tools.get(canonical)
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.profile.id)
            .field("tools", &self.spec.names().collect::<Vec<_>>())
            .finish()
    }
}

//! Prompt templates for agent reasoning and team synthesis

use crate::agent::entities::AgentProfile;
use crate::tool::entities::ToolSpec;

/// One completed step of an agent's scratchpad, replayed to the model on
/// the next request.
#[derive(Debug, Clone, PartialEq)]
pub struct ScratchpadEntry {
    pub thought: Option<String>,
    /// `tool(args)` rendering of the call, `None` for a rejected response
    pub action: Option<String>,
    pub observation: String,
}

impl ScratchpadEntry {
    pub fn tool(thought: Option<String>, action: String, observation: String) -> Self {
        Self {
            thought,
            action: Some(action),
            observation,
        }
    }

    pub fn malformed() -> Self {
        Self {
            thought: None,
            action: None,
            observation: "Your previous response was neither a tool call nor a final answer. \
                          Reply with one JSON object as described."
                .to_string(),
        }
    }
}

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for an agent: role, instructions, tool catalogue and
    /// the reply protocol.
    pub fn agent_system(profile: &AgentProfile, tools: &ToolSpec) -> String {
        let mut prompt = format!(
            "You are {}, a member of a market analysis team.\nYour role: {}.\n",
            profile.name, profile.role
        );

        if !profile.instructions.is_empty() {
            prompt.push_str("\nInstructions:\n");
            for instruction in &profile.instructions {
                prompt.push_str(&format!("- {}\n", instruction));
            }
        }

        prompt.push_str("\nAvailable tools:\n");
        if tools.is_empty() {
            prompt.push_str("(none)\n");
        }
        for tool in tools.all() {
            prompt.push_str(&format!("- {}\n", tool.signature()));
        }

        prompt.push_str(
            r#"
Reply with exactly one JSON object and nothing else.

To call a tool:
{"thought": "why you need it", "tool": "tool_name", "arguments": {"param": "value"}}

When you have enough information:
{"thought": "summary of your reasoning", "final_answer": "your answer"}

Call one tool at a time. Use only the tools listed above."#,
        );

        prompt
    }

    /// User prompt for the next reasoning step.
    pub fn agent_step(query: &str, scratchpad: &[ScratchpadEntry]) -> String {
        let mut prompt = format!("Query: {}\n", query);

        if scratchpad.is_empty() {
            prompt.push_str("\nDecide on your first step.");
            return prompt;
        }

        prompt.push_str("\nPrevious steps:\n");
        for (i, entry) in scratchpad.iter().enumerate() {
            prompt.push_str(&format!("\n--- Step {} ---\n", i + 1));
            if let Some(thought) = &entry.thought {
                prompt.push_str(&format!("Thought: {}\n", thought));
            }
            if let Some(action) = &entry.action {
                prompt.push_str(&format!("Action: {}\n", action));
            }
            prompt.push_str(&format!("Observation: {}\n", entry.observation));
        }

        prompt.push_str("\nDecide on your next step.");
        prompt
    }

    /// User prompt once the tool round budget is spent.
    pub fn agent_final(query: &str, scratchpad: &[ScratchpadEntry]) -> String {
        let mut prompt = Self::agent_step(query, scratchpad);
        prompt.push_str(
            "\n\nYou may not call any more tools. Reply now with \
             {\"thought\": \"...\", \"final_answer\": \"...\"} using what you have gathered.",
        );
        prompt
    }

    /// System prompt for merging agent answers into one team answer.
    pub fn synthesis_system(team_instructions: &[String]) -> String {
        let mut prompt = String::from(
            r#"You are the lead analyst of a market analysis team.
Your task is to merge the findings of your team members into one coherent answer.
Keep every cited source and every figure. Do not invent data that no member reported."#,
        );

        if !team_instructions.is_empty() {
            prompt.push_str("\n\nTeam instructions:\n");
            for instruction in team_instructions {
                prompt.push_str(&format!("- {}\n", instruction));
            }
        }

        prompt
    }

    /// User prompt for synthesis. `answers` are `(agent name, answer)` pairs
    /// in registration order.
    pub fn synthesis_prompt(query: &str, answers: &[(String, String)]) -> String {
        let mut prompt = format!("Original query: {}\n\nTeam findings:\n", query);

        for (name, answer) in answers {
            prompt.push_str(&format!("\n--- {} ---\n{}\n", name, answer));
        }

        prompt.push_str("\nWrite the combined answer in markdown.");
        prompt
    }
}

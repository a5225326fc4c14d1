//! Parsing of backend responses into agent steps.
//!
//! The agent prompt asks the model for one of:
//!
//! ```json
//! {"thought": "...", "tool": "get_stock_price", "arguments": {"symbol": "NVDA"}}
//! {"thought": "...", "final_answer": "..."}
//! ```
//!
//! optionally inside a fenced code block, or a plain-text answer introduced
//! by a `Final Answer:` line. Anything else is malformed and yields `None`.

use crate::tool::entities::ToolCall;
use serde_json::Value;

const FINAL_ANSWER_MARKER: &str = "final answer:";

/// One parsed reasoning step.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentStep {
    Final {
        thought: Option<String>,
        answer: String,
    },
    Call {
        thought: Option<String>,
        call: ToolCall,
    },
}

impl AgentStep {
    pub fn thought(&self) -> Option<&str> {
        match self {
            AgentStep::Final { thought, .. } | AgentStep::Call { thought, .. } => {
                thought.as_deref()
            }
        }
    }
}

/// Parse a backend response. Returns `None` when it is neither a tool call
/// nor a final answer.
pub fn parse_step(response: &str) -> Option<AgentStep> {
    extract_json_object(response)
        .and_then(|json| parse_step_json(&json))
        .or_else(|| parse_final_answer_marker(response))
}

fn parse_step_json(json: &Value) -> Option<AgentStep> {
    let thought = json
        .get("thought")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    if let Some(answer) = json
        .get("final_answer")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        return Some(AgentStep::Final {
            thought,
            answer: answer.to_string(),
        });
    }

    let tool = json
        .get("tool")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())?;

    let mut call = ToolCall::new(tool);
    match json.get("arguments").or_else(|| json.get("args")) {
        None | Some(Value::Null) => {}
        Some(Value::Object(map)) => {
            for (key, value) in map {
                call = call.with_arg(key.clone(), value.clone());
            }
        }
        Some(_) => return None,
    }

    Some(AgentStep::Call { thought, call })
}

fn parse_final_answer_marker(response: &str) -> Option<AgentStep> {
    let mut offset = 0usize;
    for line in response.split_inclusive('\n') {
        let trimmed_start = line.len() - line.trim_start().len();
        let is_marker = line
            .trim_start()
            .get(..FINAL_ANSWER_MARKER.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(FINAL_ANSWER_MARKER));
        if is_marker {
            let answer_start = offset + trimmed_start + FINAL_ANSWER_MARKER.len();
            let answer = response[answer_start..].trim();
            if answer.is_empty() {
                return None;
            }
            let before = response[..offset].trim();
            return Some(AgentStep::Final {
                thought: (!before.is_empty()).then(|| before.to_string()),
                answer: answer.to_string(),
            });
        }
        offset += line.len();
    }
    None
}

/// Find a JSON object: first a fenced block, then the whole text, then the
/// outermost `{ ... }` span.
fn extract_json_object(response: &str) -> Option<Value> {
    let mut in_block = false;
    let mut block = String::new();
    for line in response.lines() {
        let trimmed = line.trim();
        if !in_block && trimmed.starts_with("```") {
            in_block = true;
            block.clear();
        } else if in_block && trimmed == "```" {
            in_block = false;
            if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(&block) {
                return Some(value);
            }
        } else if in_block {
            block.push_str(line);
            block.push('\n');
        }
    }

    let trimmed = response.trim();
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&trimmed[start..=end]) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

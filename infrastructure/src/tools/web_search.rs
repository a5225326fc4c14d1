//! `web_search` tool — search the web using the DuckDuckGo Instant Answer API.
//!
//! The API needs no key and returns abstracts, instant answers, definitions
//! and related topics rather than a full result listing.
//!
//! # Output Format
//!
//! Markdown with one section per populated field. Every item that carries a
//! URL is numbered `[n]` and the URLs are repeated under **Sources**, so the
//! agent can cite them directly.
//!
//! # Parameters
//!
//! | Name | Type | Required | Description |
//! |------|------|:---:|-------------|
//! | `query` | string | Yes | The search query |
//!
//! # Aliases
//!
//! `search`, `web` → `web_search`

use crate::http::{build_client, tool_failure, tool_status_failure};
use async_trait::async_trait;
use finteam_application::CapabilityTool;
use finteam_domain::{ToolCall, ToolDefinition, ToolFailure, ToolOutput, ToolParameter};
use reqwest::{Client, header};
use std::time::Duration;
use tracing::debug;

/// Canonical tool name for the web search tool.
pub const WEB_SEARCH: &str = "web_search";

/// DuckDuckGo Instant Answer API endpoint (no API key required).
const DDG_API_URL: &str = "https://api.duckduckgo.com/";

const MAX_RELATED_TOPICS: usize = 8;

pub fn web_search_definition() -> ToolDefinition {
    ToolDefinition::new(
        WEB_SEARCH,
        "Search the web for recent information. Returns summaries and related links with numbered sources.",
    )
    .with_parameter(ToolParameter::new("query", "The search query", true))
}

pub struct WebSearchTool {
    client: Client,
    endpoint: String,
    definition: ToolDefinition,
}

impl WebSearchTool {
    pub fn new(request_timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client(header::HeaderMap::new(), request_timeout)?,
            endpoint: DDG_API_URL.to_string(),
            definition: web_search_definition(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl CapabilityTool for WebSearchTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn invoke(&self, call: &ToolCall) -> Result<ToolOutput, ToolFailure> {
        let query = call
            .require_string("query")
            .map_err(ToolFailure::invalid_argument)?;
        debug!(query, "Running web search");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|e| tool_failure("Web search", &e))?;

        if !response.status().is_success() {
            return Err(tool_status_failure("Web search", response.status().as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ToolFailure::transient(format!("Failed to parse search results: {}", e)))?;

        Ok(ToolOutput::text(format_search_results(query, &body)))
    }
}

/// Numbered source list built up while formatting.
#[derive(Default)]
struct Sources(Vec<String>);

impl Sources {
    /// Register a URL and return its citation marker.
    fn cite(&mut self, url: &str) -> String {
        if url.is_empty() {
            return String::new();
        }
        let index = match self.0.iter().position(|u| u == url) {
            Some(i) => i + 1,
            None => {
                self.0.push(url.to_string());
                self.0.len()
            }
        };
        format!(" [{}]", index)
    }
}

/// Format a DuckDuckGo API response into markdown with numbered sources.
fn format_search_results(query: &str, data: &serde_json::Value) -> String {
    let mut sections: Vec<String> = Vec::new();
    let mut sources = Sources::default();

    sections.push(format!("## Search Results for: {}", query));

    if let Some(abstract_text) = data["AbstractText"].as_str()
        && !abstract_text.is_empty()
    {
        let source = data["AbstractSource"].as_str().unwrap_or("Unknown");
        let marker = sources.cite(data["AbstractURL"].as_str().unwrap_or(""));
        sections.push(format!("### Summary ({})\n{}{}", source, abstract_text, marker));
    }

    if let Some(answer) = data["Answer"].as_str()
        && !answer.is_empty()
    {
        sections.push(format!("### Instant Answer\n{}", answer));
    }

    if let Some(definition) = data["Definition"].as_str()
        && !definition.is_empty()
    {
        let source = data["DefinitionSource"].as_str().unwrap_or("Unknown");
        let marker = sources.cite(data["DefinitionURL"].as_str().unwrap_or(""));
        sections.push(format!("### Definition ({})\n{}{}", source, definition, marker));
    }

    if let Some(topics) = data["RelatedTopics"].as_array() {
        let topic_texts: Vec<String> = flatten_topics(topics)
            .into_iter()
            .take(MAX_RELATED_TOPICS)
            .map(|(text, url)| format!("- {}{}", text, sources.cite(url)))
            .collect();

        if !topic_texts.is_empty() {
            sections.push(format!("### Related Topics\n{}", topic_texts.join("\n")));
        }
    }

    if sections.len() == 1 {
        sections.push(
            "No instant answer available. Try a shorter query or a company name.".to_string(),
        );
    }

    if !sources.0.is_empty() {
        let list = sources
            .0
            .iter()
            .enumerate()
            .map(|(i, url)| format!("[{}] {}", i + 1, url))
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(format!("### Sources\n{}", list));
    }

    sections.join("\n\n")
}

/// Topics with text, including those nested one level inside topic groups.
fn flatten_topics(topics: &[serde_json::Value]) -> Vec<(&str, &str)> {
    let mut flat = Vec::new();
    for topic in topics {
        if let Some(text) = topic["Text"].as_str() {
            if !text.is_empty() {
                flat.push((text, topic["FirstURL"].as_str().unwrap_or("")));
            }
        } else if let Some(group) = topic["Topics"].as_array() {
            for inner in group {
                if let Some(text) = inner["Text"].as_str()
                    && !text.is_empty()
                {
                    flat.push((text, inner["FirstURL"].as_str().unwrap_or("")));
                }
            }
        }
    }
    flat
}

#[cfg(test)]
mod tests {
    use super::*;
    use finteam_domain::FailureKind;

    #[test]
    fn test_format_with_abstract_cites_source() {
        let data = serde_json::json!({
            "AbstractText": "Nvidia Corporation is an American technology company.",
            "AbstractSource": "Wikipedia",
            "AbstractURL": "https://en.wikipedia.org/wiki/Nvidia",
            "Answer": "",
            "Definition": "",
            "RelatedTopics": []
        });

        let output = format_search_results("NVIDIA", &data);
        assert!(output.contains("## Search Results for: NVIDIA"));
        assert!(output.contains("American technology company. [1]"));
        assert!(output.contains("### Sources\n[1] https://en.wikipedia.org/wiki/Nvidia"));
    }

    #[test]
    fn test_format_empty() {
        let data = serde_json::json!({
            "AbstractText": "",
            "Answer": "",
            "Definition": "",
            "RelatedTopics": []
        });

        let output = format_search_results("obscure query", &data);
        assert!(output.contains("No instant answer available"));
        assert!(!output.contains("### Sources"));
    }

    #[test]
    fn test_format_related_topics_numbered_and_deduplicated() {
        let data = serde_json::json!({
            "AbstractText": "GPU maker.",
            "AbstractURL": "https://example.com/1",
            "RelatedTopics": [
                {"Text": "Topic 1", "FirstURL": "https://example.com/1"},
                {"Text": "Topic 2", "FirstURL": "https://example.com/2"},
                {"Name": "Group", "Topics": [
                    {"Text": "Nested", "FirstURL": "https://example.com/3"}
                ]}
            ]
        });

        let output = format_search_results("test", &data);
        assert!(output.contains("- Topic 1 [1]"));
        assert!(output.contains("- Topic 2 [2]"));
        assert!(output.contains("- Nested [3]"));
        assert!(output.contains("[3] https://example.com/3"));
        assert!(!output.contains("[4]"));
    }

    #[test]
    fn test_related_topics_capped() {
        let topics: Vec<_> = (0..20)
            .map(|i| serde_json::json!({"Text": format!("T{}", i), "FirstURL": format!("https://e.com/{}", i)}))
            .collect();
        let data = serde_json::json!({ "RelatedTopics": topics });
        let output = format_search_results("many", &data);
        assert!(output.contains(&format!("[{}]", MAX_RELATED_TOPICS)));
        assert!(!output.contains(&format!("[{}]", MAX_RELATED_TOPICS + 1)));
    }

    #[tokio::test]
    async fn test_missing_query_is_invalid_argument() {
        let tool = WebSearchTool::new(Duration::from_secs(1))
            .unwrap()
            .with_endpoint("http://127.0.0.1:9");
        let err = tool.invoke(&ToolCall::new(WEB_SEARCH)).await.unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidArgument);
    }

    #[test]
    fn test_definition() {
        let def = web_search_definition();
        assert_eq!(def.signature().split(" - ").next(), Some("web_search(query: string)"));
    }
}

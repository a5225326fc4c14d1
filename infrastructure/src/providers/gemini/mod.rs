//! Gemini completion backend
//!
//! Talks to the `generateContent` REST endpoint with an API key header.
//! Every request is stateless: the system instruction and the full prompt
//! are sent each time.

mod types;

use crate::http::{build_client, completion_error, kind_for_error, kind_for_status};
use async_trait::async_trait;
use finteam_application::{CompletionBackend, CompletionError, CompletionRequest};
use reqwest::{Client, header};
use std::time::Duration;
use tracing::debug;
use types::{
    Content, ErrorEnvelope, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Connection settings for [`GeminiBackend`].
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub model: String,
    pub api_key: String,
    pub base_url: String,
    pub request_timeout: Duration,
}

impl GeminiSettings {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(60),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

pub struct GeminiBackend {
    client: Client,
    model: String,
    endpoint: String,
}

impl GeminiBackend {
    pub fn new(settings: GeminiSettings) -> Result<Self, CompletionError> {
        if settings.api_key.trim().is_empty() {
            return Err(CompletionError::PermissionDenied(
                "API key is empty".to_string(),
            ));
        }

        let mut headers = header::HeaderMap::new();
        let key = header::HeaderValue::from_str(&settings.api_key)
            .map_err(|_| CompletionError::InvalidRequest("API key is not a valid header".into()))?;
        headers.insert("x-goog-api-key", key);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = build_client(headers, settings.request_timeout)
            .map_err(|e| CompletionError::Unavailable(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint_for(&settings.base_url, &settings.model),
            model: settings.model,
        })
    }
}

fn endpoint_for(base_url: &str, model: &str) -> String {
    format!(
        "{}/v1beta/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        model
    )
}

fn build_request(request: &CompletionRequest) -> GenerateContentRequest {
    GenerateContentRequest {
        system_instruction: Content::system(&request.system),
        contents: vec![Content::user(&request.prompt)],
        generation_config: GenerationConfig {
            temperature: request.temperature,
            max_output_tokens: request.max_tokens,
        },
    }
}

/// Error text from a failed response body, falling back to the raw body.
fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => match envelope.error.status {
            Some(code) => format!("HTTP {} {}: {}", status, code, envelope.error.message),
            None => format!("HTTP {}: {}", status, envelope.error.message),
        },
        _ => format!("HTTP {}: {}", status, finteam_domain::core::string::truncate(body, 200)),
    }
}

fn extract_text(response: &GenerateContentResponse) -> Result<String, CompletionError> {
    if let Some(text) = response.text() {
        return Ok(text);
    }
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        return Err(CompletionError::InvalidRequest(format!(
            "prompt blocked: {}",
            reason
        )));
    }
    let finish = response
        .candidates
        .first()
        .and_then(|c| c.finish_reason.as_deref())
        .unwrap_or("none");
    Err(CompletionError::Transient(format!(
        "empty response (finish reason: {})",
        finish
    )))
}

#[async_trait]
impl CompletionBackend for GeminiBackend {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let body = build_request(request);
        debug!(
            model = %self.model,
            prompt_len = request.prompt.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| completion_error(kind_for_error(&e), e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| completion_error(kind_for_error(&e), e.to_string()))?;

        if !status.is_success() {
            let code = status.as_u16();
            return Err(completion_error(
                kind_for_status(code),
                error_message(code, &text),
            ));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| CompletionError::Transient(format!("malformed response: {}", e)))?;
        let answer = extract_text(&parsed)?;
        debug!(model = %self.model, response_len = answer.len(), "Completion received");
        Ok(answer)
    }
}

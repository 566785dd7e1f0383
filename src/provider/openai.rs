// src/provider/openai.rs — OpenAI-compatible Chat Completions provider

use async_trait::async_trait;
use std::time::Duration;

use super::{ChatRequest, ChatResponse, ModelProvider, TokenUsage};
use crate::infra::errors::ConvoError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAIProvider {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
}

impl OpenAIProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.into())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Apply a per-request timeout to every call made by this provider.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ConvoError> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConvoError::Provider {
                provider: "openai".into(),
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(self)
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Build the JSON request body. The system prompt, if any, goes first.
pub fn request_body(request: &ChatRequest) -> serde_json::Value {
    let mut msgs = Vec::with_capacity(request.messages.len() + 1);
    if let Some(system) = &request.system {
        msgs.push(serde_json::json!({
            "role": "system",
            "content": system,
        }));
    }
    for m in &request.messages {
        msgs.push(serde_json::json!({
            "role": m.role.as_str(),
            "content": m.content,
        }));
    }

    let mut body = serde_json::json!({
        "model": request.model,
        "messages": msgs,
    });
    if let Some(max_tokens) = request.max_tokens {
        body["max_tokens"] = serde_json::json!(max_tokens);
    }
    body
}

/// Extract reply text and usage from a successful response body.
///
/// Missing usage counters read as zero. A missing `choices[0].message.content`
/// is a malformed response.
pub fn parse_response(resp: &serde_json::Value) -> Result<ChatResponse, ConvoError> {
    let content = resp["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| ConvoError::MalformedResponse {
            provider: "openai".into(),
            message: "missing choices[0].message.content".into(),
        })?
        .to_string();

    let usage = &resp["usage"];
    let cached = usage["cached_tokens"]
        .as_u64()
        .or_else(|| usage["prompt_tokens_details"]["cached_tokens"].as_u64());

    Ok(ChatResponse {
        content,
        usage: TokenUsage {
            input_tokens: token_count(usage["prompt_tokens"].as_u64()),
            output_tokens: token_count(usage["completion_tokens"].as_u64()),
            cached_tokens: token_count(cached),
        },
    })
}

/// Missing counts read as zero; counts past `u32::MAX` clamp instead of wrapping.
fn token_count(raw: Option<u64>) -> u32 {
    raw.map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        .unwrap_or(0)
}

/// The full error payload as the service sent it. JSON bodies are re-emitted
/// compactly so every field (`message`, `type`, `code`, `param`) survives.
fn error_detail(body: &str) -> String {
    if body.trim().is_empty() {
        return "no error body".into();
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(v) => v.to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[async_trait]
impl ModelProvider for OpenAIProvider {
    fn id(&self) -> &str {
        "openai"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ConvoError> {
        let body = request_body(&request);

        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            max_tokens = ?request.max_tokens,
            "POST {}",
            self.endpoint()
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| ConvoError::Provider {
                provider: self.id().into(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ConvoError::Provider {
                provider: self.id().into(),
                message: format!("HTTP {}: {}", status, error_detail(&error_body)),
            });
        }

        let resp: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| ConvoError::MalformedResponse {
                    provider: self.id().into(),
                    message: format!("Failed to parse response: {}", e),
                })?;

        parse_response(&resp)
    }
}

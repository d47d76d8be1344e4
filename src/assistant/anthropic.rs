//! Anthropic Messages API client.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::assistant::client::LlmClient;
use crate::assistant::types::{CompletionRequest, CompletionResponse, Role, StopReason, ToolCall, Usage};
use crate::config::AssistantConfig;
use crate::error::{QaError, Result};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Configuration for the Anthropic client
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
    /// Environment variable holding the API key
    pub api_key_env: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self::from(&AssistantConfig::default())
    }
}

impl From<&AssistantConfig> for AnthropicConfig {
    fn from(config: &AssistantConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            timeout: Duration::from_millis(config.timeout_ms),
            api_key_env: config.api_key_env.clone(),
        }
    }
}

pub struct AnthropicClient {
    client: Client,
    api_key: String,
    config: AnthropicConfig,
    usage: Arc<Mutex<Usage>>,
}

/// Successful Messages API response body
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Default, Deserialize)]
struct ApiUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

fn stop_reason(raw: Option<&str>) -> StopReason {
    match raw {
        Some("tool_use") => StopReason::ToolUse,
        Some("max_tokens") => StopReason::MaxTokens,
        Some("stop_sequence") => StopReason::StopSequence,
        _ => StopReason::EndTurn,
    }
}

/// Map a non-success HTTP status to an assistant error
fn status_error(status: StatusCode, retry_after: Option<u64>, body: &str) -> QaError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        let wait = retry_after.unwrap_or(60);
        return QaError::Assistant(format!("Rate limited by API, retry in {}s", wait));
    }
    QaError::Assistant(format!("API returned {}: {}", status, body))
}

impl AnthropicClient {
    /// Create a client, reading the API key from `config.api_key_env`
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| QaError::Assistant(format!("{} not set", config.api_key_env)))?;

        Self::with_api_key(api_key, config)
    }

    pub fn with_api_key(api_key: String, config: AnthropicConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| QaError::Assistant(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            config,
            usage: Arc::new(Mutex::new(Usage::default())),
        })
    }

    fn build_request(&self, request: &CompletionRequest) -> Value {
        // The API requires the conversation to open with a user turn
        let messages: Vec<Value> = request
            .messages
            .iter()
            .skip_while(|m| m.role == Role::Assistant)
            .map(|m| json!({ "role": wire_role(m.role), "content": m.content }))
            .collect();

        let mut body = json!({
            "model": request.model.as_deref().unwrap_or(&self.config.model),
            "max_tokens": request.max_tokens.unwrap_or(self.config.max_tokens),
            "messages": messages,
        });

        if !request.system.is_empty() {
            body["system"] = Value::String(request.system.clone());
        }
        if !request.tools.is_empty() {
            body["tools"] = request.tools.iter().map(|t| t.to_anthropic_schema()).collect();
        }
        body
    }

    fn parse_response(&self, body: Value) -> Result<CompletionResponse> {
        if body["type"].as_str() == Some("error") {
            let message = body["error"]["message"].as_str().unwrap_or("unknown error");
            return Err(QaError::Assistant(format!("API error: {}", message)));
        }

        let parsed: ApiResponse = serde_json::from_value(body)
            .map_err(|e| QaError::Assistant(format!("Unexpected response shape: {}", e)))?;

        let api_usage = parsed.usage.unwrap_or_default();
        let usage = Usage::new(api_usage.input_tokens, api_usage.output_tokens);
        if let Ok(mut total) = self.usage.lock() {
            total.add(&usage);
        }

        let mut texts = Vec::new();
        let mut tool_calls = Vec::new();
        for block in parsed.content {
            match block {
                ContentBlock::Text { text } => texts.push(text),
                ContentBlock::ToolUse { id, name, input } => tool_calls.push(ToolCall::new(id, name, input)),
                ContentBlock::Other => {}
            }
        }

        Ok(CompletionResponse {
            content: texts.join("\n"),
            tool_calls,
            stop_reason: stop_reason(parsed.stop_reason.as_deref()),
            usage,
        })
    }

    async fn send_request(&self, body: Value) -> Result<Value> {
        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| QaError::Assistant(format!("Request to {} failed: {}", ANTHROPIC_API_URL, e)))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse().ok());
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(status, retry_after, &text));
        }

        response
            .json()
            .await
            .map_err(|e| QaError::Assistant(format!("Response body is not JSON: {}", e)))
    }

    /// Tokens spent by this client so far
    pub fn total_usage(&self) -> Usage {
        self.usage.lock().map(|u| *u).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        log::debug!(
            "Assistant request: model={} messages={}",
            request.model.as_deref().unwrap_or(&self.config.model),
            request.messages.len()
        );
        let body = self.build_request(&request);
        let response = self.send_request(body).await?;
        self.parse_response(response)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("model", &self.config.model)
            .field("api_key_env", &self.config.api_key_env)
            .finish_non_exhaustive()
    }
}

//! Anthropic Strategy
//!
//! Completion strategy for Anthropic's messages API (dialect B).

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::http_client::build_http_client;
use crate::strategy::{CallCancellation, CompletionStrategy};
use crate::types::{CompletionRequest, CompletionResponse, LlmError, LlmResult, Usage};
use crate::wire::anthropic_messages;

/// Default Anthropic API endpoint
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Current API version
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Strategy identifier
pub const ANTHROPIC_STRATEGY_ID: &str = "CLAUDE-3-OPUS";

const ANTHROPIC_MODEL: &str = "claude-3-opus-latest";

const ANTHROPIC_CONTEXT_WINDOW: usize = 200_000;

/// Anthropic strategy
pub struct AnthropicStrategy {
    api_key: String,
    base_url: Option<String>,
    client: reqwest::Client,
    cancellation: CallCancellation,
}

impl AnthropicStrategy {
    /// Create a new Anthropic strategy. Fails fast on an empty API key.
    pub fn new(api_key: impl Into<String>, proxy_url: Option<&str>) -> LlmResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::missing_api_key("anthropic"));
        }
        Ok(Self {
            api_key,
            base_url: None,
            client: build_http_client(proxy_url)?,
            cancellation: CallCancellation::new(),
        })
    }

    /// Override the messages endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(ANTHROPIC_API_URL)
    }

    /// Build the request body for the API
    fn build_request_body(&self, request: &CompletionRequest) -> LlmResult<serde_json::Value> {
        let prepared = anthropic_messages(&request.prompt)?;

        let mut body = serde_json::json!({
            "model": ANTHROPIC_MODEL,
            "messages": prepared.messages.unwrap_or_default(),
            "temperature": request.effective_temperature(),
            "max_tokens": request.effective_max_tokens(),
            "stream": false,
        });
        if let Some(system) = prepared.system {
            body["system"] = serde_json::json!(system);
        }
        Ok(body)
    }

    async fn send(&self, request: &CompletionRequest) -> LlmResult<CompletionResponse> {
        let body = self.build_request_body(request)?;

        let response = self
            .client
            .post(self.base_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Network {
                message: e.to_string(),
            })?;

        let status = response.status();
        let body_text = response.text().await.map_err(|e| LlmError::Network {
            message: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(LlmError::Transport {
                status: status.as_u16(),
                message: body_text,
            });
        }

        let parsed: ClaudeResponse =
            serde_json::from_str(&body_text).map_err(|e| LlmError::Parse {
                message: format!("Failed to parse response: {}", e),
            })?;

        Ok(parsed.into_completion())
    }
}

#[async_trait]
impl CompletionStrategy for AnthropicStrategy {
    fn id(&self) -> String {
        ANTHROPIC_STRATEGY_ID.to_string()
    }

    fn context_window_size(&self) -> usize {
        ANTHROPIC_CONTEXT_WINDOW
    }

    async fn get_completions(&self, request: CompletionRequest) -> LlmResult<CompletionResponse> {
        let token = self.cancellation.begin();
        tokio::select! {
            _ = token.cancelled() => {
                info!(strategy = ANTHROPIC_STRATEGY_ID, "Completion request cancelled");
                Ok(CompletionResponse::cancelled())
            }
            result = self.send(&request) => {
                if let Ok(response) = &result {
                    debug!(strategy = ANTHROPIC_STRATEGY_ID, usage = ?response.usage, "Completion received");
                }
                result
            }
        }
    }

    fn stop_generation(&self) {
        self.cancellation.cancel();
    }
}

/// Claude API response format
#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    #[serde(default)]
    content: Vec<ClaudeContentBlock>,
    usage: Option<ClaudeUsage>,
}

#[derive(Debug, Deserialize)]
struct ClaudeContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClaudeUsage {
    input_tokens: u32,
    output_tokens: u32,
}

impl ClaudeResponse {
    fn into_completion(self) -> CompletionResponse {
        let text = self
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");
        let usage = self.usage.map(|u| Usage {
            input_tokens: u.input_tokens,
            total_tokens: u.output_tokens + u.input_tokens,
        });
        CompletionResponse { text, usage }
    }
}

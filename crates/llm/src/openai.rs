//! OpenAI Strategy
//!
//! Completion strategy for OpenAI's chat completions API (dialect A).
//! One non-streamed call per request, JSON-object response format.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::http_client::build_http_client;
use crate::strategy::{CallCancellation, CompletionStrategy};
use crate::types::{CompletionRequest, CompletionResponse, LlmError, LlmResult, Usage};
use crate::wire::openai_messages;

/// Default OpenAI API endpoint
const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Strategy identifier
pub const OPENAI_STRATEGY_ID: &str = "GPT-4O-MINI";

/// Model requested from the API
const OPENAI_MODEL: &str = "gpt-4o-mini";

/// Context window in chunking units
const OPENAI_CONTEXT_WINDOW: usize = 128_000;

/// OpenAI strategy
pub struct OpenAIStrategy {
    api_key: String,
    base_url: Option<String>,
    client: reqwest::Client,
    cancellation: CallCancellation,
}

impl OpenAIStrategy {
    /// Create a new OpenAI strategy. Fails fast on an empty API key.
    pub fn new(api_key: impl Into<String>, proxy_url: Option<&str>) -> LlmResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::missing_api_key("openai"));
        }
        Ok(Self {
            api_key,
            base_url: None,
            client: build_http_client(proxy_url)?,
            cancellation: CallCancellation::new(),
        })
    }

    /// Override the completions endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Get the API endpoint
    fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(OPENAI_API_URL)
    }

    /// Build the request body for the API
    fn build_request_body(&self, request: &CompletionRequest) -> LlmResult<serde_json::Value> {
        let messages = openai_messages(&request.prompt)?;
        Ok(serde_json::json!({
            "model": OPENAI_MODEL,
            "messages": messages,
            "temperature": request.effective_temperature(),
            "max_tokens": request.effective_max_tokens(),
            "response_format": { "type": "json_object" },
            "stream": false,
        }))
    }

    async fn send(&self, request: &CompletionRequest) -> LlmResult<CompletionResponse> {
        let body = self.build_request_body(request)?;

        let response = self
            .client
            .post(self.base_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("x-api-key", &self.api_key)
            .header("Content-Type", "application/json")
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

        let parsed: OpenAIResponse =
            serde_json::from_str(&body_text).map_err(|e| LlmError::Parse {
                message: format!("Failed to parse response: {}", e),
            })?;

        Ok(parsed.into_completion())
    }
}

#[async_trait]
impl CompletionStrategy for OpenAIStrategy {
    fn id(&self) -> String {
        OPENAI_STRATEGY_ID.to_string()
    }

    fn context_window_size(&self) -> usize {
        OPENAI_CONTEXT_WINDOW
    }

    async fn get_completions(&self, request: CompletionRequest) -> LlmResult<CompletionResponse> {
        let token = self.cancellation.begin();
        tokio::select! {
            _ = token.cancelled() => {
                info!(strategy = OPENAI_STRATEGY_ID, "Completion request cancelled");
                Ok(CompletionResponse::cancelled())
            }
            result = self.send(&request) => {
                if let Ok(response) = &result {
                    debug!(strategy = OPENAI_STRATEGY_ID, usage = ?response.usage, "Completion received");
                }
                result
            }
        }
    }

    fn stop_generation(&self) {
        self.cancellation.cancel();
    }
}

/// OpenAI API response format
#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<ResponseUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseUsage {
    prompt_tokens: u32,
    total_tokens: u32,
}

impl OpenAIResponse {
    fn into_completion(self) -> CompletionResponse {
        let text = self
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default();
        let usage = self.usage.map(|u| Usage {
            input_tokens: u.prompt_tokens,
            total_tokens: u.total_tokens,
        });
        CompletionResponse { text, usage }
    }
}

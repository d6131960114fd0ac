//! Local Engine Strategy
//!
//! Completion strategy backed by a local Ollama server, using the ollama-rs
//! native SDK. The model must be loaded with `init_model` before the first
//! completion. Generation is always streamed internally so the final chunk's
//! token accounting can be captured, then concatenated before returning.

use std::sync::RwLock;

use async_trait::async_trait;
use ollama_rs::generation::chat::request::ChatMessageRequest;
use ollama_rs::generation::chat::ChatMessage;
use ollama_rs::generation::parameters::FormatType;
use ollama_rs::models::ModelOptions;
use ollama_rs::Ollama;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};
use undoctrinator_core::format_bytes;

use crate::http_client::build_http_client;
use crate::strategy::{CallCancellation, CompletionStrategy};
use crate::types::{
    CompletionRequest, CompletionResponse, LlmError, LlmResult, ModelKind, ProgressCallback, Usage,
};

/// Default Ollama API endpoint
pub const OLLAMA_DEFAULT_URL: &str = "http://localhost:11434";

/// Context window of the local models, in chunking units
const LOCAL_CONTEXT_WINDOW: usize = 4096;

/// Local inference strategy
pub struct LocalEngineStrategy {
    client: Ollama,
    base_url: String,
    model: RwLock<Option<String>>,
    cancellation: CallCancellation,
}

impl LocalEngineStrategy {
    /// Create a strategy talking to the Ollama server at `base_url`
    /// (default `http://localhost:11434`). No model is loaded yet.
    pub fn new(base_url: Option<&str>, proxy_url: Option<&str>) -> LlmResult<Self> {
        let base_url = base_url.unwrap_or(OLLAMA_DEFAULT_URL).to_string();
        let client = Self::create_client(&base_url, proxy_url)?;
        Ok(Self {
            client,
            base_url,
            model: RwLock::new(None),
            cancellation: CallCancellation::new(),
        })
    }

    /// Create an Ollama SDK client from a base URL string.
    ///
    /// `Ollama::new()` takes host and port separately.
    fn create_client(base_url: &str, proxy_url: Option<&str>) -> LlmResult<Ollama> {
        let parsed = url::Url::parse(base_url).map_err(|e| LlmError::Configuration {
            message: format!("Invalid Ollama URL '{}': {}", base_url, e),
        })?;
        let host = parsed.host_str().unwrap_or("localhost");
        let port = parsed.port().unwrap_or(11434);
        let host_url = format!("{}://{}", parsed.scheme(), host);

        if proxy_url.is_some() {
            let http_client = build_http_client(proxy_url)?;
            Ok(Ollama::new_with_client(host_url, port, http_client))
        } else {
            Ok(Ollama::new(host_url, port))
        }
    }

    /// Resolve a configured model name to the concrete weights tag.
    pub fn resolve_model(name: &str) -> LlmResult<&'static str> {
        let kind: ModelKind = name.parse()?;
        kind.local_model_tag().ok_or_else(|| LlmError::Configuration {
            message: format!("{} is not a local model", kind),
        })
    }

    /// Currently loaded weights tag, if any.
    pub fn loaded_model(&self) -> Option<String> {
        self.model.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Load `name` on the local engine, reporting fractional progress.
    ///
    /// Weights are pulled through the server (a no-op download when they are
    /// already present). Requests carry no conversation history, so loading
    /// always starts from a clean session.
    pub async fn init_model(&self, name: &str, progress: ProgressCallback) -> LlmResult<()> {
        let tag = Self::resolve_model(name)?;
        info!(model = tag, url = %self.base_url, "Loading local model");
        progress(0.0);

        let mut stream = self
            .client
            .pull_model_stream(tag.to_string(), false)
            .await
            .map_err(|e| self.map_sdk_error(e.to_string(), tag))?;

        while let Some(item) = stream.next().await {
            match item {
                Ok(status) => {
                    if let (Some(total), Some(completed)) = (status.total, status.completed) {
                        if total > 0 {
                            progress((completed as f64 / total as f64).min(1.0));
                            debug!(
                                model = tag,
                                "Pulled {} of {}",
                                format_bytes(completed, 1),
                                format_bytes(total, 1)
                            );
                        }
                    }
                    debug!(model = tag, status = %status.message, "Pull progress");
                }
                Err(e) => {
                    return Err(self.map_sdk_error(format!("{:?}", e), tag));
                }
            }
        }

        *self.model.write().unwrap_or_else(|e| e.into_inner()) = Some(tag.to_string());
        progress(1.0);
        info!(model = tag, "Local model ready");
        Ok(())
    }

    fn map_sdk_error(&self, msg: String, model: &str) -> LlmError {
        if msg.contains("connect") || msg.contains("Connection refused") {
            LlmError::ProviderUnavailable {
                message: format!("Cannot connect to Ollama at {}: {}", self.base_url, msg),
            }
        } else if msg.contains("not found") || msg.contains("404") {
            LlmError::ModelNotFound {
                model: model.to_string(),
            }
        } else {
            LlmError::Network { message: msg }
        }
    }

    /// Build a ChatMessageRequest asking for JSON output
    fn build_chat_request(
        &self,
        model: &str,
        request: &CompletionRequest,
    ) -> LlmResult<ChatMessageRequest> {
        if request.prompt.is_empty() {
            return Err(LlmError::Configuration {
                message: "Prompt must have a system or user message".to_string(),
            });
        }

        let mut messages = Vec::with_capacity(2);
        if !request.prompt.system.is_empty() {
            messages.push(ChatMessage::system(request.prompt.system.clone()));
        }
        if !request.prompt.user.is_empty() {
            messages.push(ChatMessage::user(request.prompt.user.clone()));
        }

        let options = ModelOptions::default()
            .temperature(request.effective_temperature())
            .num_predict(request.effective_max_tokens() as i32);

        Ok(ChatMessageRequest::new(model.to_string(), messages)
            .options(options)
            .format(FormatType::Json))
    }
}

#[async_trait]
impl CompletionStrategy for LocalEngineStrategy {
    fn id(&self) -> String {
        self.loaded_model().unwrap_or_default()
    }

    fn context_window_size(&self) -> usize {
        LOCAL_CONTEXT_WINDOW
    }

    async fn get_completions(&self, request: CompletionRequest) -> LlmResult<CompletionResponse> {
        let model = self.loaded_model().ok_or_else(|| LlmError::Precondition {
            message: "Local model is not loaded; call init_model first".to_string(),
        })?;
        let chat_request = self.build_chat_request(&model, &request)?;
        let token = self.cancellation.begin();

        let mut stream = tokio::select! {
            _ = token.cancelled() => {
                info!(model = %model, "Generation interrupted before start");
                return Ok(CompletionResponse::default());
            }
            result = self.client.send_chat_messages_stream(chat_request) => {
                result.map_err(|e| self.map_sdk_error(e.to_string(), &model))?
            }
        };

        let mut text = String::new();
        let mut usage = None;

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    info!(model = %model, chars = text.len(), "Generation interrupted");
                    break;
                }
                next = stream.next() => match next {
                    Some(Ok(response)) => {
                        text.push_str(&response.message.content);
                        if response.done {
                            if let Some(final_data) = &response.final_data {
                                let input = final_data.prompt_eval_count as u32;
                                let output = final_data.eval_count as u32;
                                usage = Some(Usage {
                                    input_tokens: input,
                                    total_tokens: input.saturating_add(output),
                                });
                            }
                        }
                    }
                    Some(Err(_)) => {
                        warn!(model = %model, "Stream error from Ollama");
                        return Err(LlmError::Network {
                            message: format!("Stream error from Ollama at {}", self.base_url),
                        });
                    }
                    None => break,
                }
            }
        }

        debug!(model = %model, usage = ?usage, "Local completion finished");
        Ok(CompletionResponse { text, usage })
    }

    fn stop_generation(&self) {
        self.cancellation.cancel();
    }
}

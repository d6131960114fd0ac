//! Completion Types
//!
//! Request/response types shared by every completion strategy, the model
//! catalogue, and the `LlmError` taxonomy.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Default sampling temperature merged in by the model controller.
pub const DEFAULT_TEMPERATURE: f32 = 0.99;

/// Default max token count merged in by the model controller.
pub const DEFAULT_MAX_TOKENS: u32 = 4000;

/// Callback receiving fractional load progress in `[0, 1]`.
pub type ProgressCallback = Arc<dyn Fn(f64) + Send + Sync>;

/// Backend identifiers accepted in configuration.
///
/// The `WEBLLM_*` spellings from older settings files are accepted as aliases
/// of the matching local models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    #[serde(rename = "LOCAL_LLAMA", alias = "WEBLLM_LLAMA")]
    LocalLlama,
    #[serde(rename = "LOCAL_MISTRAL", alias = "WEBLLM_MISTRAL")]
    LocalMistral,
    #[serde(rename = "LOCAL_QWEN", alias = "WEBLLM_QWEN")]
    LocalQwen,
    #[serde(rename = "LOCAL_DEEPSEEK_LLAMA", alias = "WEBLLM_DEEPSEEK_LLAMA")]
    LocalDeepseekLlama,
    #[serde(rename = "OPENAI")]
    OpenAi,
    #[serde(rename = "ANTHROPIC")]
    Anthropic,
}

impl ModelKind {
    pub const ALL: [ModelKind; 6] = [
        ModelKind::LocalLlama,
        ModelKind::LocalMistral,
        ModelKind::LocalQwen,
        ModelKind::LocalDeepseekLlama,
        ModelKind::OpenAi,
        ModelKind::Anthropic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::LocalLlama => "LOCAL_LLAMA",
            ModelKind::LocalMistral => "LOCAL_MISTRAL",
            ModelKind::LocalQwen => "LOCAL_QWEN",
            ModelKind::LocalDeepseekLlama => "LOCAL_DEEPSEEK_LLAMA",
            ModelKind::OpenAi => "OPENAI",
            ModelKind::Anthropic => "ANTHROPIC",
        }
    }

    /// Whether this kind runs on the local inference engine.
    pub fn is_local(&self) -> bool {
        self.local_model_tag().is_some()
    }

    /// Concrete weights tag on the local engine, `None` for remote kinds.
    pub fn local_model_tag(&self) -> Option<&'static str> {
        match self {
            ModelKind::LocalLlama => Some("llama3.2:3b"),
            ModelKind::LocalMistral => Some("mistral:7b"),
            ModelKind::LocalQwen => Some("qwen2.5:1.5b"),
            ModelKind::LocalDeepseekLlama => Some("deepseek-r1:8b"),
            ModelKind::OpenAi | ModelKind::Anthropic => None,
        }
    }
}

impl Default for ModelKind {
    fn default() -> Self {
        ModelKind::LocalQwen
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        let normalized = normalized
            .strip_prefix("WEBLLM_")
            .map(|rest| format!("LOCAL_{}", rest))
            .unwrap_or(normalized);

        ModelKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| LlmError::Configuration {
                message: format!("Unknown model: {}", s),
            })
    }
}

/// System/user instruction pair for one chunk of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.system.is_empty() && self.user.is_empty()
    }
}

/// A single completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub prompt: Prompt,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(prompt: Prompt) -> Self {
        Self {
            prompt,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Fill unset generation parameters with the defaults.
    pub fn with_defaults(self) -> Self {
        Self {
            temperature: Some(self.temperature.unwrap_or(DEFAULT_TEMPERATURE)),
            max_tokens: Some(self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)),
            ..self
        }
    }

    pub fn effective_temperature(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn effective_max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }
}

/// Token accounting normalized across backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    pub input_tokens: u32,
    pub total_tokens: u32,
}

/// Generated text plus optional token accounting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub text: String,
    pub usage: Option<Usage>,
}

impl CompletionResponse {
    /// The value a deliberately cancelled remote call resolves to.
    pub fn cancelled() -> Self {
        Self {
            text: String::new(),
            usage: Some(Usage::default()),
        }
    }
}

/// Error types for completion operations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LlmError {
    /// Missing API key, unknown model identifier
    Configuration { message: String },
    /// Operation invoked before required setup (model not loaded)
    Precondition { message: String },
    /// Non-2xx response; `message` is the raw response body
    Transport { status: u16, message: String },
    /// Network/connection error
    Network { message: String },
    /// Response parsing error
    Parse { message: String },
    /// Local inference server not reachable
    ProviderUnavailable { message: String },
    /// Model not found on the backend
    ModelNotFound { model: String },
}

impl LlmError {
    /// Stable error name surfaced in the error state.
    pub fn name(&self) -> &'static str {
        match self {
            LlmError::Configuration { .. } => "ConfigurationError",
            LlmError::Precondition { .. } => "PreconditionError",
            LlmError::Transport { .. } => "TransportError",
            LlmError::Network { .. } => "NetworkError",
            LlmError::Parse { .. } => "ParseError",
            LlmError::ProviderUnavailable { .. } => "ProviderUnavailableError",
            LlmError::ModelNotFound { .. } => "ModelNotFoundError",
        }
    }

    /// Helper for a missing API key
    pub fn missing_api_key(provider: &str) -> Self {
        LlmError::Configuration {
            message: format!("API key not configured for {}", provider),
        }
    }
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmError::Configuration { message } => {
                write!(f, "Configuration error: {}", message)
            }
            LlmError::Precondition { message } => {
                write!(f, "Precondition failed: {}", message)
            }
            // the raw body is the message
            LlmError::Transport { message, .. } => write!(f, "{}", message),
            LlmError::Network { message } => {
                write!(f, "Network error: {}", message)
            }
            LlmError::Parse { message } => {
                write!(f, "Parse error: {}", message)
            }
            LlmError::ProviderUnavailable { message } => {
                write!(f, "Provider unavailable: {}", message)
            }
            LlmError::ModelNotFound { model } => {
                write!(f, "Model not found: {}", model)
            }
        }
    }
}

impl std::error::Error for LlmError {}

/// Result type for completion operations
pub type LlmResult<T> = Result<T, LlmError>;

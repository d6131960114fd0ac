//! Settings Models
//!
//! Application configuration and settings data structures.

use serde::{Deserialize, Serialize};
use undoctrinator_llm::ModelKind;

/// Application configuration stored in config.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Backend identifier (`LOCAL_QWEN`, `OPENAI`, ...). Empty means default.
    #[serde(default = "default_model_to_use")]
    pub model_to_use: String,
    /// API key for the OpenAI backend
    #[serde(default)]
    pub open_ai_api_key: String,
    /// API key for the Anthropic backend
    #[serde(default)]
    pub anthropic_api_key: String,
    /// Local engine URL, defaults to http://localhost:11434
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ollama_url: Option<String>,
    /// Proxy for all backend traffic (http, https or socks5)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,
}

fn default_model_to_use() -> String {
    ModelKind::default().as_str().to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_to_use: default_model_to_use(),
            open_ai_api_key: String::new(),
            anthropic_api_key: String::new(),
            ollama_url: None,
            proxy_url: None,
        }
    }
}

/// Settings update request (partial update)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub model_to_use: Option<String>,
    pub open_ai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    /// Empty string clears the override
    pub ollama_url: Option<String>,
    /// Empty string clears the override
    pub proxy_url: Option<String>,
}

impl AppConfig {
    /// Resolve the configured backend.
    ///
    /// Empty selects the default local model; an unrecognized identifier
    /// yields `None`.
    pub fn model_kind(&self) -> Option<ModelKind> {
        if self.model_to_use.trim().is_empty() {
            return Some(ModelKind::default());
        }
        self.model_to_use.parse().ok()
    }

    /// Apply a partial update to the configuration
    pub fn apply_update(&mut self, update: SettingsUpdate) {
        if let Some(model) = update.model_to_use {
            self.model_to_use = model;
        }
        if let Some(key) = update.open_ai_api_key {
            self.open_ai_api_key = key;
        }
        if let Some(key) = update.anthropic_api_key {
            self.anthropic_api_key = key;
        }
        if let Some(url) = update.ollama_url {
            self.ollama_url = (!url.is_empty()).then_some(url);
        }
        if let Some(url) = update.proxy_url {
            self.proxy_url = (!url.is_empty()).then_some(url);
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if let Some(url) = &self.ollama_url {
            url::Url::parse(url).map_err(|e| format!("Invalid ollamaUrl '{}': {}", url, e))?;
        }

        if let Some(url) = &self.proxy_url {
            let parsed =
                url::Url::parse(url).map_err(|e| format!("Invalid proxyUrl '{}': {}", url, e))?;
            if !["http", "https", "socks5"].contains(&parsed.scheme()) {
                return Err(format!(
                    "Invalid proxyUrl scheme: {}. Must be 'http', 'https' or 'socks5'",
                    parsed.scheme()
                ));
            }
        }

        Ok(())
    }

    /// Copy with API keys masked, for display.
    pub fn redacted(&self) -> Self {
        Self {
            open_ai_api_key: mask_key(&self.open_ai_api_key),
            anthropic_api_key: mask_key(&self.anthropic_api_key),
            ..self.clone()
        }
    }
}

fn mask_key(key: &str) -> String {
    if key.is_empty() {
        return String::new();
    }
    let tail: String = key
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("****{}", tail)
}

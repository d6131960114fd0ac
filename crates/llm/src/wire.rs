//! Wire Message Shapes
//!
//! Serializes a `Prompt` into the message shape each remote dialect expects.
//!
//! - Dialect A (OpenAI-like): flat `[{role, content}]`, system first.
//! - Dialect B (Anthropic): top-level `system`, user text nested as content
//!   blocks under `messages`.

use serde::{Deserialize, Serialize};

use crate::types::{LlmError, LlmResult, Prompt};

/// Remote wire dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    OpenAiLike,
    Anthropic,
}

/// Dialect A message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMessage {
    pub role: String,
    pub content: String,
}

/// Dialect B content block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
}

/// Dialect B message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockMessage {
    pub role: String,
    pub content: Vec<ContentBlock>,
}

/// Dialect B `system` + `messages` pair.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnthropicMessages {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<BlockMessage>>,
}

fn ensure_not_empty(prompt: &Prompt) -> LlmResult<()> {
    if prompt.is_empty() {
        return Err(LlmError::Configuration {
            message: "Prompt must have a system or user message".to_string(),
        });
    }
    Ok(())
}

/// Dialect A: `[{role:"system"}, {role:"user"}]`, empty parts omitted.
pub fn openai_messages(prompt: &Prompt) -> LlmResult<Vec<RoleMessage>> {
    ensure_not_empty(prompt)?;

    let mut messages = Vec::with_capacity(2);
    if !prompt.system.is_empty() {
        messages.push(RoleMessage {
            role: "system".to_string(),
            content: prompt.system.clone(),
        });
    }
    if !prompt.user.is_empty() {
        messages.push(RoleMessage {
            role: "user".to_string(),
            content: prompt.user.clone(),
        });
    }
    Ok(messages)
}

/// Dialect B: system as a top-level field, user as content blocks.
pub fn anthropic_messages(prompt: &Prompt) -> LlmResult<AnthropicMessages> {
    ensure_not_empty(prompt)?;

    let system = (!prompt.system.is_empty()).then(|| prompt.system.clone());
    let messages = (!prompt.user.is_empty()).then(|| {
        vec![BlockMessage {
            role: "user".to_string(),
            content: vec![ContentBlock::Text {
                text: prompt.user.clone(),
            }],
        }]
    });

    Ok(AnthropicMessages { system, messages })
}

/// Serialize the prompt for `dialect` as a JSON value.
pub fn prepare_messages(prompt: &Prompt, dialect: Dialect) -> LlmResult<serde_json::Value> {
    let value = match dialect {
        Dialect::OpenAiLike => serde_json::to_value(openai_messages(prompt)?),
        Dialect::Anthropic => serde_json::to_value(anthropic_messages(prompt)?),
    };
    value.map_err(|e| LlmError::Parse {
        message: e.to_string(),
    })
}

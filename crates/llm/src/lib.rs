//! Undoctrinator LLM
//!
//! A single completion contract over interchangeable backends:
//! - Local engine (Ollama server, models pulled on demand)
//! - OpenAI chat completions (dialect A)
//! - Anthropic messages (dialect B)
//!
//! Also includes the wire-shape serializers for both remote dialects and the
//! HTTP client factory.

pub mod anthropic;
pub mod http_client;
pub mod local;
pub mod openai;
pub mod strategy;
pub mod types;
pub mod wire;

// Re-export main types
pub use anthropic::AnthropicStrategy;
pub use http_client::build_http_client;
pub use local::LocalEngineStrategy;
pub use openai::OpenAIStrategy;
pub use strategy::{CallCancellation, CompletionStrategy};
pub use types::*;
pub use wire::{prepare_messages, Dialect};

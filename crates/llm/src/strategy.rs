//! Completion Strategy Trait
//!
//! Defines the contract every completion backend implements.

use std::sync::Mutex;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::types::{CompletionRequest, CompletionResponse, LlmResult};

/// Trait that all completion backends must implement.
///
/// Callers see a non-streaming contract: one request in, one
/// `CompletionResponse` out. Cancellation is cooperative through
/// `stop_generation`.
#[async_trait]
pub trait CompletionStrategy: Send + Sync {
    /// Stable backend/model identifier.
    fn id(&self) -> String;

    /// Maximum input the backend accepts, in the approximate units used by
    /// chunking.
    fn context_window_size(&self) -> usize;

    /// Generate a completion for one request.
    async fn get_completions(&self, request: CompletionRequest) -> LlmResult<CompletionResponse>;

    /// Best-effort cancellation of the in-flight or most recently issued
    /// generation. Idempotent.
    fn stop_generation(&self);
}

/// Holder for the cancellation token of the most recent call.
///
/// Each call gets a fresh token; `cancel` aborts whichever one is current.
#[derive(Debug, Default)]
pub struct CallCancellation {
    current: Mutex<CancellationToken>,
}

impl CallCancellation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a fresh token for a new call and return a handle to it.
    pub fn begin(&self) -> CancellationToken {
        let token = CancellationToken::new();
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = token.clone();
        token
    }

    /// Cancel the current call's token.
    pub fn cancel(&self) {
        let current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        current.cancel();
    }
}

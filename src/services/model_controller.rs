//! Model Controller
//!
//! Holds the active completion strategy and exposes a backend-agnostic
//! contract to the rest of the application. Every operation other than
//! `initialize` fails with a precondition error while no strategy is set.

use std::sync::{Arc, RwLock};

use tracing::{info, warn};
use undoctrinator_llm::{
    AnthropicStrategy, CompletionRequest, CompletionResponse, CompletionStrategy,
    LocalEngineStrategy, ModelKind, OpenAIStrategy, ProgressCallback,
};

use crate::models::settings::AppConfig;
use crate::utils::error::{AppError, AppResult};

/// Pick the backend named by the configuration.
///
/// Missing or empty selects the default local model; an unrecognized
/// identifier selects nothing.
pub fn select_backend(config: &AppConfig) -> Option<ModelKind> {
    config.model_kind()
}

/// Owner of the single active completion strategy.
///
/// The strategy is replaced wholesale, never mutated in place; the lock is
/// only held long enough to clone the `Arc`.
#[derive(Default)]
pub struct ModelController {
    strategy: RwLock<Option<Arc<dyn CompletionStrategy>>>,
}

impl ModelController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Controller with a ready strategy.
    pub fn with_strategy(strategy: Arc<dyn CompletionStrategy>) -> Self {
        Self {
            strategy: RwLock::new(Some(strategy)),
        }
    }

    /// Replace the active strategy. Only call between analysis runs.
    pub fn set_strategy(&self, strategy: Option<Arc<dyn CompletionStrategy>>) {
        *self.strategy.write().unwrap_or_else(|e| e.into_inner()) = strategy;
    }

    pub fn has_strategy(&self) -> bool {
        self.strategy
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    fn active(&self) -> AppResult<Arc<dyn CompletionStrategy>> {
        self.strategy
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or_else(|| {
                AppError::precondition("No model strategy is set; initialize the model first")
            })
    }

    /// Instantiate (and for local models, load) the configured backend.
    pub async fn initialize(&self, config: &AppConfig, progress: ProgressCallback) -> AppResult<()> {
        let Some(kind) = select_backend(config) else {
            warn!(model = %config.model_to_use, "Unrecognized model; no strategy set");
            return Ok(());
        };

        let proxy = config.proxy_url.as_deref();
        let strategy: Arc<dyn CompletionStrategy> = match kind {
            ModelKind::LocalLlama
            | ModelKind::LocalMistral
            | ModelKind::LocalQwen
            | ModelKind::LocalDeepseekLlama => {
                let local = LocalEngineStrategy::new(config.ollama_url.as_deref(), proxy)?;
                local.init_model(kind.as_str(), progress).await?;
                Arc::new(local)
            }
            ModelKind::OpenAi => Arc::new(OpenAIStrategy::new(
                config.open_ai_api_key.clone(),
                proxy,
            )?),
            ModelKind::Anthropic => Arc::new(AnthropicStrategy::new(
                config.anthropic_api_key.clone(),
                proxy,
            )?),
        };

        info!(model = %kind, id = %strategy.id(), "Model strategy initialized");
        self.set_strategy(Some(strategy));
        Ok(())
    }

    pub fn context_window_size(&self) -> AppResult<usize> {
        Ok(self.active()?.context_window_size())
    }

    pub fn model_id(&self) -> AppResult<String> {
        Ok(self.active()?.id())
    }

    /// Merge default generation parameters and delegate to the strategy.
    pub async fn get_completions(&self, request: CompletionRequest) -> AppResult<CompletionResponse> {
        let strategy = self.active()?;
        strategy
            .get_completions(request.with_defaults())
            .await
            .map_err(|source| AppError::Completion { source })
    }

    pub fn stop_generation(&self) -> AppResult<()> {
        self.active()?.stop_generation();
        Ok(())
    }
}

//! Application State Machine
//!
//! Gates which workflow phase is active. A transition is checked against the
//! phase table and its required parameters, then the renderer runs as the
//! transition handler; the new phase is committed only if the handler
//! succeeds.
//!
//! Transitions are serialized through `StateMachineHandle`, which owns the
//! machine behind an async mutex.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::models::phase::{AppPhase, TransitionParams};
use crate::services::render::Renderer;
use crate::utils::error::{AppError, AppResult};

/// Finite state machine over `AppPhase`.
pub struct StateMachine {
    current: AppPhase,
    history: Vec<AppPhase>,
    renderer: Arc<dyn Renderer>,
}

impl StateMachine {
    /// Create a machine in the `idle` phase.
    pub fn new(renderer: Arc<dyn Renderer>) -> Self {
        Self {
            current: AppPhase::Idle,
            history: Vec::new(),
            renderer,
        }
    }

    pub fn current(&self) -> AppPhase {
        self.current
    }

    /// Previously committed phases, oldest first.
    pub fn history(&self) -> &[AppPhase] {
        &self.history
    }

    /// Check the parameters a target phase requires.
    pub fn validate_params(to: AppPhase, params: &TransitionParams) -> AppResult<()> {
        match to {
            AppPhase::Analysis => {
                let has_progress =
                    params.count_of_chunks.is_some() && params.current_chunk.is_some();
                if !params.is_initial() && !has_progress {
                    return Err(AppError::state_transition(
                        "analysis requires either 'initial' or both 'countOfChunks' and 'currentChunk'",
                    ));
                }
            }
            AppPhase::Result => {
                if params.data.is_none() {
                    return Err(AppError::state_transition("result requires report data"));
                }
            }
            AppPhase::Error => {
                if params.error.is_none() {
                    return Err(AppError::state_transition(
                        "error requires 'name' and 'message'",
                    ));
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Move to `to`, running the renderer before committing.
    pub async fn transition(&mut self, to: AppPhase, params: TransitionParams) -> AppResult<()> {
        if !self.current.can_transition_to(to) {
            return Err(AppError::InvalidTransition {
                from: self.current,
                to,
            });
        }
        Self::validate_params(to, &params)?;

        self.renderer.render(to, &params).await?;

        debug!(from = %self.current, to = %to, "Phase transition");
        self.history.push(self.current);
        self.current = to;
        Ok(())
    }
}

/// Shared, serialized access to the state machine.
#[derive(Clone)]
pub struct StateMachineHandle {
    inner: Arc<Mutex<StateMachine>>,
}

impl StateMachineHandle {
    pub fn new(renderer: Arc<dyn Renderer>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StateMachine::new(renderer))),
        }
    }

    pub async fn transition(&self, to: AppPhase, params: TransitionParams) -> AppResult<()> {
        self.inner.lock().await.transition(to, params).await
    }

    pub async fn current(&self) -> AppPhase {
        self.inner.lock().await.current()
    }

    pub async fn history(&self) -> Vec<AppPhase> {
        self.inner.lock().await.history().to_vec()
    }

    /// Transition to `idle`. Used by cancellation.
    pub async fn force_idle(&self) -> AppResult<()> {
        self.transition(AppPhase::Idle, TransitionParams::none())
            .await
    }

    /// Report per-chunk progress, atomically with the check that the run is
    /// still live.
    ///
    /// Returns `Ok(false)` without transitioning when the machine has left
    /// `analysis` (the run was cancelled).
    pub async fn advance_analysis(
        &self,
        current_chunk: usize,
        count_of_chunks: usize,
    ) -> AppResult<bool> {
        let mut machine = self.inner.lock().await;
        if machine.current() != AppPhase::Analysis {
            return Ok(false);
        }
        machine
            .transition(
                AppPhase::Analysis,
                TransitionParams::chunk(current_chunk, count_of_chunks),
            )
            .await?;
        Ok(true)
    }
}

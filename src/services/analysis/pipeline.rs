//! Analysis Pipeline
//!
//! Splits content into context-window sized chunks and drives one
//! completion per chunk, strictly in order. A chunk that fails, comes back
//! too short, or does not parse contributes nothing; the run carries on with
//! the next one.

use std::sync::Arc;

use tracing::{debug, info, warn};
use undoctrinator_core::{chunk_string, extract_json_value, FindingSet};
use undoctrinator_llm::CompletionRequest;

use super::progress::ProgressState;
use super::prompt::craft_instructions;
use crate::models::phase::AppPhase;
use crate::services::model_controller::ModelController;
use crate::services::render::Renderer;
use crate::services::state_machine::StateMachineHandle;
use crate::utils::error::{AppError, AppResult};

/// Approximate characters per token.
pub const TOKEN_TO_CHAR_RATIO: f64 = 3.6;

/// Responses estimated below this many tokens are treated as truncated.
pub const MINIMAL_RESPONSE_SIZE_IN_TOKENS: f64 = 1600.0;

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// Every chunk was attempted; holds the finding sets that parsed.
    Completed(Vec<FindingSet>),
    /// The state machine left `analysis` mid-run.
    Cancelled,
}

/// Chunk size for a backend's context window.
pub fn chunk_size_for(context_window: usize) -> AppResult<usize> {
    let size = (context_window as f64 - TOKEN_TO_CHAR_RATIO).floor();
    if size < 1.0 {
        return Err(AppError::validation(format!(
            "Context window {} is too small to hold a chunk",
            context_window
        )));
    }
    Ok(size as usize)
}

/// Whether a response is long enough to hold a complete answer.
pub fn is_viable_response(text: &str) -> bool {
    text.chars().count() as f64 * TOKEN_TO_CHAR_RATIO >= MINIMAL_RESPONSE_SIZE_IN_TOKENS
}

/// Request and parse the finding set for one chunk.
///
/// Never fails: errors and unusable responses yield `None`.
pub async fn process_chunk(chunk: &str, controller: &ModelController) -> Option<FindingSet> {
    let prompt = match craft_instructions(chunk) {
        Ok(prompt) => prompt,
        Err(e) => {
            warn!(error = %e, "Skipping chunk");
            return None;
        }
    };

    let response = match controller.get_completions(CompletionRequest::new(prompt)).await {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e.user_message(), chunk_chars = chunk.chars().count(), "Error processing chunk");
            return None;
        }
    };

    if let Some(usage) = &response.usage {
        debug!(
            input_tokens = usage.input_tokens,
            total_tokens = usage.total_tokens,
            "Chunk completed"
        );
    }

    if response.text.is_empty() || !is_viable_response(&response.text) {
        debug!(
            response_chars = response.text.chars().count(),
            "Discarding short response"
        );
        return None;
    }

    let value = match extract_json_value(&response.text) {
        Some(value) => value,
        None => {
            debug!("Discarding response without a JSON object");
            return None;
        }
    };

    match FindingSet::from_value(value) {
        Ok(findings) => Some(findings),
        Err(e) => {
            debug!(error = %e, "Discarding response with invalid finding set");
            None
        }
    }
}

/// Run the pipeline over `content`.
///
/// The state machine must already be in `analysis`. Each chunk is announced
/// through it before the request is issued; if the machine has left
/// `analysis` (cancellation), the run stops and reports `Cancelled`.
pub async fn extract_metrics(
    content: &str,
    controller: &ModelController,
    state: &StateMachineHandle,
    renderer: Arc<dyn Renderer>,
) -> AppResult<PipelineOutcome> {
    let chunk_size = chunk_size_for(controller.context_window_size()?)?;
    let chunks = chunk_string(content, chunk_size)?;
    if chunks.is_empty() {
        return Ok(PipelineOutcome::Completed(Vec::new()));
    }

    let count = chunks.len();
    info!(chunks = count, chunk_size, "Starting analysis");

    let mut progress = ProgressState::start(count, renderer);
    let mut results = Vec::with_capacity(count);

    for (index, chunk) in chunks.iter().enumerate() {
        if !state.advance_analysis(index + 1, count).await? {
            progress.finish();
            return Ok(PipelineOutcome::Cancelled);
        }

        let findings = process_chunk(chunk, controller).await;

        if state.current().await != AppPhase::Analysis {
            progress.finish();
            return Ok(PipelineOutcome::Cancelled);
        }

        if let Some(findings) = findings {
            results.push(findings);
            progress = progress.advance();
        }
    }

    progress.finish();
    info!(parsed = results.len(), chunks = count, "Analysis finished");
    Ok(PipelineOutcome::Completed(results))
}

//! Analysis
//!
//! Prompt construction, chunked extraction and progress reporting for one
//! analysis run.

pub mod pipeline;
pub mod progress;
pub mod prompt;

pub use pipeline::{
    chunk_size_for, extract_metrics, is_viable_response, process_chunk, PipelineOutcome,
    MINIMAL_RESPONSE_SIZE_IN_TOKENS, TOKEN_TO_CHAR_RATIO,
};
pub use progress::ProgressState;
pub use prompt::craft_instructions;

//! Error Handling
//!
//! Unified error types for the application.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;
use undoctrinator_core::CoreError;
use undoctrinator_llm::LlmError;

use crate::models::phase::{AppPhase, ErrorInfo};

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors (missing key, unknown model, unreadable settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation invoked before required setup
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Edge missing from the phase transition table
    #[error("Invalid transition from '{from}' to '{to}'")]
    InvalidTransition { from: AppPhase, to: AppPhase },

    /// Transition attempted without its required parameters
    #[error("State transition error: {0}")]
    StateTransition(String),

    /// A strategy failed while generating; the original error is the source
    #[error("Failed to get completions")]
    Completion { source: LlmError },

    /// Backend errors outside of generation (loading, construction)
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// Bounded waits that ran out
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Content retrieval/extraction errors
    #[error("Content error: {0}")]
    Content(String),

    /// Rendering handler errors
    #[error("Render error: {0}")]
    Render(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a precondition error
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Create a state transition error
    pub fn state_transition(msg: impl Into<String>) -> Self {
        Self::StateTransition(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a content error
    pub fn content(msg: impl Into<String>) -> Self {
        Self::Content(msg.into())
    }

    /// Create a render error
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable error name shown in the error phase.
    pub fn name(&self) -> &'static str {
        match self {
            AppError::Config(_) => "ConfigurationError",
            AppError::Precondition(_) => "PreconditionError",
            AppError::InvalidTransition { .. } => "InvalidTransitionError",
            AppError::StateTransition(_) => "StateTransitionError",
            AppError::Completion { .. } => "CompletionError",
            AppError::Llm(e) => e.name(),
            AppError::Timeout(_) => "TimeoutError",
            AppError::Validation(_) => "ValidationError",
            AppError::Content(_) => "ContentError",
            AppError::Render(_) => "RenderError",
            AppError::Io(_) => "IoError",
            AppError::Serialization(_) => "SerializationError",
            AppError::Internal(_) => "InternalError",
        }
    }

    /// User-facing message; wrapped completion errors include their cause.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Completion { source } => format!("{}: {}", self, source),
            other => other.to_string(),
        }
    }

    /// `{name, message}` pair carried into the error phase.
    pub fn to_error_info(&self) -> ErrorInfo {
        ErrorInfo::new(self.name(), self.user_message())
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Config(msg) => AppError::Config(msg),
            CoreError::Serialization(e) => AppError::Serialization(e),
            CoreError::Validation(msg) => AppError::Validation(msg),
            CoreError::Parse(msg) => AppError::Validation(msg),
        }
    }
}

/// Convert AppError to a plain string for display surfaces
impl From<AppError> for String {
    fn from(err: AppError) -> String {
        err.to_string()
    }
}

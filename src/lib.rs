//! Undoctrinator
//!
//! Analyzes text for ideological bias, emotional manipulation and logical
//! fallacies using a pluggable language model backend. It includes:
//! - Data models (phases, reports, settings)
//! - Business logic services (pipeline, aggregation, state machine, workflow)
//! - Storage layer (JSON config)
//! - Utilities (errors, paths)

pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

pub use models::phase::{AppPhase, ErrorInfo, TransitionParams};
pub use models::report::ReportData;
pub use models::settings::{AppConfig, SettingsUpdate};
pub use services::{AnalysisWorkflow, ConsoleRenderer, ModelController, Renderer};
pub use storage::config::ConfigService;
pub use utils::error::{AppError, AppResult};

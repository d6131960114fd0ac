//! Data Models
//!
//! Data structures for settings, workflow phases and analysis reports.

pub mod phase;
pub mod report;
pub mod settings;

pub use phase::{AppPhase, ErrorInfo, TransitionParams};
pub use report::{Proofs, ReportData, Summary};
pub use settings::{AppConfig, SettingsUpdate};

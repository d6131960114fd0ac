//! Workflow Phases
//!
//! The phases of the analysis workflow, the legal edges between them, and the
//! parameter bag carried by a transition.

use serde::{Deserialize, Serialize};

use crate::models::report::ReportData;

/// Application phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppPhase {
    Idle,
    ModelInit,
    ModelReady,
    Data,
    Analysis,
    Report,
    Result,
    Error,
}

impl AppPhase {
    pub const ALL: [AppPhase; 8] = [
        AppPhase::Idle,
        AppPhase::ModelInit,
        AppPhase::ModelReady,
        AppPhase::Data,
        AppPhase::Analysis,
        AppPhase::Report,
        AppPhase::Result,
        AppPhase::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppPhase::Idle => "idle",
            AppPhase::ModelInit => "model-init",
            AppPhase::ModelReady => "model-ready",
            AppPhase::Data => "data",
            AppPhase::Analysis => "analysis",
            AppPhase::Report => "report",
            AppPhase::Result => "result",
            AppPhase::Error => "error",
        }
    }

    /// Phases reachable from this one.
    pub fn allowed_targets(&self) -> &'static [AppPhase] {
        use AppPhase::*;
        match self {
            Idle => &[ModelInit, ModelReady, Data, Error, Idle],
            ModelInit => &[ModelReady, Error],
            ModelReady => &[Idle, Error],
            Data => &[Analysis, Error],
            Analysis => &[Analysis, Report, Error, Idle],
            Report => &[Result, Error],
            Result => &[Idle, Data, Error],
            Error => &[Idle, Data],
        }
    }

    pub fn can_transition_to(&self, target: AppPhase) -> bool {
        self.allowed_targets().contains(&target)
    }
}

impl std::fmt::Display for AppPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{name, message}` pair shown in the error phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub name: String,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Optional parameters carried by a transition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_of_chunks: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_chunk: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ReportData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl TransitionParams {
    /// No parameters.
    pub fn none() -> Self {
        Self::default()
    }

    /// Opening `analysis` transition, before chunking.
    pub fn initial() -> Self {
        Self {
            initial: Some(true),
            ..Self::default()
        }
    }

    /// Per-chunk `analysis` progress (`current_chunk` is 1-based).
    pub fn chunk(current_chunk: usize, count_of_chunks: usize) -> Self {
        Self {
            current_chunk: Some(current_chunk),
            count_of_chunks: Some(count_of_chunks),
            ..Self::default()
        }
    }

    pub fn report(data: ReportData) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }

    pub fn error(info: ErrorInfo) -> Self {
        Self {
            error: Some(info),
            ..Self::default()
        }
    }

    pub fn is_initial(&self) -> bool {
        self.initial == Some(true)
    }
}

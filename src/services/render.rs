//! Rendering
//!
//! The UI side of the workflow. A `Renderer` is handed to the state machine
//! and the analysis pipeline explicitly; its `render` method is the handler
//! run before a phase transition is committed.

use std::sync::Mutex;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{error, info};
use undoctrinator_core::EvidenceCategory;

use crate::models::phase::{AppPhase, TransitionParams};
use crate::models::report::ReportData;
use crate::utils::error::AppResult;

/// Presentation surface driven by phase transitions and progress updates.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Present `phase`. An error aborts the transition.
    async fn render(&self, phase: AppPhase, params: &TransitionParams) -> AppResult<()>;

    /// Model loading progress in `[0, 1]`.
    fn show_model_progress(&self, value: f64);

    /// Analysis progress in `[0, 1]`.
    fn show_analysis_progress(&self, value: f64);
}

/// Renderer that reports phases and progress through `tracing`.
#[derive(Debug, Default)]
pub struct ConsoleRenderer {
    processing_started: Mutex<Option<Instant>>,
    last_model_percent: Mutex<Option<u32>>,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn elapsed_secs(&self) -> f64 {
        let started = *self
            .processing_started
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        started
            .map(|at| at.elapsed().as_secs_f64())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Renderer for ConsoleRenderer {
    async fn render(&self, phase: AppPhase, params: &TransitionParams) -> AppResult<()> {
        match phase {
            AppPhase::Idle => info!("Ready"),
            AppPhase::ModelInit => info!("Loading model"),
            AppPhase::ModelReady => info!("Model loaded"),
            AppPhase::Data => info!("Collecting content"),
            AppPhase::Analysis => {
                if params.is_initial() {
                    *self
                        .processing_started
                        .lock()
                        .unwrap_or_else(|e| e.into_inner()) = Some(Instant::now());
                    info!("Analysis started");
                } else if let (Some(current), Some(count)) =
                    (params.current_chunk, params.count_of_chunks)
                {
                    info!(
                        chunk = current,
                        chunks = count,
                        elapsed_secs = self.elapsed_secs(),
                        "Processing chunk {}/{}",
                        current,
                        count
                    );
                }
            }
            AppPhase::Report => info!("Building report"),
            AppPhase::Result => {
                if let Some(data) = &params.data {
                    info!(evidence = data.total_evidence(), "Report ready");
                }
            }
            AppPhase::Error => {
                if let Some(err) = &params.error {
                    error!(name = %err.name, "{}", err.message);
                }
            }
        }
        Ok(())
    }

    fn show_model_progress(&self, value: f64) {
        let percent = (value.clamp(0.0, 1.0) * 100.0).round() as u32;
        let mut last = self
            .last_model_percent
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if *last != Some(percent) {
            *last = Some(percent);
            info!(percent, "Model loading");
        }
    }

    fn show_analysis_progress(&self, value: f64) {
        let percent = (value.clamp(0.0, 1.0) * 100.0).round() as u32;
        info!(percent, "Analysis progress");
    }
}

/// Plain-text rendering of a report.
pub fn render_report_text(report: &ReportData) -> String {
    let summary = &report.summary;
    let proofs = &report.proofs;
    let mut out = String::new();

    out.push_str("Summary\n");
    out.push_str(&format!(
        "  Ideological strength:             {}\n",
        summary.ideological_strength
    ));
    out.push_str(&format!(
        "  Emotional manipulation strength:  {}\n",
        summary.emotional_manipulation_strength
    ));
    for category in EvidenceCategory::ALL {
        out.push_str(&format!(
            "  {:<34}{}\n",
            format!("{}:", category.label()),
            summary.count(category)
        ));
    }

    let sections: [(EvidenceCategory, Vec<(&str, &str, &str)>); 4] = [
        (
            EvidenceCategory::IdeologicalMarkers,
            proofs
                .ideological_markers
                .iter()
                .map(|i| (i.associated_ideology.as_str(), i.quote.as_str(), i.explanation.as_str()))
                .collect(),
        ),
        (
            EvidenceCategory::PromotedValues,
            proofs
                .promoted_values
                .iter()
                .map(|i| (i.associated_ideology.as_str(), i.quote.as_str(), i.explanation.as_str()))
                .collect(),
        ),
        (
            EvidenceCategory::EmotionalManipulations,
            proofs
                .emotional_manipulations
                .iter()
                .map(|i| (i.target_emotion.as_str(), i.quote.as_str(), i.explanation.as_str()))
                .collect(),
        ),
        (
            EvidenceCategory::LogicalFallacies,
            proofs
                .logical_fallacies
                .iter()
                .map(|i| (i.fallacy_type.as_str(), i.quote.as_str(), i.explanation.as_str()))
                .collect(),
        ),
    ];

    for (category, entries) in sections {
        if entries.is_empty() {
            continue;
        }
        out.push_str(&format!("\n{}\n", category.label()));
        for (tag, quote, explanation) in entries {
            out.push_str(&format!("  [{}] \"{}\"\n      {}\n", tag, quote, explanation));
        }
    }

    out
}

//! Analysis Workflow
//!
//! Top-level driver tying the model controller, the state machine and the
//! analysis pipeline together. Any failure past input collection puts the
//! state machine into `error` with a `{name, message}` pair before the error
//! is returned to the caller.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};
use undoctrinator_core::remove_extra_whitespaces;
use undoctrinator_llm::ProgressCallback;

use super::analysis::{extract_metrics, PipelineOutcome};
use super::content::{ContentExtractor, PageContentSource, TextRecognizer, PAGE_CONTENT_TIMEOUT};
use super::model_controller::ModelController;
use super::render::Renderer;
use super::report::generate_report;
use super::state_machine::StateMachineHandle;
use crate::models::phase::{AppPhase, TransitionParams};
use crate::models::report::ReportData;
use crate::models::settings::AppConfig;
use crate::utils::error::{AppError, AppResult};

pub struct AnalysisWorkflow {
    controller: Arc<ModelController>,
    state: StateMachineHandle,
    renderer: Arc<dyn Renderer>,
}

impl AnalysisWorkflow {
    pub fn new(controller: Arc<ModelController>, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            controller,
            state: StateMachineHandle::new(renderer.clone()),
            renderer,
        }
    }

    pub fn controller(&self) -> &Arc<ModelController> {
        &self.controller
    }

    pub fn state(&self) -> &StateMachineHandle {
        &self.state
    }

    /// Enter `error`, logging rather than returning a secondary failure.
    async fn fail(&self, err: &AppError) {
        error!(name = err.name(), "{}", err.user_message());
        if let Err(e) = self
            .state
            .transition(AppPhase::Error, TransitionParams::error(err.to_error_info()))
            .await
        {
            warn!(error = %e, "Could not enter error state");
        }
    }

    /// Load the configured model: `modelInit -> modelReady -> idle`.
    pub async fn initialize(&self, config: &AppConfig) -> AppResult<()> {
        self.state
            .transition(AppPhase::ModelInit, TransitionParams::none())
            .await?;

        let renderer = self.renderer.clone();
        let progress: ProgressCallback = Arc::new(move |value| renderer.show_model_progress(value));

        if let Err(e) = self.controller.initialize(config, progress).await {
            self.fail(&e).await;
            return Err(e);
        }

        self.state
            .transition(AppPhase::ModelReady, TransitionParams::none())
            .await?;
        self.state
            .transition(AppPhase::Idle, TransitionParams::none())
            .await
    }

    /// Analyze already collected content. The machine must be in `data`.
    ///
    /// Returns `Ok(None)` when the run was cancelled.
    pub async fn analyze_content(&self, content: &str) -> AppResult<Option<ReportData>> {
        match self.run_analysis(content).await {
            Ok(report) => Ok(report),
            Err(e) => {
                self.fail(&e).await;
                Err(e)
            }
        }
    }

    async fn run_analysis(&self, content: &str) -> AppResult<Option<ReportData>> {
        if content.trim().is_empty() {
            return Err(AppError::content("No text content to analyze"));
        }

        let started = Instant::now();
        self.state
            .transition(AppPhase::Analysis, TransitionParams::initial())
            .await?;

        let outcome = extract_metrics(
            content,
            &self.controller,
            &self.state,
            self.renderer.clone(),
        )
        .await?;

        let findings = match outcome {
            PipelineOutcome::Completed(findings) => findings,
            PipelineOutcome::Cancelled => {
                info!(elapsed_secs = started.elapsed().as_secs_f64(), "Analysis cancelled");
                return Ok(None);
            }
        };
        if self.state.current().await != AppPhase::Analysis {
            return Ok(None);
        }

        self.state
            .transition(AppPhase::Report, TransitionParams::none())
            .await?;
        let report = generate_report(&findings);
        self.state
            .transition(AppPhase::Result, TransitionParams::report(report.clone()))
            .await?;

        info!(
            model = %self.controller.model_id().unwrap_or_default(),
            chunks_parsed = findings.len(),
            evidence = report.total_evidence(),
            elapsed_secs = started.elapsed().as_secs_f64(),
            "Report generated"
        );
        Ok(Some(report))
    }

    /// Analyze user-supplied text.
    pub async fn analyze_text(&self, text: &str) -> AppResult<Option<ReportData>> {
        self.state
            .transition(AppPhase::Data, TransitionParams::none())
            .await?;
        self.analyze_content(&remove_extra_whitespaces(text)).await
    }

    /// Fetch the page markup, extract its text and analyze it.
    pub async fn analyze_page(
        &self,
        source: &dyn PageContentSource,
        extractor: &dyn ContentExtractor,
    ) -> AppResult<Option<ReportData>> {
        self.state
            .transition(AppPhase::Data, TransitionParams::none())
            .await?;

        let text = match source.fetch_page_content(PAGE_CONTENT_TIMEOUT).await {
            Ok(markup) => extractor.extract(&markup),
            Err(e) => Err(e),
        };
        match text {
            Ok(text) => self.analyze_content(&text).await,
            Err(e) => {
                self.fail(&e).await;
                Err(e)
            }
        }
    }

    /// Recognize the text in an image and analyze it.
    pub async fn analyze_image(
        &self,
        recognizer: &dyn TextRecognizer,
        image: &[u8],
    ) -> AppResult<Option<ReportData>> {
        self.state
            .transition(AppPhase::Data, TransitionParams::none())
            .await?;

        match recognizer.recognize(image).await {
            Ok(text) => self.analyze_content(&remove_extra_whitespaces(&text)).await,
            Err(e) => {
                self.fail(&e).await;
                Err(e)
            }
        }
    }

    /// Stop any in-flight generation and return to `idle`.
    ///
    /// The phase changes first so the pipeline sees the cancellation as soon
    /// as the in-flight call returns.
    pub async fn cancel(&self) -> AppResult<()> {
        let idle = self.state.force_idle().await;
        if let Err(e) = self.controller.stop_generation() {
            warn!(error = %e, "Nothing to stop");
        }
        idle
    }

    /// Dismiss the report: `result -> idle`.
    pub async fn close_report(&self) -> AppResult<()> {
        self.state
            .transition(AppPhase::Idle, TransitionParams::none())
            .await
    }
}

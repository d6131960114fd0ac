//! Workflow Integration Tests
//!
//! Full runs through `AnalysisWorkflow`: phase sequence, error surfacing,
//! cancellation and the page/image entry points.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use undoctrinator::services::{
    AnalysisWorkflow, HtmlContentExtractor, ModelController, PageContentChannel, TextRecognizer,
};
use undoctrinator::{AppConfig, AppError, AppPhase, AppResult};
use undoctrinator_core::IntensityLevel;

use super::common::{findings_reply, wait_until, RecordingRenderer, Reply, ScriptedStrategy};

const REPLY: &str = r#"{
    "ideologicalStrength": "MODERATE",
    "emotionalManipulationStrength": "STRONG",
    "ideologicalMarkers": [{"quote": "our nation", "explanation": "nationalist framing", "associatedIdeology": "nationalism"}],
    "promotedValues": [],
    "emotionalManipulations": [{"quote": "at the gates", "explanation": "manufactured urgency", "targetEmotion": "fear"}],
    "logicalFallacies": null
}"#;

fn workflow_with(
    strategy: Arc<ScriptedStrategy>,
) -> (Arc<AnalysisWorkflow>, Arc<RecordingRenderer>) {
    let renderer = RecordingRenderer::new();
    let controller = Arc::new(ModelController::with_strategy(strategy));
    let workflow = Arc::new(AnalysisWorkflow::new(controller, renderer.clone()));
    (workflow, renderer)
}

struct FixedRecognizer(&'static str);

#[async_trait]
impl TextRecognizer for FixedRecognizer {
    async fn recognize(&self, _image: &[u8]) -> AppResult<String> {
        Ok(self.0.to_string())
    }
}

#[tokio::test]
async fn test_text_analysis_phase_sequence() {
    let strategy = ScriptedStrategy::new(4096, vec![findings_reply(REPLY)]);
    let (workflow, renderer) = workflow_with(strategy.clone());

    let report = workflow
        .analyze_text("Our nation   is under threat.\nThe enemy is at the gates.")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.summary.ideological_strength, IntensityLevel::Moderate);
    assert_eq!(
        report.summary.emotional_manipulation_strength,
        IntensityLevel::Strong
    );
    assert_eq!(report.summary.ideological_markers_count, 1);
    assert_eq!(report.summary.emotional_manipulations_count, 1);
    assert_eq!(report.summary.logical_fallacies_count, 0);
    assert_eq!(report.proofs.emotional_manipulations[0].target_emotion, "fear");

    assert_eq!(
        renderer.phases(),
        vec![
            AppPhase::Data,
            AppPhase::Analysis,
            AppPhase::Analysis,
            AppPhase::Report,
            AppPhase::Result
        ]
    );
    assert_eq!(renderer.chunk_transitions(), vec![(1, 1)]);
    assert_eq!(renderer.last_params().unwrap().data, Some(report));
    assert!(strategy.prompts.lock().unwrap()[0]
        .contains("Our nation is under threat. The enemy is at the gates."));

    workflow.close_report().await.unwrap();
    assert_eq!(workflow.state().current().await, AppPhase::Idle);
}

#[tokio::test]
async fn test_all_chunks_failing_yields_empty_report() {
    let strategy = ScriptedStrategy::new(4096, vec![Reply::Text("nope".to_string())]);
    let (workflow, _renderer) = workflow_with(strategy);

    let report = workflow.analyze_text("some text").await.unwrap().unwrap();
    assert_eq!(report.total_evidence(), 0);
    assert_eq!(report.summary.ideological_strength, IntensityLevel::None);
    assert_eq!(workflow.state().current().await, AppPhase::Result);
}

#[tokio::test]
async fn test_missing_strategy_enters_error_state() {
    let renderer = RecordingRenderer::new();
    let workflow = AnalysisWorkflow::new(Arc::new(ModelController::new()), renderer.clone());

    let err = workflow.analyze_text("some text").await.unwrap_err();
    assert!(matches!(err, AppError::Precondition(_)));

    assert_eq!(workflow.state().current().await, AppPhase::Error);
    let shown = renderer.last_params().unwrap().error.unwrap();
    assert_eq!(shown.name, "PreconditionError");
    assert!(shown.message.contains("initialize the model"));
}

#[tokio::test]
async fn test_empty_text_enters_error_state() {
    let strategy = ScriptedStrategy::new(4096, vec![]);
    let (workflow, renderer) = workflow_with(strategy.clone());

    let err = workflow.analyze_text("  \n\t ").await.unwrap_err();
    assert!(matches!(err, AppError::Content(_)));
    assert_eq!(renderer.phases(), vec![AppPhase::Data, AppPhase::Error]);
    assert_eq!(strategy.calls(), 0);

    // error -> idle lets the user start over
    workflow.state().force_idle().await.unwrap();
    assert_eq!(workflow.state().current().await, AppPhase::Idle);
}

#[tokio::test]
async fn test_cancel_yields_no_report() {
    let strategy = ScriptedStrategy::new(4096, vec![Reply::Hang]);
    let (workflow, renderer) = workflow_with(strategy.clone());

    let run = {
        let workflow = workflow.clone();
        tokio::spawn(async move { workflow.analyze_text("a long article").await })
    };

    wait_until(|| strategy.calls() == 1).await;
    workflow.cancel().await.unwrap();

    let result = run.await.unwrap().unwrap();
    assert!(result.is_none());
    assert_eq!(workflow.state().current().await, AppPhase::Idle);
    assert_eq!(strategy.stops.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert!(!renderer.phases().contains(&AppPhase::Report));
    assert!(!renderer.phases().contains(&AppPhase::Error));
}

#[tokio::test]
async fn test_initialize_unknown_model_leaves_no_strategy() {
    let renderer = RecordingRenderer::new();
    let controller = Arc::new(ModelController::new());
    let workflow = AnalysisWorkflow::new(controller.clone(), renderer.clone());

    let config = AppConfig {
        model_to_use: "GEMINI_ULTRA".to_string(),
        ..Default::default()
    };
    workflow.initialize(&config).await.unwrap();

    assert_eq!(
        renderer.phases(),
        vec![AppPhase::ModelInit, AppPhase::ModelReady, AppPhase::Idle]
    );
    assert!(!controller.has_strategy());
}

#[tokio::test]
async fn test_initialize_without_key_enters_error_state() {
    let renderer = RecordingRenderer::new();
    let workflow = AnalysisWorkflow::new(Arc::new(ModelController::new()), renderer.clone());

    let config = AppConfig {
        model_to_use: "ANTHROPIC".to_string(),
        ..Default::default()
    };
    let err = workflow.initialize(&config).await.unwrap_err();
    assert_eq!(err.name(), "ConfigurationError");

    assert_eq!(renderer.phases(), vec![AppPhase::ModelInit, AppPhase::Error]);
    let shown = renderer.last_params().unwrap().error.unwrap();
    assert_eq!(shown.name, "ConfigurationError");
}

#[tokio::test]
async fn test_initialize_remote_backend() {
    let renderer = RecordingRenderer::new();
    let controller = Arc::new(ModelController::new());
    let workflow = AnalysisWorkflow::new(controller.clone(), renderer.clone());

    let config = AppConfig {
        model_to_use: "OPENAI".to_string(),
        open_ai_api_key: "sk-test".to_string(),
        ..Default::default()
    };
    workflow.initialize(&config).await.unwrap();
    assert_eq!(controller.model_id().unwrap(), "GPT-4O-MINI");
    assert_eq!(workflow.state().current().await, AppPhase::Idle);
}

#[tokio::test]
async fn test_page_analysis_extracts_markup() {
    let strategy = ScriptedStrategy::new(4096, vec![findings_reply("{}")]);
    let (workflow, _renderer) = workflow_with(strategy.clone());

    let page = PageContentChannel::serve(
        "<html><body><h1>Headline</h1><p>Everyone   agrees.</p></body></html>".to_string(),
    );
    let report = workflow
        .analyze_page(&page, &HtmlContentExtractor)
        .await
        .unwrap();

    assert!(report.is_some());
    let prompt = strategy.prompts.lock().unwrap()[0].clone();
    assert!(prompt.contains("Headline"));
    assert!(prompt.contains("Everyone agrees."));
    assert!(!prompt.contains("<p>"));
}

#[tokio::test(start_paused = true)]
async fn test_page_timeout_enters_error_state() {
    let strategy = ScriptedStrategy::new(4096, vec![]);
    let (workflow, renderer) = workflow_with(strategy.clone());

    let (request_tx, _request_rx) = mpsc::channel(1);
    let (_response_tx, response_rx) = mpsc::channel(1);
    let page = PageContentChannel::new(request_tx, response_rx);

    let err = workflow
        .analyze_page(&page, &HtmlContentExtractor)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Timeout(_)));
    assert_eq!(renderer.phases(), vec![AppPhase::Data, AppPhase::Error]);
    assert_eq!(
        renderer.last_params().unwrap().error.unwrap().name,
        "TimeoutError"
    );
    assert_eq!(strategy.calls(), 0);
}

#[tokio::test]
async fn test_image_analysis_uses_recognized_text() {
    let strategy = ScriptedStrategy::new(4096, vec![findings_reply("{}")]);
    let (workflow, _renderer) = workflow_with(strategy.clone());

    let report = workflow
        .analyze_image(&FixedRecognizer("Scanned   slogan"), &[0x89, 0x50, 0x4e, 0x47])
        .await
        .unwrap();

    assert!(report.is_some());
    assert!(strategy.prompts.lock().unwrap()[0].contains("Scanned slogan"));
}

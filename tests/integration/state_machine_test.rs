//! State Machine Integration Tests
//!
//! Every edge of the phase table, legal or not, exercised from a machine
//! actually driven into the source phase.

use undoctrinator::services::StateMachineHandle;
use undoctrinator::{AppError, AppPhase, ErrorInfo, ReportData, TransitionParams};

use super::common::RecordingRenderer;

/// Parameters satisfying whatever `target` requires.
fn valid_params(target: AppPhase) -> TransitionParams {
    match target {
        AppPhase::Analysis => TransitionParams::initial(),
        AppPhase::Result => TransitionParams::report(ReportData::default()),
        AppPhase::Error => TransitionParams::error(ErrorInfo::new("TestError", "boom")),
        _ => TransitionParams::none(),
    }
}

fn path_to(phase: AppPhase) -> Vec<AppPhase> {
    use AppPhase::*;
    match phase {
        Idle => vec![],
        ModelInit => vec![ModelInit],
        ModelReady => vec![ModelReady],
        Data => vec![Data],
        Analysis => vec![Data, Analysis],
        Report => vec![Data, Analysis, Report],
        Result => vec![Data, Analysis, Report, Result],
        Error => vec![Error],
    }
}

async fn machine_in(phase: AppPhase) -> StateMachineHandle {
    let handle = StateMachineHandle::new(RecordingRenderer::new());
    for step in path_to(phase) {
        handle.transition(step, valid_params(step)).await.unwrap();
    }
    assert_eq!(handle.current().await, phase);
    handle
}

#[tokio::test]
async fn test_every_edge_matches_the_table() {
    for from in AppPhase::ALL {
        for to in AppPhase::ALL {
            let handle = machine_in(from).await;
            let history_before = handle.history().await;
            let result = handle.transition(to, valid_params(to)).await;

            if from.can_transition_to(to) {
                assert!(result.is_ok(), "{} -> {} should be legal", from, to);
                assert_eq!(handle.current().await, to);
            } else {
                match result {
                    Err(AppError::InvalidTransition { from: f, to: t }) => {
                        assert_eq!((f, t), (from, to));
                    }
                    other => panic!("{} -> {} should be rejected, got {:?}", from, to, other),
                }
                assert_eq!(handle.current().await, from);
                assert_eq!(handle.history().await, history_before);
            }
        }
    }
}

#[tokio::test]
async fn test_legal_edge_count() {
    let legal: usize = AppPhase::ALL
        .iter()
        .map(|from| AppPhase::ALL.iter().filter(|to| from.can_transition_to(**to)).count())
        .sum();
    assert_eq!(legal, 5 + 2 + 2 + 2 + 4 + 2 + 3 + 2);
}

#[tokio::test]
async fn test_invalid_transition_names_both_phases() {
    let handle = machine_in(AppPhase::ModelInit).await;
    let err = handle
        .transition(AppPhase::Data, TransitionParams::none())
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid transition from 'model-init' to 'data'"
    );
    assert_eq!(err.name(), "InvalidTransitionError");
}

#[tokio::test]
async fn test_required_params_enforced_on_legal_edges() {
    let handle = machine_in(AppPhase::Data).await;
    let err = handle
        .transition(AppPhase::Analysis, TransitionParams::none())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::StateTransition(_)));

    let handle = machine_in(AppPhase::Report).await;
    let err = handle
        .transition(AppPhase::Result, TransitionParams::none())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::StateTransition(_)));
    assert_eq!(handle.current().await, AppPhase::Report);

    let handle = machine_in(AppPhase::Idle).await;
    let err = handle
        .transition(AppPhase::Error, TransitionParams::none())
        .await
        .unwrap_err();
    assert_eq!(err.name(), "StateTransitionError");
}

#[tokio::test]
async fn test_analysis_accepts_chunk_progress_without_initial() {
    let handle = machine_in(AppPhase::Analysis).await;
    handle
        .transition(AppPhase::Analysis, TransitionParams::chunk(2, 5))
        .await
        .unwrap();
    assert!(handle.advance_analysis(3, 5).await.unwrap());
    assert_eq!(
        handle.history().await,
        vec![
            AppPhase::Idle,
            AppPhase::Data,
            AppPhase::Analysis,
            AppPhase::Analysis
        ]
    );
}

#[tokio::test]
async fn test_force_idle_from_analysis_and_result() {
    for phase in [AppPhase::Analysis, AppPhase::Result, AppPhase::Error] {
        let handle = machine_in(phase).await;
        handle.force_idle().await.unwrap();
        assert_eq!(handle.current().await, AppPhase::Idle);
    }

    let handle = machine_in(AppPhase::Report).await;
    assert!(handle.force_idle().await.is_err());
}

//! Analysis Progress
//!
//! Progress is an owned value advanced once per successfully processed chunk.
//! A single-chunk run has nothing to advance until the very end, so it gets a
//! background ticker that nudges the indicator forward; the ticker is a
//! spawned task aborted as soon as the state advances, finishes, or is
//! dropped.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::task::JoinHandle;

use crate::services::render::Renderer;

/// Starting fraction shown when analysis begins.
pub const PROGRESS_INITIAL: f64 = 0.3;

/// Ceiling reached when every chunk succeeds.
pub const PROGRESS_MAX: f64 = 0.9;

/// Increment of one dummy tick.
pub const DUMMY_STEP: f64 = 0.05;

/// Dummy tick interval bounds, in milliseconds.
pub const DUMMY_INTERVAL_MIN_MS: u64 = 1000;
pub const DUMMY_INTERVAL_MAX_MS: u64 = 2500;

/// Progress of one analysis run.
pub struct ProgressState {
    value: f64,
    step: f64,
    ticker: Option<JoinHandle<()>>,
    renderer: Arc<dyn Renderer>,
}

impl ProgressState {
    /// Report the initial fraction and, for a single chunk, start the ticker.
    pub fn start(chunk_count: usize, renderer: Arc<dyn Renderer>) -> Self {
        renderer.show_analysis_progress(PROGRESS_INITIAL);

        let step = (PROGRESS_MAX - PROGRESS_INITIAL) / chunk_count.max(1) as f64;
        let ticker = (chunk_count == 1).then(|| spawn_dummy_ticker(renderer.clone()));

        Self {
            value: PROGRESS_INITIAL,
            step,
            ticker,
            renderer,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    /// Advance by one chunk's step and report it.
    pub fn advance(mut self) -> Self {
        self.stop_ticker();
        self.value = (self.value + self.step).min(PROGRESS_MAX);
        self.renderer.show_analysis_progress(self.value);
        self
    }

    /// End of run; stops any ticker.
    pub fn finish(mut self) {
        self.stop_ticker();
    }

    fn stop_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }
}

impl Drop for ProgressState {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}

fn spawn_dummy_ticker(renderer: Arc<dyn Renderer>) -> JoinHandle<()> {
    let period = Duration::from_millis(
        rand::thread_rng().gen_range(DUMMY_INTERVAL_MIN_MS..=DUMMY_INTERVAL_MAX_MS),
    );

    tokio::spawn(async move {
        let mut value = PROGRESS_INITIAL;
        let mut interval = tokio::time::interval(period);
        // first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            if value > PROGRESS_MAX - DUMMY_STEP + 1e-9 {
                break;
            }
            value += DUMMY_STEP;
            renderer.show_analysis_progress(value);
        }
    })
}

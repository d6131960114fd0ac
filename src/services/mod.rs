//! Services
//!
//! Business logic of the analyzer. The workflow drives everything else and
//! is what the binary calls.

pub mod analysis;
pub mod content;
pub mod model_controller;
pub mod render;
pub mod report;
pub mod state_machine;
pub mod workflow;

pub use analysis::{craft_instructions, extract_metrics, process_chunk, PipelineOutcome};
pub use content::{
    ContentExtractor, ContentMessage, HtmlContentExtractor, PageContentChannel, PageContentSource,
    TextRecognizer, PAGE_CONTENT_TIMEOUT,
};
pub use model_controller::{select_backend, ModelController};
pub use render::{render_report_text, ConsoleRenderer, Renderer};
pub use report::{generate_report, get_intensity_level, IntensityPolicy};
pub use state_machine::{StateMachine, StateMachineHandle};
pub use workflow::AnalysisWorkflow;

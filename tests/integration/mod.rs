//! Integration Tests Module
//!
//! End-to-end tests for the analyzer: pipeline, report aggregation, state
//! machine, workflow, remote backends over a mock HTTP server, and config
//! persistence.




// Phase table coverage
mod state_machine_test;

// Full workflow runs, cancellation and content entry points
mod workflow_test;

// OpenAI and Anthropic wire dialects against wiremock
mod remote_strategy_test;

// Settings persistence
mod config_test;

//! Undoctrinator Core
//!
//! Foundational types and utilities for the Undoctrinator workspace. This crate
//! has no dependency on the completion backends or on application-level code.
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `finding` - Finding-set domain model (`IntensityLevel`, `FindingSet`, evidence items)
//! - `text` - Chunking and whitespace normalization
//! - `json` - Recovery of JSON objects embedded in free-form model output

pub mod error;
pub mod finding;
pub mod json;
pub mod text;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Finding Sets ───────────────────────────────────────────────────────
pub use finding::{
    EmotionalItem, EvidenceCategory, FindingSet, IdeologicalItem, IntensityLevel, LogicalItem,
};

// ── Utilities ──────────────────────────────────────────────────────────
pub use json::{extract_json_from_str, extract_json_value};
pub use text::{chunk_string, format_bytes, remove_extra_whitespaces};

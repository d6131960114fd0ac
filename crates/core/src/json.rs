//! Embedded JSON Recovery
//!
//! Backends often wrap the requested JSON object in prose or a fenced code
//! block. `extract_json_from_str` scans for `{...}` candidates (up to two
//! levels of nested braces) left to right and returns the first that parses.

use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;

const CANDIDATE_PATTERN: &str = r"\{(?:[^{}]|(?:\{(?:[^{}]|(?:\{[^{}]*\}))*\}))*\}";

fn candidate_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(CANDIDATE_PATTERN).ok()).as_ref()
}

/// Return the first embedded `{...}` span that deserializes into `T`.
///
/// Candidates that are not valid JSON, or that do not fit `T`, are skipped.
pub fn extract_json_from_str<T: DeserializeOwned>(text: &str) -> Option<T> {
    candidate_regex()?
        .find_iter(text)
        .find_map(|m| serde_json::from_str::<T>(m.as_str()).ok())
}

/// Untyped variant of [`extract_json_from_str`].
pub fn extract_json_value(text: &str) -> Option<serde_json::Value> {
    extract_json_from_str::<serde_json::Value>(text)
}

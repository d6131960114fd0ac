//! Text Utilities
//!
//! Chunking and normalization helpers used before text is handed to a
//! completion backend.

use crate::error::{CoreError, CoreResult};

/// Split `text` into contiguous, non-overlapping pieces of `size` characters.
///
/// The final piece may be shorter. Splitting is done on `char` boundaries so
/// multi-byte text never panics. Empty input yields no pieces.
pub fn chunk_string(text: &str, size: usize) -> CoreResult<Vec<String>> {
    if size == 0 {
        return Err(CoreError::validation("chunk size must be greater than 0"));
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0usize;

    for ch in text.chars() {
        current.push(ch);
        count += 1;
        if count == size {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    Ok(chunks)
}

/// Collapse every run of whitespace to a single space and trim both ends.
pub fn remove_extra_whitespaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Human-readable byte size, e.g. `1.5 KB`.
pub fn format_bytes(bytes: u64, decimals: usize) -> String {
    const UNITS: [&str; 9] = ["Bytes", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut scaled = bytes as f64;
    let mut exponent = 0usize;
    while scaled >= 1024.0 && exponent < UNITS.len() - 1 {
        scaled /= 1024.0;
        exponent += 1;
    }

    let formatted = format!("{:.*}", decimals, scaled);
    // 1.50 -> 1.5, 2.0 -> 2
    let trimmed = if formatted.contains('.') {
        formatted.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        formatted
    };

    format!("{} {}", trimmed, UNITS[exponent])
}

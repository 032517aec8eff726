//! JSON Extraction
//!
//! Pulls a JSON object out of an LLM completion.
//!
//! Accepted shapes:
//! - Bare JSON
//! - Markdown code fence wrapping (```json ... ```)
//! - A single object embedded in explanatory text
//!
//! Anything else is a `ParseFailure`. No structural repair is attempted:
//! a malformed completion takes the caller's degraded path.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::types::{GitWriterError, Result};

/// Extract and parse JSON from an LLM response
pub fn extract_json_from_response(content: &str) -> Result<Value> {
    let cleaned = preprocess(content);

    if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
        return Ok(value);
    }

    debug!("Direct JSON parse failed, looking for an embedded object");

    if let Some(embedded) = embedded_object(&cleaned)
        && let Ok(value) = serde_json::from_str::<Value>(embedded)
    {
        return Ok(value);
    }

    Err(GitWriterError::ParseFailure(format!(
        "Response is not valid JSON. Content preview: {}...",
        cleaned.chars().take(200).collect::<String>()
    )))
}

/// Extract JSON and deserialize it into `T`
pub fn parse_json_response<T: DeserializeOwned>(content: &str) -> Result<T> {
    let value = extract_json_from_response(content)?;
    serde_json::from_value(value)
        .map_err(|e| GitWriterError::ParseFailure(format!("Unexpected JSON shape: {}", e)))
}

fn preprocess(raw: &str) -> String {
    let trimmed = raw.trim().trim_start_matches('\u{feff}');
    strip_code_fences(trimmed).trim().to_string()
}

fn strip_code_fences(s: &str) -> &str {
    let mut result = s;

    if result.starts_with("```")
        && let Some(first_newline) = result.find('\n')
    {
        result = &result[first_newline + 1..];
    }

    if let Some(stripped) = result.trim_end().strip_suffix("```") {
        result = stripped;
    }

    result
}

/// Outermost `{ ... }` span, if any
fn embedded_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let end = s.rfind('}')?;
    (end > start).then(|| &s[start..=end])
}

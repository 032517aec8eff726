//! LLM Response Validation
//!
//! Structured output from the LLM is never trusted: it is extracted,
//! parsed, and shape-checked before any stage consumes it.

mod json_extract;

pub use json_extract::{extract_json_from_response, parse_json_response};

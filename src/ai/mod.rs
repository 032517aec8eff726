//! AI Integration Layer
//!
//! Optional LLM backend, token estimation, and response validation used by
//! the extraction and synthesis stages.

pub mod preflight;
pub mod provider;
pub mod timeout;
pub mod tokenizer;
pub mod validation;

pub use preflight::{CheckResult, PreflightCheck, PreflightResult};
pub use provider::{
    LlmProvider, LlmResponse, OpenAiProvider, ResponseMetadata, ResponseTiming, SharedProvider,
    TokenUsage, create_provider,
};
pub use timeout::{TimeoutConfig, with_timeout};
pub use tokenizer::{TokenBudget, estimate_files_tokens, estimate_tokens, truncate_content};
pub use validation::{extract_json_from_response, parse_json_response};

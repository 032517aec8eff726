//! LLM Provider Abstraction
//!
//! Defines the `LlmProvider` trait for plain-text completions. The pipeline
//! treats the LLM as optional: `create_provider` returns `None` when no
//! backend is configured, which selects the heuristic strategies.
//!
//! ## Modules
//!
//! - `openai`: Chat Completions API provider

mod openai;

pub use openai::OpenAiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::config::LlmConfig;
use crate::types::{GitWriterError, Result};

// =============================================================================
// LLM Response with Usage Metrics
// =============================================================================

/// Complete LLM response including text and usage metrics
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Raw completion text
    pub content: String,
    /// Token usage metrics
    pub usage: TokenUsage,
    /// Response timing
    pub timing: ResponseTiming,
    /// Provider and model info
    pub metadata: ResponseMetadata,
}

impl LlmResponse {
    /// Create response with content only (usage unknown)
    pub fn content_only(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: TokenUsage::default(),
            timing: ResponseTiming::default(),
            metadata: ResponseMetadata::default(),
        }
    }
}

/// Token usage reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }

    /// Create from OpenAI-style usage response
    pub fn from_openai(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            input_tokens: prompt_tokens,
            output_tokens: completion_tokens,
        }
    }
}

/// Response timing metrics
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseTiming {
    /// Total response time in milliseconds (wall clock)
    pub total_ms: u64,
}

impl ResponseTiming {
    pub fn from_duration(duration: std::time::Duration) -> Self {
        Self {
            total_ms: duration.as_millis() as u64,
        }
    }
}

/// Response metadata
#[derive(Debug, Clone, Default)]
pub struct ResponseMetadata {
    pub model: String,
    pub provider: String,
}

/// Shared LLM provider type, constructed once and injected into each stage.
pub type SharedProvider = Arc<dyn LlmProvider + Send + Sync>;

// =============================================================================
// LLM Provider Trait
// =============================================================================

/// LLM Provider trait for text completion
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Complete a single prompt at the given sampling temperature
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<LlmResponse>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;

    /// Check if the provider is reachable
    async fn health_check(&self) -> Result<bool>;
}

/// Known provider identifiers
pub const PROVIDER_NONE: &str = "none";
pub const PROVIDER_OPENAI: &str = "openai";

/// Create the configured provider.
///
/// Returns `Ok(None)` for the heuristic mode: provider `"none"`, or an
/// OpenAI provider with no API key in config or `OPENAI_API_KEY`.
pub fn create_provider(config: &LlmConfig) -> Result<Option<SharedProvider>> {
    match config.provider.as_str() {
        PROVIDER_NONE => {
            info!("LLM provider disabled, using heuristic strategies");
            Ok(None)
        }
        PROVIDER_OPENAI => {
            let Some(api_key) = config.resolve_api_key() else {
                info!("No OpenAI API key configured, using heuristic strategies");
                return Ok(None);
            };
            let provider = OpenAiProvider::new(config, api_key)?;
            info!(
                "Using OpenAI provider (model: {})",
                LlmProvider::model(&provider)
            );
            Ok(Some(Arc::new(provider)))
        }
        other => Err(GitWriterError::Config(format!(
            "Unknown provider: {}. Supported: {}, {}",
            other, PROVIDER_OPENAI, PROVIDER_NONE
        ))),
    }
}

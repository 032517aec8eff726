//! README Synthesis
//!
//! Renders a `FeatureSummary` into Markdown. Synthesis never fails: the
//! LLM strategy falls back to a fixed README on any error or empty output.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use super::prompts::{FALLBACK_README, synthesis_prompt, template_readme};
use crate::ai::provider::SharedProvider;
use crate::ai::timeout::with_timeout;
use crate::constants::llm::SYNTHESIS_TEMPERATURE;
use crate::types::{FeatureSummary, ReadmeResult};

/// A README synthesis strategy
#[async_trait]
pub trait ReadmeSynthesizer: Send + Sync {
    /// Produce a README from a summary. The summary is normalized first.
    async fn synthesize(&self, summary: FeatureSummary) -> ReadmeResult;

    fn name(&self) -> &'static str;
}

/// Deterministic Markdown template
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateSynthesizer;

#[async_trait]
impl ReadmeSynthesizer for TemplateSynthesizer {
    async fn synthesize(&self, summary: FeatureSummary) -> ReadmeResult {
        ReadmeResult::new(template_readme(&summary.normalized()))
    }

    fn name(&self) -> &'static str {
        "template"
    }
}

/// Synthesizer backed by an LLM completion
pub struct LlmSynthesizer {
    provider: SharedProvider,
    timeout: Duration,
    temperature: f32,
}

impl LlmSynthesizer {
    pub fn new(provider: SharedProvider, timeout: Duration) -> Self {
        Self {
            provider,
            timeout,
            temperature: SYNTHESIS_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl ReadmeSynthesizer for LlmSynthesizer {
    async fn synthesize(&self, summary: FeatureSummary) -> ReadmeResult {
        let prompt = synthesis_prompt(&summary.normalized());
        debug!("Synthesis prompt: {} chars", prompt.len());

        let response = with_timeout(
            self.timeout,
            self.provider.complete(&prompt, self.temperature),
            "README synthesis",
        )
        .await;

        match response {
            Ok(response) if !response.content.trim().is_empty() => {
                ReadmeResult::new(response.content)
            }
            Ok(_) => {
                warn!("LLM returned an empty README, using fallback");
                ReadmeResult::new(FALLBACK_README)
            }
            Err(e) => {
                warn!("README synthesis failed: {}, using fallback", e);
                ReadmeResult::new(FALLBACK_README)
            }
        }
    }

    fn name(&self) -> &'static str {
        "llm"
    }
}

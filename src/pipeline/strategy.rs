//! Strategy wiring
//!
//! The LLM/heuristic choice is made once when `Strategies` is built and
//! then shared by every pipeline run.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::extractor::{FeatureExtractor, HeuristicExtractor, LlmExtractor};
use super::synthesizer::{LlmSynthesizer, ReadmeSynthesizer, TemplateSynthesizer};
use crate::ai::preflight::PreflightCheck;
use crate::ai::provider::SharedProvider;

/// Extraction and synthesis strategies for one process
#[derive(Clone)]
pub struct Strategies {
    pub extractor: Arc<dyn FeatureExtractor>,
    pub synthesizer: Arc<dyn ReadmeSynthesizer>,
}

impl std::fmt::Debug for Strategies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strategies")
            .field("extractor", &self.extractor.name())
            .field("synthesizer", &self.synthesizer.name())
            .finish()
    }
}

impl Strategies {
    /// Rule-based extraction and template synthesis; no network
    pub fn heuristic() -> Self {
        Self {
            extractor: Arc::new(HeuristicExtractor),
            synthesizer: Arc::new(TemplateSynthesizer),
        }
    }

    /// LLM strategies when a provider is present, heuristic otherwise
    pub fn from_provider(
        provider: Option<SharedProvider>,
        timeout: Duration,
        temperature: Option<f32>,
    ) -> Self {
        let Some(provider) = provider else {
            info!("No LLM backend configured, using heuristic strategies");
            return Self::heuristic();
        };

        info!(
            "Using LLM strategies ({} / {})",
            provider.name(),
            provider.model()
        );

        let mut extractor = LlmExtractor::new(provider.clone(), timeout);
        let mut synthesizer = LlmSynthesizer::new(provider, timeout);
        if let Some(t) = temperature {
            extractor = extractor.with_temperature(t);
            synthesizer = synthesizer.with_temperature(t);
        }

        Self {
            extractor: Arc::new(extractor),
            synthesizer: Arc::new(synthesizer),
        }
    }

    /// Like `from_provider`, but drops to heuristic strategies when the
    /// provider fails its health probe
    pub async fn from_provider_checked(
        provider: Option<SharedProvider>,
        timeout: Duration,
        temperature: Option<f32>,
        preflight: &PreflightCheck,
    ) -> Self {
        let provider = match provider {
            Some(provider) => {
                let result = preflight.check_provider(provider.as_ref()).await;
                if result.passed {
                    Some(provider)
                } else {
                    for error in result.errors() {
                        warn!("LLM preflight failed: {}", error);
                    }
                    None
                }
            }
            None => None,
        };
        Self::from_provider(provider, timeout, temperature)
    }

    /// True when both stages run without an LLM
    pub fn is_heuristic(&self) -> bool {
        self.extractor.name() == "heuristic" && self.synthesizer.name() == "template"
    }
}

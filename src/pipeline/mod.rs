//! README Generation Pipeline
//!
//! ```text
//! credential → Reader → Extractor → Synthesizer → result store
//! ```
//!
//! Reader, extractor and synthesizer degrade instead of failing. The
//! orchestrator stops only when the credential cannot be resolved, the
//! arguments are malformed, extraction loses its LLM mid-call, or the
//! result cannot be stored. Every hard stop is wrapped as
//! "Failed to generate README: ...".

pub mod commit;
pub mod extractor;
pub mod prompts;
pub mod reader;
pub mod repos;
pub mod selector;
pub mod strategy;
pub mod synthesizer;

pub use commit::{CommitBack, CommitOutcome};
pub use extractor::{FeatureExtractor, HeuristicExtractor, LlmExtractor, extract};
pub use reader::RepositoryReader;
pub use repos::list_user_repos;
pub use selector::{FileSelector, apply_token_ceiling};
pub use strategy::Strategies;
pub use synthesizer::{LlmSynthesizer, ReadmeSynthesizer, TemplateSynthesizer};

use tracing::{debug, error, info, instrument};

use crate::config::BudgetConfig;
use crate::github::SharedRepositoryApi;
use crate::storage::{SharedCredentialStore, SharedResultStore};
use crate::types::{AccountId, GitWriterError, ReadmeResult, Result};

/// End-to-end README generation for one repository and account
#[derive(Clone)]
pub struct ReadmePipeline {
    credentials: SharedCredentialStore,
    results: SharedResultStore,
    reader: RepositoryReader,
    strategies: Strategies,
    budget: BudgetConfig,
}

impl ReadmePipeline {
    pub fn new(
        api: SharedRepositoryApi,
        credentials: SharedCredentialStore,
        results: SharedResultStore,
        strategies: Strategies,
        budget: BudgetConfig,
    ) -> Self {
        Self {
            credentials,
            results,
            reader: RepositoryReader::new(api, budget),
            strategies,
            budget,
        }
    }

    /// Bounded parallel content fetches inside the reader
    pub fn with_fetch_concurrency(mut self, n: usize) -> Self {
        self.reader = self.reader.with_fetch_concurrency(n);
        self
    }

    pub fn strategies(&self) -> &Strategies {
        &self.strategies
    }

    /// Generate and store a README for `repo_url`
    #[instrument(skip(self, account), fields(account = %account))]
    pub async fn run(&self, repo_url: &str, account: &AccountId) -> Result<ReadmeResult> {
        self.run_stages(repo_url, account).await.map_err(|e| {
            error!("README generation failed: {}", e);
            GitWriterError::pipeline("generate README", e)
        })
    }

    async fn run_stages(&self, repo_url: &str, account: &AccountId) -> Result<ReadmeResult> {
        let token = self.credentials.access_token(account)?;
        debug!("Resolved access token for account {}", account);

        let files = self.reader.read(repo_url, &token).await?;
        info!(
            "Reader produced {} ({} files)",
            if files.is_failed() { "a failure record" } else { "files" },
            files.len()
        );

        let summary = extract(self.strategies.extractor.as_ref(), files, &self.budget).await?;
        info!(
            "Extracted {} features, {} technologies",
            summary.features.len(),
            summary.tech_stack.len()
        );
        debug!(?summary, "Feature summary");

        let result = self.strategies.synthesizer.synthesize(summary).await;
        if result.is_empty() {
            return Err(GitWriterError::pipeline(
                "synthesize README",
                "no content returned",
            ));
        }
        info!("Synthesized README ({} chars)", result.readme.len());

        self.results
            .upsert_readme(repo_url, account, &result.readme)?;
        Ok(result)
    }
}

//! CLI Common Utilities
//!
//! Shared resource setup for command handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::ai::preflight::PreflightCheck;
use crate::ai::provider::create_provider;
use crate::ai::timeout::TimeoutConfig;
use crate::config::{Config, ConfigLoader};
use crate::github::{GitHubClient, SharedRepositoryApi};
use crate::pipeline::{CommitBack, ReadmePipeline, Strategies};
use crate::storage::{Database, SharedDatabase};
use crate::types::Result;

/// Command execution context
///
/// Holds the loaded configuration, the opened database and the GitHub
/// client. Created via `CommandContext::load()`.
#[derive(Clone)]
pub struct CommandContext {
    pub config: Config,
    pub db: SharedDatabase,
    pub api: SharedRepositoryApi,
}

impl CommandContext {
    /// Load config, open the database and build the GitHub client
    pub fn load() -> Result<Self> {
        let config = ConfigLoader::load()?;
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self> {
        let db_path = ConfigLoader::database_path(&config)?;
        tracing::debug!("Opening database at {}", db_path.display());
        let db = Database::open(&db_path)?;
        let timeouts = TimeoutConfig::from_config(&config);
        let api = GitHubClient::new(&config.github, timeouts.github_request)?;

        Ok(Self {
            config,
            db: Arc::new(db),
            api: Arc::new(api),
        })
    }

    /// Build the strategies once, probing the provider first if configured
    pub async fn strategies(&self) -> Result<Strategies> {
        let llm = &self.config.llm;
        let provider = create_provider(llm)?;
        let timeout = TimeoutConfig::from_config(&self.config).llm_request;

        if llm.preflight {
            let check = PreflightCheck::new(Duration::from_secs(llm.timeout_secs.min(10)));
            check.check_budget(&self.config.budget);
            Ok(Strategies::from_provider_checked(provider, timeout, llm.temperature, &check).await)
        } else {
            Ok(Strategies::from_provider(provider, timeout, llm.temperature))
        }
    }

    pub async fn pipeline(&self) -> Result<ReadmePipeline> {
        let strategies = self.strategies().await?;
        Ok(ReadmePipeline::new(
            self.api.clone(),
            self.db.clone(),
            self.db.clone(),
            strategies,
            self.config.budget,
        )
        .with_fetch_concurrency(self.config.github.fetch_concurrency))
    }

    pub fn commit_back(&self) -> CommitBack {
        CommitBack::new(self.api.clone(), self.db.clone())
            .with_message(self.config.github.commit_message.clone())
    }
}

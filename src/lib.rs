//! GitWriter - README Generator for GitHub Repositories
//!
//! Reads a repository through the GitHub API, derives a feature and
//! technology summary, renders a README, and can commit it back.
//!
//! ## Pipeline
//!
//! ```text
//! Repository Reader → Feature Extractor → README Synthesizer → store
//! ```
//!
//! Each stage has an LLM-backed and a heuristic strategy. Without a
//! configured LLM the heuristic strategies run end to end.
//!
//! ## Quick Start
//!
//! ```ignore
//! use gitwriter::{Config, Database, GitHubClient, ReadmePipeline, Strategies, TimeoutConfig};
//!
//! let config = Config::default();
//! let db = Arc::new(Database::open("gitwriter.db")?);
//! let timeouts = TimeoutConfig::from_config(&config);
//! let api = Arc::new(GitHubClient::new(&config.github, timeouts.github_request)?);
//! let pipeline = ReadmePipeline::new(api, db.clone(), db, Strategies::heuristic(), config.budget);
//! let result = pipeline.run("https://github.com/owner/repo", &"42".into()).await?;
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: LLM provider abstraction, token estimation, response parsing
//! - [`github`]: hosted repository API trait and GitHub client
//! - [`pipeline`]: reader, extractor, synthesizer, orchestrator, commit-back
//! - [`storage`]: SQLite persistence with connection pooling
//! - [`config`]: layered configuration

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod github;
pub mod pipeline;
pub mod storage;
pub mod types;

#[cfg(test)]
mod testing;

// =============================================================================
// Core Re-exports
// =============================================================================

pub use config::{BudgetConfig, Config, ConfigLoader};
pub use types::error::{ErrorCategory, GitWriterError, Result, ResultExt};
pub use types::{AccountId, FeatureSummary, ReadmeResult, RepoFile, RepoFiles};

pub use storage::{Database, MemoryStore, SharedDatabase};

pub use github::{GitHubClient, RepositoryApi, SharedRepositoryApi};

pub use pipeline::{CommitBack, CommitOutcome, ReadmePipeline, Strategies};

pub use ai::{LlmProvider, OpenAiProvider, SharedProvider, TimeoutConfig, create_provider};

//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global and project (.gitwriter/) level configuration.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ai::provider::{PROVIDER_NONE, PROVIDER_OPENAI};
use crate::constants::{budget, github, llm, network};
use crate::types::{GitWriterError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Hosted repository API settings
    pub github: GitHubConfig,

    /// LLM provider settings
    pub llm: LlmConfig,

    /// Token and file budgets
    pub budget: BudgetConfig,

    /// Account and README history storage
    pub storage: StorageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            github: GitHubConfig::default(),
            llm: LlmConfig::default(),
            budget: BudgetConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `GitWriterError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if let Some(temperature) = self.llm.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(GitWriterError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                temperature
            )));
        }

        if ![PROVIDER_OPENAI, PROVIDER_NONE].contains(&self.llm.provider.as_str()) {
            return Err(GitWriterError::Config(format!(
                "Unknown LLM provider: {}. Supported: {}, {}",
                self.llm.provider, PROVIDER_OPENAI, PROVIDER_NONE
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(GitWriterError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.github.timeout_secs == 0 {
            return Err(GitWriterError::Config(
                "GitHub timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.github.fetch_concurrency == 0 {
            return Err(GitWriterError::Config(
                "GitHub fetch_concurrency must be greater than 0".to_string(),
            ));
        }

        validate_endpoint("github.api_base", &self.github.api_base)?;
        validate_endpoint("llm.api_base", &self.llm.api_base)?;

        self.budget.validate()
    }
}

/// Endpoints must be absolute http(s) URLs
fn validate_endpoint(field: &str, endpoint: &str) -> Result<()> {
    let url = url::Url::parse(endpoint).map_err(|e| {
        GitWriterError::Config(format!("Invalid {} URL '{}': {}", field, endpoint, e))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(GitWriterError::Config(format!(
            "{} must use http or https scheme, got: {}",
            field,
            url.scheme()
        )));
    }

    Ok(())
}

// =============================================================================
// GitHub Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// API base URL (GitHub Enterprise installs use their own)
    pub api_base: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Retries for transient failures
    pub max_retries: usize,

    /// Commit message used when writing README.md back
    pub commit_message: String,

    /// In-flight content fetches while reading a repository
    pub fetch_concurrency: usize,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: github::DEFAULT_API_BASE.to_string(),
            timeout_secs: network::DEFAULT_GITHUB_TIMEOUT_SECS,
            max_retries: network::MAX_NETWORK_RETRIES,
            commit_message: github::COMMIT_MESSAGE.to_string(),
            fetch_concurrency: github::DEFAULT_FETCH_CONCURRENCY,
        }
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

/// LLM provider configuration
///
/// The API key is never serialized to output and is redacted in debug
/// output. It is converted to `SecretString` before reaching a provider.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider type: "openai" or "none"
    pub provider: String,

    /// Model name
    pub model: String,

    /// API base URL
    pub api_base: String,

    /// API key (falls back to OPENAI_API_KEY)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Overrides the per-stage temperatures (0.3 extraction, 0.4 synthesis)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum tokens to generate
    pub max_tokens: usize,

    /// Probe the provider at startup and fall back to heuristics if unreachable
    pub preflight: bool,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_tokens", &self.max_tokens)
            .field("preflight", &self.preflight)
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: PROVIDER_OPENAI.to_string(),
            model: llm::DEFAULT_MODEL.to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: None,
            temperature: None,
            timeout_secs: network::DEFAULT_LLM_TIMEOUT_SECS,
            max_tokens: llm::DEFAULT_MAX_TOKENS,
            preflight: false,
        }
    }
}

impl LlmConfig {
    /// Configured key, else `OPENAI_API_KEY`; blank values count as absent
    pub fn resolve_api_key(&self) -> Option<SecretString> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
            .map(SecretString::from)
    }
}

// =============================================================================
// Budget Configuration
// =============================================================================

/// Token and file ceilings for reading and extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Characters kept per file before extraction
    pub max_file_chars: usize,
    /// Aggregate estimate above which extraction keeps only the first files
    pub extraction_token_ceiling: usize,
    /// Files kept once the extraction ceiling is exceeded
    pub extraction_file_cap: usize,
    /// Aggregate estimate at which the reader stops admitting files
    pub reader_token_ceiling: usize,
    /// Tree entries fetched at most
    pub reader_file_cap: usize,
    /// Largest blob fetched, in bytes
    pub max_blob_bytes: u64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_file_chars: budget::MAX_FILE_CHARS,
            extraction_token_ceiling: budget::EXTRACTION_TOKEN_CEILING,
            extraction_file_cap: budget::EXTRACTION_FILE_CAP,
            reader_token_ceiling: budget::READER_TOKEN_CEILING,
            reader_file_cap: budget::READER_FILE_CAP,
            max_blob_bytes: budget::MAX_BLOB_BYTES,
        }
    }
}

impl BudgetConfig {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("max_file_chars", self.max_file_chars),
            ("extraction_token_ceiling", self.extraction_token_ceiling),
            ("extraction_file_cap", self.extraction_file_cap),
            ("reader_token_ceiling", self.reader_token_ceiling),
            ("reader_file_cap", self.reader_file_cap),
        ];

        if let Some((name, _)) = fields.iter().find(|(_, value)| *value == 0) {
            return Err(GitWriterError::Config(format!(
                "Budget {} must be greater than 0",
                name
            )));
        }

        if self.max_blob_bytes == 0 {
            return Err(GitWriterError::Config(
                "Budget max_blob_bytes must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Storage Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database path; defaults to the user data directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
}

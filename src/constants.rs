//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Token and file budgets applied while reading and analyzing a repository
pub mod budget {
    /// Characters per estimated token
    pub const CHARS_PER_TOKEN: usize = 4;

    /// Maximum characters kept per file before extraction
    pub const MAX_FILE_CHARS: usize = 2000;

    /// Marker appended to content cut at `MAX_FILE_CHARS`
    pub const TRUNCATION_MARKER: &str = "\n\n... [Content truncated for brevity]";

    /// Aggregate estimated tokens above which extraction keeps only the first files
    pub const EXTRACTION_TOKEN_CEILING: usize = 6000;

    /// Files kept by extraction once the ceiling is exceeded
    pub const EXTRACTION_FILE_CAP: usize = 10;

    /// Aggregate estimated tokens the reader admits before stopping
    pub const READER_TOKEN_CEILING: usize = 5000;

    /// Tree entries the reader will fetch at most
    pub const READER_FILE_CAP: usize = 50;

    /// Blobs larger than this are never fetched (100 KiB)
    pub const MAX_BLOB_BYTES: u64 = 100 * 1024;
}

/// LLM generation constants
pub mod llm {
    /// Default model for the OpenAI provider
    pub const DEFAULT_MODEL: &str = "gpt-4";

    /// Temperature used for feature extraction
    pub const EXTRACTION_TEMPERATURE: f32 = 0.3;

    /// Temperature used for README synthesis
    pub const SYNTHESIS_TEMPERATURE: f32 = 0.4;

    /// Default maximum tokens to generate
    pub const DEFAULT_MAX_TOKENS: usize = 2048;
}

/// GitHub API constants
pub mod github {
    /// Public API base URL
    pub const DEFAULT_API_BASE: &str = "https://api.github.com";

    /// Branch used when the repository reports none
    pub const FALLBACK_BRANCH: &str = "main";

    /// File written by the commit-back flow
    pub const README_PATH: &str = "README.md";

    /// Commit message used by the commit-back flow
    pub const COMMIT_MESSAGE: &str = "README.md added via GitWriter";

    /// Sequential per-file fetches by default
    pub const DEFAULT_FETCH_CONCURRENCY: usize = 1;
}

/// Account constants
pub mod account {
    /// Credits granted to a newly registered account
    pub const INITIAL_CREDITS: i64 = 5;
}

/// HTTP/Network constants
pub mod network {
    /// Default LLM request timeout (seconds)
    pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;

    /// Default GitHub request timeout (seconds)
    pub const DEFAULT_GITHUB_TIMEOUT_SECS: u64 = 30;

    /// Maximum retries for transient network failures
    pub const MAX_NETWORK_RETRIES: usize = 2;

    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 500;

    /// User agent sent with every request
    pub const USER_AGENT: &str = concat!("gitwriter/", env!("CARGO_PKG_VERSION"));
}

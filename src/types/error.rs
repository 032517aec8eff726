//! Unified Error Type System
//!
//! Centralized error types for the whole crate.
//!
//! ## Error Categories
//!
//! - **Network**: Connectivity issues and timeouts (retry with backoff)
//! - **RateLimit**: API rate limiting (wait and retry)
//! - **Transient**: Temporary server issues (retry)
//! - **Auth**: Authentication or permission failures (fail fast)
//! - **NotFound**: Missing repository, path or branch (fail fast)
//! - **BadRequest**: Malformed request (fail fast)
//!
//! ## Propagation
//!
//! Stage-level degradation happens in the pipeline modules. Only the
//! variants that survive to the orchestrator boundary are user visible:
//! `Credential`, `PersistenceFailure` and `Pipeline`.

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories used for retry decisions against external services
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited - wait then retry
    RateLimit,
    /// Authentication or permission failure - do not retry
    Auth,
    /// Resource does not exist - do not retry
    NotFound,
    /// Network/connectivity issues - retry with backoff
    Network,
    /// Invalid request - do not retry
    BadRequest,
    /// Temporary server issues - retry
    Transient,
    /// Unknown error - do not retry
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Network => write!(f, "NETWORK"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl ErrorCategory {
    /// Check if this category is worth retrying against the same service
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimit | Self::Network | Self::Transient)
    }

    /// Classify an HTTP status code
    pub fn from_status(status: u16) -> Self {
        match status {
            429 => Self::RateLimit,
            401 | 403 => Self::Auth,
            404 => Self::NotFound,
            400 | 409 | 422 => Self::BadRequest,
            500 | 502 | 503 | 504 => Self::Transient,
            _ => Self::Unknown,
        }
    }

    /// Classify a transport-level reqwest error (no HTTP status received)
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_status(status.as_u16());
        }
        if err.is_timeout() || err.is_connect() || err.is_request() {
            Self::Network
        } else if err.is_decode() {
            Self::BadRequest
        } else {
            Self::Unknown
        }
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum GitWriterError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Pipeline taxonomy
    // -------------------------------------------------------------------------
    /// Malformed repository URL or missing arguments; raised before any network call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Transport or HTTP failure talking to an external service
    #[error("{service} unavailable [{category}]: {message}")]
    UpstreamUnavailable {
        service: String,
        category: ErrorCategory,
        message: String,
    },

    /// Zero files discovered, or zero files survived filtering
    #[error("Not found: {0}")]
    NotFound(String),

    /// LLM response was not well-formed JSON
    #[error("Parse failure: {0}")]
    ParseFailure(String),

    /// Result store write or read failed
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    // -------------------------------------------------------------------------
    // Boundary Errors
    // -------------------------------------------------------------------------
    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Failed to extract features: {0}")]
    Extraction(String),

    #[error("Failed to {stage}: {message}")]
    Pipeline { stage: String, message: String },

    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, GitWriterError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl GitWriterError {
    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create an upstream error with an explicit category
    pub fn upstream(
        service: impl Into<String>,
        category: ErrorCategory,
        message: impl Into<String>,
    ) -> Self {
        Self::UpstreamUnavailable {
            service: service.into(),
            category,
            message: message.into(),
        }
    }

    /// Create an upstream error from an HTTP status code
    pub fn http_status(service: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::upstream(service, ErrorCategory::from_status(status), message)
    }

    /// Wrap an error as a hard stop in the named pipeline stage, keeping its message
    pub fn pipeline(stage: impl Into<String>, source: impl std::fmt::Display) -> Self {
        Self::Pipeline {
            stage: stage.into(),
            message: source.to_string(),
        }
    }

    /// Category of an upstream failure, if this is one
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            Self::UpstreamUnavailable { category, .. } => Some(*category),
            Self::Timeout { .. } => Some(ErrorCategory::Network),
            _ => None,
        }
    }

    /// Check if this error can be retried
    pub fn is_retryable(&self) -> bool {
        self.category().is_some_and(|c| c.is_retryable())
    }
}

/// Context extension trait for mapping foreign errors into persistence failures
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> Result<T>;

    /// Add context using a closure (lazy evaluation)
    fn with_context_fn<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: std::error::Error + Send + Sync + 'static> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> Result<T> {
        self.map_err(|e| GitWriterError::PersistenceFailure(format!("{}: {}", context.into(), e)))
    }

    fn with_context_fn<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| GitWriterError::PersistenceFailure(format!("{}: {}", f().into(), e)))
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Timeout Configuration
//!
//! Every external call (hosted repository API, LLM service) runs under a
//! deadline. A timeout surfaces as `GitWriterError::Timeout` and is handled
//! exactly like any other failure at that call site.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::ai::timeout::{TimeoutConfig, with_timeout};
//!
//! let config = TimeoutConfig::default();
//! let text = with_timeout(config.llm_request, provider.complete(&prompt), "LLM request").await?;
//! ```

use std::future::Future;
use std::time::Duration;

use crate::config::Config;
use crate::constants::network as net_constants;
use crate::types::{GitWriterError, Result};

/// Deadlines for external calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// LLM completion request (default: 2 minutes)
    pub llm_request: Duration,
    /// Single hosted repository API request (default: 30 seconds)
    pub github_request: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            llm_request: Duration::from_secs(net_constants::DEFAULT_LLM_TIMEOUT_SECS),
            github_request: Duration::from_secs(net_constants::DEFAULT_GITHUB_TIMEOUT_SECS),
        }
    }
}

impl TimeoutConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            llm_request: Duration::from_secs(config.llm.timeout_secs),
            github_request: Duration::from_secs(config.github.timeout_secs),
        }
    }
}

/// Execute an async operation with a timeout
///
/// Returns `GitWriterError::Timeout` if the operation doesn't complete in time.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(GitWriterError::timeout(operation_name, timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_config_defaults() {
        let config = TimeoutConfig::default();
        assert_eq!(config.llm_request.as_secs(), 120);
        assert_eq!(config.github_request.as_secs(), 30);
    }

    #[test]
    fn test_timeout_config_from_config() {
        let mut config = Config::default();
        config.llm.timeout_secs = 7;
        config.github.timeout_secs = 3;
        let timeouts = TimeoutConfig::from_config(&config);
        assert_eq!(timeouts.llm_request, Duration::from_secs(7));
        assert_eq!(timeouts.github_request, Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_with_timeout_success() {
        let result = with_timeout(
            Duration::from_secs(1),
            async { Ok::<_, GitWriterError>(42) },
            "test operation",
        )
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result = with_timeout(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, GitWriterError>(42)
            },
            "slow operation",
        )
        .await;
        let err = result.unwrap_err();
        assert!(matches!(err, GitWriterError::Timeout { .. }));
        assert!(err.is_retryable());
    }
}

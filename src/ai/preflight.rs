//! Pre-flight Validation Checks
//!
//! Validates the LLM backend and budget settings once at startup, before
//! any repository is processed.
//!
//! ## Checks
//!
//! - LLM provider reachability (a failure downgrades to heuristic strategies)
//! - Budget consistency between reader and extraction ceilings

use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::ai::provider::LlmProvider;
use crate::ai::timeout::with_timeout;
use crate::config::BudgetConfig;

/// Pre-flight check results
#[derive(Debug, Clone, Default)]
pub struct PreflightResult {
    /// All blocking checks passed
    pub passed: bool,
    pub checks: Vec<CheckResult>,
    /// Warnings (non-blocking)
    pub warnings: Vec<String>,
}

impl PreflightResult {
    pub fn new() -> Self {
        Self {
            passed: true,
            ..Self::default()
        }
    }

    fn add_check(&mut self, check: CheckResult) {
        if !check.passed {
            self.passed = false;
        }
        self.checks.push(check);
    }

    fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Messages of failed checks
    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.message.as_str())
    }
}

/// Individual check result
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub message: String,
    pub duration_ms: u64,
}

/// Pre-flight validation checker
#[derive(Debug, Clone)]
pub struct PreflightCheck {
    health_timeout: Duration,
}

impl Default for PreflightCheck {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

impl PreflightCheck {
    pub fn new(health_timeout: Duration) -> Self {
        Self { health_timeout }
    }

    /// Check that the configured provider answers its health probe
    pub async fn check_provider(&self, provider: &dyn LlmProvider) -> PreflightResult {
        let mut result = PreflightResult::new();
        self.check_provider_health(provider, &mut result).await;
        result
    }

    /// Check that budget settings are mutually consistent
    pub fn check_budget(&self, budget: &BudgetConfig) -> PreflightResult {
        let mut result = PreflightResult::new();
        let start = Instant::now();

        if budget.reader_token_ceiling > budget.extraction_token_ceiling {
            result.add_warning(format!(
                "Reader ceiling ({}) exceeds extraction ceiling ({}); extraction will fall back to the first {} files more often",
                budget.reader_token_ceiling,
                budget.extraction_token_ceiling,
                budget.extraction_file_cap
            ));
        }

        if budget.extraction_file_cap > budget.reader_file_cap {
            result.add_warning(format!(
                "Extraction file cap ({}) exceeds reader file cap ({}) and never applies",
                budget.extraction_file_cap, budget.reader_file_cap
            ));
        }

        result.add_check(CheckResult {
            name: "budget".to_string(),
            passed: true,
            message: format!(
                "Budgets: reader {} tokens / {} files, extraction {} tokens / {} files",
                budget.reader_token_ceiling,
                budget.reader_file_cap,
                budget.extraction_token_ceiling,
                budget.extraction_file_cap
            ),
            duration_ms: start.elapsed().as_millis() as u64,
        });

        for warning in &result.warnings {
            warn!("{}", warning);
        }

        result
    }

    async fn check_provider_health(&self, provider: &dyn LlmProvider, result: &mut PreflightResult) {
        let start = Instant::now();
        let name = format!("provider_health_{}", provider.name());

        let outcome = with_timeout(
            self.health_timeout,
            provider.health_check(),
            "provider health check",
        )
        .await;

        let (passed, message) = match outcome {
            Ok(true) => (true, format!("Provider '{}' is healthy", provider.name())),
            Ok(false) => (
                false,
                format!(
                    "Provider '{}' health check returned false; check API credentials or network connectivity",
                    provider.name()
                ),
            ),
            Err(e) => (
                false,
                format!("Provider '{}' health check failed: {}", provider.name(), e),
            ),
        };

        if passed {
            info!("{}", message);
        } else {
            warn!("{}", message);
        }

        result.add_check(CheckResult {
            name,
            passed,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::LlmResponse;
    use crate::types::Result;
    use async_trait::async_trait;

    struct FixedHealth(Option<bool>);

    #[async_trait]
    impl LlmProvider for FixedHealth {
        async fn complete(&self, _prompt: &str, _temperature: f32) -> Result<LlmResponse> {
            Ok(LlmResponse::content_only(""))
        }

        fn name(&self) -> &str {
            "fixed"
        }

        fn model(&self) -> &str {
            "fixed-1"
        }

        async fn health_check(&self) -> Result<bool> {
            match self.0 {
                Some(healthy) => Ok(healthy),
                None => {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(true)
                }
            }
        }
    }

    #[tokio::test]
    async fn test_healthy_provider_passes() {
        let result = PreflightCheck::default()
            .check_provider(&FixedHealth(Some(true)))
            .await;
        assert!(result.passed);
        assert_eq!(result.checks[0].name, "provider_health_fixed");
    }

    #[tokio::test]
    async fn test_unhealthy_provider_fails() {
        let result = PreflightCheck::default()
            .check_provider(&FixedHealth(Some(false)))
            .await;
        assert!(!result.passed);
        assert_eq!(result.errors().count(), 1);
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let check = PreflightCheck::new(Duration::from_millis(20));
        let result = check.check_provider(&FixedHealth(None)).await;
        assert!(!result.passed);
        assert!(result.errors().next().unwrap().contains("Timeout"));
    }

    #[test]
    fn test_budget_defaults_are_consistent() {
        let result = PreflightCheck::default().check_budget(&BudgetConfig::default());
        assert!(result.passed);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_budget_warns_on_unreachable_cap() {
        let budget = BudgetConfig {
            extraction_file_cap: 100,
            ..BudgetConfig::default()
        };
        let result = PreflightCheck::default().check_budget(&budget);
        assert_eq!(result.warnings.len(), 1);
    }
}

//! Feature Extraction
//!
//! Turns repository files into a `FeatureSummary`.
//!
//! ## Strategies
//! - `HeuristicExtractor`: path and manifest rules, no network
//! - `LlmExtractor`: one analysis request, JSON response
//!
//! ## Stage contract (`extract`)
//! - A failed read yields the fixed "Repository access failed" summary
//! - Files are selected, truncated, and capped by the token ceiling
//! - An unparseable LLM response yields a fixed degraded summary
//! - Only a failed LLM call raises, as `GitWriterError::Extraction`

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::prompts::extraction_prompt;
use super::selector::{FileSelector, apply_token_ceiling};
use crate::ai::provider::SharedProvider;
use crate::ai::timeout::with_timeout;
use crate::ai::validation::parse_json_response;
use crate::config::BudgetConfig;
use crate::constants::llm::EXTRACTION_TEMPERATURE;
use crate::types::{FeatureSummary, GitWriterError, RepoFile, RepoFiles, Result};

/// Summary returned when the repository could not be read
pub fn access_failed_summary(reason: &str) -> FeatureSummary {
    FeatureSummary::new(
        vec!["Repository access failed".to_string()],
        vec!["Unknown".to_string()],
        reason,
    )
}

/// Summary returned when the LLM response is not usable JSON
pub fn parse_failed_summary() -> FeatureSummary {
    FeatureSummary::new(
        vec!["Feature extraction failed - repository analysis incomplete".to_string()],
        vec!["Technology stack could not be determined".to_string()],
        "Unable to generate summary due to parsing error",
    )
}

/// A feature extraction strategy over already-selected files
#[async_trait]
pub trait FeatureExtractor: Send + Sync {
    async fn analyze(&self, files: &[RepoFile]) -> Result<FeatureSummary>;

    /// Strategy name for logging
    fn name(&self) -> &'static str;
}

/// Run the extraction stage with the given strategy
pub async fn extract(
    strategy: &dyn FeatureExtractor,
    files: RepoFiles,
    budget: &BudgetConfig,
) -> Result<FeatureSummary> {
    let files = match files {
        RepoFiles::Failed(reason) => {
            info!("Repository read failed, returning access-failure summary");
            return Ok(access_failed_summary(&reason));
        }
        RepoFiles::Fetched(files) => files,
    };

    let selected = FileSelector::new(budget.max_file_chars).select(files);
    let selected = apply_token_ceiling(
        selected,
        budget.extraction_token_ceiling,
        budget.extraction_file_cap,
    );

    info!(
        "Extracting features from {} files with {} strategy",
        selected.len(),
        strategy.name()
    );
    strategy.analyze(&selected).await
}

// =============================================================================
// Heuristic Strategy
// =============================================================================

/// Dependency name fragments and the framework label each implies
const DEPENDENCY_LABELS: &[(&str, &str)] = &[
    ("express", "Express.js"),
    ("react", "React"),
    ("vue", "Vue.js"),
    ("angular", "Angular"),
    ("axios", "Axios"),
    ("mongoose", "MongoDB"),
    ("prisma", "Prisma"),
];

/// Path fragments and the runtime label each implies
const RUNTIME_MARKERS: &[(&[&str], &str)] = &[
    (&["requirements.txt", "pyproject.toml"], "Python"),
    (&["pom.xml", "build.gradle"], "Java"),
    (&["Cargo.toml"], "Rust"),
    (&["go.mod"], "Go"),
];

/// Path fragments and the feature label each implies
const FEATURE_MARKERS: &[(&[&str], &str)] = &[
    (&["Dockerfile"], "Docker containerization"),
    (&["docker-compose"], "Multi-container deployment"),
    (&["test", "spec"], "Testing framework"),
    (&["api", "routes"], "REST API"),
    (&["auth", "login"], "Authentication system"),
];

const DEFAULT_FEATURE: &str = "Web application";
const DEFAULT_TECH: &str = "JavaScript";

/// Rule-based extractor; deterministic and offline
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicExtractor;

impl HeuristicExtractor {
    /// Framework labels from a package.json `dependencies` object, in key order
    fn package_frameworks(content: &str) -> Vec<String> {
        let Ok(manifest) = serde_json::from_str::<Value>(content) else {
            debug!("Ignoring unparseable package.json");
            return Vec::new();
        };
        let Some(dependencies) = manifest.get("dependencies").and_then(Value::as_object) else {
            return Vec::new();
        };

        let mut labels = Vec::new();
        for name in dependencies.keys() {
            for (fragment, label) in DEPENDENCY_LABELS {
                if name.contains(fragment) {
                    labels.push(label.to_string());
                }
            }
        }
        labels
    }

    /// Apply every rule to the files, in file order
    pub fn summarize(files: &[RepoFile]) -> FeatureSummary {
        let mut features = Vec::new();
        let mut tech_stack = Vec::new();

        for file in files {
            let path = file.path.as_str();

            if path.contains("package.json") {
                tech_stack.push("Node.js".to_string());
                tech_stack.extend(Self::package_frameworks(&file.content));
            }

            for (markers, label) in RUNTIME_MARKERS {
                if markers.iter().any(|m| path.contains(m)) {
                    tech_stack.push(label.to_string());
                }
            }

            for (markers, label) in FEATURE_MARKERS {
                if markers.iter().any(|m| path.contains(m)) {
                    features.push(label.to_string());
                }
            }
        }

        let mut summary = FeatureSummary::new(features, tech_stack, String::new());
        if summary.features.is_empty() {
            summary.features.push(DEFAULT_FEATURE.to_string());
        }
        if summary.tech_stack.is_empty() {
            summary.tech_stack.push(DEFAULT_TECH.to_string());
        }

        summary.summary = format!(
            "A {} project with {} capabilities.",
            summary.tech_stack.join(", "),
            summary.features.join(", ").to_lowercase()
        );
        summary
    }
}

#[async_trait]
impl FeatureExtractor for HeuristicExtractor {
    async fn analyze(&self, files: &[RepoFile]) -> Result<FeatureSummary> {
        Ok(Self::summarize(files))
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

// =============================================================================
// LLM Strategy
// =============================================================================

/// Extractor backed by an LLM completion
pub struct LlmExtractor {
    provider: SharedProvider,
    timeout: Duration,
    temperature: f32,
}

impl LlmExtractor {
    pub fn new(provider: SharedProvider, timeout: Duration) -> Self {
        Self {
            provider,
            timeout,
            temperature: EXTRACTION_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl FeatureExtractor for LlmExtractor {
    async fn analyze(&self, files: &[RepoFile]) -> Result<FeatureSummary> {
        let prompt = extraction_prompt(files);
        debug!("Extraction prompt: {} chars", prompt.len());

        let response = with_timeout(
            self.timeout,
            self.provider.complete(&prompt, self.temperature),
            "feature extraction",
        )
        .await
        .map_err(|e| GitWriterError::Extraction(e.to_string()))?;

        match parse_json_response::<FeatureSummary>(&response.content) {
            Ok(parsed) => {
                let summary =
                    FeatureSummary::new(parsed.features, parsed.tech_stack, parsed.summary);
                if summary.is_well_formed() {
                    Ok(summary)
                } else {
                    warn!("LLM summary is missing fields, filling defaults");
                    Ok(summary.normalized())
                }
            }
            Err(e) => {
                warn!("Failed to parse extraction response: {}", e);
                Ok(parse_failed_summary())
            }
        }
    }

    fn name(&self) -> &'static str {
        "llm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;
    use std::sync::Arc;

    fn file(path: &str, content: &str) -> RepoFile {
        RepoFile::new(path, content)
    }

    fn fetched(files: Vec<RepoFile>) -> RepoFiles {
        RepoFiles::fetched(files).unwrap()
    }

    #[tokio::test]
    async fn test_failed_read_returns_access_failure() {
        let failed = RepoFiles::failed("Invalid GitHub repo URL");
        let reason = match &failed {
            RepoFiles::Failed(reason) => reason.clone(),
            RepoFiles::Fetched(_) => unreachable!(),
        };

        let summary = extract(&HeuristicExtractor, failed, &BudgetConfig::default())
            .await
            .unwrap();
        assert_eq!(summary.features, vec!["Repository access failed"]);
        assert_eq!(summary.tech_stack, vec!["Unknown"]);
        assert_eq!(summary.summary, reason);
    }

    #[tokio::test]
    async fn test_failed_read_skips_llm() {
        let provider = Arc::new(ScriptedProvider::replying("{}"));
        let strategy = LlmExtractor::new(provider.clone(), Duration::from_secs(1));
        extract(&strategy, RepoFiles::failed("boom"), &BudgetConfig::default())
            .await
            .unwrap();
        assert!(provider.prompts().is_empty());
    }

    #[test]
    fn test_package_json_frameworks() {
        let files = vec![file(
            "package.json",
            r#"{"dependencies":{"express":"4.0.0"}}"#,
        )];
        let summary = HeuristicExtractor::summarize(&files);
        assert!(summary.tech_stack.contains(&"Node.js".to_string()));
        assert!(summary.tech_stack.contains(&"Express.js".to_string()));
    }

    #[test]
    fn test_dockerfile_feature() {
        let summary = HeuristicExtractor::summarize(&[file("Dockerfile", "FROM node")]);
        assert!(summary.features.contains(&"Docker containerization".to_string()));
    }

    #[test]
    fn test_heuristic_defaults_and_summary() {
        let summary = HeuristicExtractor::summarize(&[file("README.md", "# hi")]);
        assert_eq!(summary.features, vec!["Web application"]);
        assert_eq!(summary.tech_stack, vec!["JavaScript"]);
        assert_eq!(
            summary.summary,
            "A JavaScript project with web application capabilities."
        );
    }

    #[test]
    fn test_heuristic_dedups_in_first_seen_order() {
        let files = vec![
            file("Cargo.toml", "[package]"),
            file("tests/api_test.rs", ""),
            file("crates/core/Cargo.toml", "[package]"),
            file("src/auth/login.rs", ""),
            file("src/routes.rs", ""),
            file("package.json", "{not json"),
        ];
        let summary = HeuristicExtractor::summarize(&files);
        assert_eq!(summary.tech_stack, vec!["Rust", "Node.js"]);
        assert_eq!(
            summary.features,
            vec!["Testing framework", "REST API", "Authentication system"]
        );
        assert_eq!(
            summary.summary,
            "A Rust, Node.js project with testing framework, rest api, authentication system capabilities."
        );
    }

    #[test]
    fn test_heuristic_is_idempotent() {
        let files = vec![
            file("package.json", r#"{"dependencies":{"react":"18","axios":"1","vue":"3"}}"#),
            file("docker-compose.yml", ""),
            file("spec/app_spec.rb", ""),
        ];
        let first = HeuristicExtractor::summarize(&files);
        let second = HeuristicExtractor::summarize(&files);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_extract_applies_selection_budget() {
        // 13 files at 500 tokens = 6500 > 6000, only the first 10 reach the strategy
        let files: Vec<RepoFile> = (0..13)
            .map(|i| file(&format!("src/m{i:02}.rs"), &"a".repeat(2000)))
            .collect();
        let provider = Arc::new(ScriptedProvider::replying(
            r#"{"features":["X"],"techStack":["Rust"],"summary":"s"}"#,
        ));
        let strategy = LlmExtractor::new(provider.clone(), Duration::from_secs(1));

        extract(&strategy, fetched(files), &BudgetConfig::default())
            .await
            .unwrap();

        let (prompt, temperature) = provider.prompts().remove(0);
        assert_eq!(temperature, EXTRACTION_TEMPERATURE);
        assert!(prompt.contains("### src/m09.rs"));
        assert!(!prompt.contains("### src/m10.rs"));
    }

    #[tokio::test]
    async fn test_llm_summary_is_deduplicated() {
        let provider = Arc::new(ScriptedProvider::replying(
            "```json\n{\"features\":[\"CLI\",\"CLI\"],\"techStack\":[\"Rust\"],\"summary\":\"A tool\"}\n```",
        ));
        let strategy = LlmExtractor::new(provider, Duration::from_secs(1));
        let summary = strategy.analyze(&[file("main.rs", "")]).await.unwrap();
        assert_eq!(summary.features, vec!["CLI"]);
        assert_eq!(summary.summary, "A tool");
    }

    #[tokio::test]
    async fn test_llm_parse_failure_degrades() {
        let provider = Arc::new(ScriptedProvider::replying("Sorry, I cannot help."));
        let strategy = LlmExtractor::new(provider, Duration::from_secs(1));
        let summary = strategy.analyze(&[file("main.rs", "")]).await.unwrap();
        assert_eq!(summary, parse_failed_summary());
        assert!(summary.is_well_formed());
    }

    #[tokio::test]
    async fn test_llm_partial_json_is_normalized() {
        let provider = Arc::new(ScriptedProvider::replying(r#"{"summary": "Only a summary"}"#));
        let strategy = LlmExtractor::new(provider, Duration::from_secs(1));
        let summary = strategy.analyze(&[file("main.rs", "")]).await.unwrap();
        assert!(summary.is_well_formed());
        assert_eq!(summary.summary, "Only a summary");
    }

    #[tokio::test]
    async fn test_llm_transport_failure_raises_extraction_error() {
        let provider = Arc::new(ScriptedProvider::failing());
        let strategy = LlmExtractor::new(provider, Duration::from_secs(1));
        let err = strategy.analyze(&[file("main.rs", "")]).await.unwrap_err();
        assert!(matches!(err, GitWriterError::Extraction(_)));
        assert!(err.to_string().starts_with("Failed to extract features:"));
    }
}

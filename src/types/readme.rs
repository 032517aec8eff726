//! Feature summary and README result types passed between pipeline stages

use serde::{Deserialize, Serialize};

/// Summary defaults used when a summary reaches synthesis without content
pub mod defaults {
    pub const SUMMARY: &str = "A software project with various features and technologies.";
    pub const FEATURE: &str = "Feature list could not be determined";
    pub const TECH: &str = "Technology stack could not be determined";
}

/// Structured project summary produced by feature extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FeatureSummary {
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default, rename = "techStack", alias = "tech_stack")]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

impl FeatureSummary {
    /// Build a summary, deduplicating both lists in first-seen order
    pub fn new(features: Vec<String>, tech_stack: Vec<String>, summary: impl Into<String>) -> Self {
        Self {
            features: dedup_preserving_order(features),
            tech_stack: dedup_preserving_order(tech_stack),
            summary: summary.into(),
        }
    }

    /// Replace blank or empty fields with non-empty defaults.
    ///
    /// Blank list entries are dropped before the emptiness check.
    pub fn normalized(self) -> Self {
        let features = non_blank(self.features);
        let tech_stack = non_blank(self.tech_stack);

        let features = if features.is_empty() {
            tracing::warn!("Missing or empty features, using default");
            vec![defaults::FEATURE.to_string()]
        } else {
            features
        };

        let tech_stack = if tech_stack.is_empty() {
            tracing::warn!("Missing or empty techStack, using default");
            vec![defaults::TECH.to_string()]
        } else {
            tech_stack
        };

        let summary = if self.summary.trim().is_empty() {
            tracing::warn!("Missing or invalid summary, using default");
            defaults::SUMMARY.to_string()
        } else {
            self.summary
        };

        Self::new(features, tech_stack, summary)
    }

    /// True when both lists and the summary carry content
    pub fn is_well_formed(&self) -> bool {
        !self.features.is_empty() && !self.tech_stack.is_empty() && !self.summary.trim().is_empty()
    }
}

/// Generated README document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadmeResult {
    pub readme: String,
}

impl ReadmeResult {
    pub fn new(readme: impl Into<String>) -> Self {
        Self {
            readme: readme.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.readme.trim().is_empty()
    }
}

/// Remove duplicates while keeping the first occurrence of each entry
pub fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

fn non_blank(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .filter(|item| !item.trim().is_empty())
        .collect()
}

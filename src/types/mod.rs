pub mod error;
pub mod readme;
pub mod repo;

pub use error::{ErrorCategory, GitWriterError, Result, ResultExt};
pub use readme::{FeatureSummary, ReadmeResult, dedup_preserving_order};
pub use repo::{
    EntryKind, RepoFile, RepoFiles, RepoInfo, RepoRef, RepoSummary, TreeEntry, path_extension,
};

// =============================================================================
// Domain Newtypes
// =============================================================================

use std::fmt;

/// Type-safe wrapper for account identifiers
///
/// Prevents accidental mixing of account IDs with other string types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

//! Repository Data Types
//!
//! Files read from a hosted repository and the metadata returned by the
//! repository API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single file read from a repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoFile {
    pub path: String,
    pub content: String,
}

impl RepoFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Base file name (last path segment)
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Extension including the leading dot, taken from the last `.` in the path
    pub fn extension(&self) -> Option<&str> {
        path_extension(&self.path)
    }
}

/// Extension including the leading dot, taken from the last `.` in the path
pub fn path_extension(path: &str) -> Option<&str> {
    path.rfind('.').map(|idx| &path[idx..])
}

/// Outcome of reading a repository.
///
/// `Fetched` always holds at least one file. Every failure after the
/// argument precondition check collapses into `Failed` so downstream
/// stages can take their degraded paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoFiles {
    Fetched(Vec<RepoFile>),
    Failed(String),
}

impl RepoFiles {
    /// Wrap a non-empty file list; `None` when the list is empty
    pub fn fetched(files: Vec<RepoFile>) -> Option<Self> {
        if files.is_empty() {
            None
        } else {
            Some(Self::Fetched(files))
        }
    }

    /// Build the failure record with the user-facing diagnostic
    pub fn failed(reason: impl fmt::Display) -> Self {
        Self::Failed(format!(
            "Failed to fetch repo files: {}. Please check your repository URL and access token.",
            reason
        ))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Number of files (zero for a failure)
    pub fn len(&self) -> usize {
        match self {
            Self::Fetched(files) => files.len(),
            Self::Failed(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Owner/name pair identifying a hosted repository
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Kind of a git tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
    Commit,
    #[serde(other)]
    Other,
}

/// One entry of a recursive tree listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Blob size in bytes (absent for trees and submodules)
    #[serde(default)]
    pub size: Option<u64>,
}

impl TreeEntry {
    pub fn blob(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Blob,
            size: Some(size),
        }
    }
}

/// Repository metadata needed for the commit-back flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoInfo {
    pub default_branch: String,
    pub can_push: bool,
}

/// A repository owned by or visible to the authenticated account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSummary {
    pub name: String,
    pub private: bool,
    pub html_url: String,
    pub description: Option<String>,
    pub updated_at: Option<String>,
}

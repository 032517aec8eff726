//! Hosted Repository API
//!
//! The `RepositoryApi` trait is the seam between the pipeline and GitHub.
//! `GitHubClient` implements it over the REST API; tests substitute
//! scripted fakes.

mod client;
mod repo_url;

pub use client::GitHubClient;
pub use repo_url::parse_repo_url;

use async_trait::async_trait;
use secrecy::SecretString;
use std::sync::Arc;

use crate::types::{RepoInfo, RepoRef, RepoSummary, Result, TreeEntry};

/// Request to create or update a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutContent {
    pub path: String,
    /// Raw file content; encoded for transport by the client
    pub content: String,
    pub message: String,
    pub branch: String,
    /// Blob revision of the file being replaced, `None` to create it
    pub prior_revision: Option<String>,
}

/// Operations the pipeline needs from a hosted repository service
#[async_trait]
pub trait RepositoryApi: Send + Sync {
    /// Recursive tree listing of `branch`, in tree order
    async fn list_tree(
        &self,
        repo: &RepoRef,
        branch: &str,
        token: &SecretString,
    ) -> Result<Vec<TreeEntry>>;

    /// Decoded text content of one file
    async fn get_content(&self, repo: &RepoRef, path: &str, token: &SecretString)
    -> Result<String>;

    /// Default branch and push permission
    async fn get_repo_info(&self, repo: &RepoRef, token: &SecretString) -> Result<RepoInfo>;

    /// Blob revision of a file, `None` if it does not exist
    async fn get_file_revision(
        &self,
        repo: &RepoRef,
        path: &str,
        branch: &str,
        token: &SecretString,
    ) -> Result<Option<String>>;

    /// Create or update a file; returns the resulting commit revision
    async fn put_content(
        &self,
        repo: &RepoRef,
        request: &PutContent,
        token: &SecretString,
    ) -> Result<String>;

    /// Repositories visible to the token's owner
    async fn list_user_repos(&self, token: &SecretString) -> Result<Vec<RepoSummary>>;
}

pub type SharedRepositoryApi = Arc<dyn RepositoryApi>;

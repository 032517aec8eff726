//! Repository Reader
//!
//! Fetches a repository's tree and file contents through `RepositoryApi`,
//! enforcing per-file and aggregate ceilings.
//!
//! ## Flow
//! 1. Validate arguments (URL shape, non-empty token). Violations raise.
//! 2. Resolve the default branch and list the recursive tree.
//! 3. Keep blobs under the size ceiling whose extension is not binary,
//!    capped at the first `reader_file_cap` in tree order.
//! 4. Fetch contents in tree order, skipping files that fail, and stop at
//!    the first file that would push the running estimate over the ceiling.
//!
//! Every failure after step 1 becomes `RepoFiles::Failed`.

use futures::StreamExt;
use futures::stream;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use crate::ai::tokenizer::{TokenBudget, estimate_tokens};
use crate::config::BudgetConfig;
use crate::constants::github::{DEFAULT_FETCH_CONCURRENCY, FALLBACK_BRANCH};
use crate::github::{SharedRepositoryApi, parse_repo_url};
use crate::types::{
    EntryKind, GitWriterError, RepoFile, RepoFiles, RepoRef, Result, TreeEntry, path_extension,
};

/// Image, font, media, archive and object-code extensions
const BINARY_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".bmp", ".ico", ".svg", ".woff", ".woff2", ".ttf", ".eot",
    ".otf", ".mp4", ".mp3", ".wav", ".avi", ".mov", ".zip", ".tar", ".gz", ".rar", ".exe", ".dll",
    ".so", ".dylib", ".bin", ".obj",
];

/// Reads a hosted repository into a bounded file list
#[derive(Clone)]
pub struct RepositoryReader {
    api: SharedRepositoryApi,
    budget: BudgetConfig,
    fetch_concurrency: usize,
}

impl RepositoryReader {
    pub fn new(api: SharedRepositoryApi, budget: BudgetConfig) -> Self {
        Self {
            api,
            budget,
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }

    /// Allow up to `n` content fetches in flight; output order and the
    /// early-stop point are unchanged.
    pub fn with_fetch_concurrency(mut self, n: usize) -> Self {
        self.fetch_concurrency = n.max(1);
        self
    }

    /// Read a repository.
    ///
    /// Raises `InvalidInput` for a blank token or a URL that is not a
    /// `host/owner/repo` shape; no network call is made in that case.
    /// Any later failure yields `RepoFiles::Failed`.
    pub async fn read(&self, repo_url: &str, token: &SecretString) -> Result<RepoFiles> {
        if token.expose_secret().trim().is_empty() {
            return Err(GitWriterError::InvalidInput(
                "Access token is required".to_string(),
            ));
        }
        if repo_url.trim().is_empty() {
            return Err(GitWriterError::InvalidInput(
                "Repository URL is required".to_string(),
            ));
        }
        let repo = parse_repo_url(repo_url)?;

        match self.fetch(&repo, token).await {
            Ok(files) => {
                info!("Read {} files from {}", files.len(), repo);
                Ok(files)
            }
            Err(e) => {
                warn!("Reading {} failed: {}", repo, e);
                Ok(RepoFiles::failed(e))
            }
        }
    }

    async fn fetch(&self, repo: &RepoRef, token: &SecretString) -> Result<RepoFiles> {
        let branch = match self.api.get_repo_info(repo, token).await {
            Ok(info) => info.default_branch,
            Err(e) => {
                warn!(
                    "Could not resolve default branch for {} ({}), using {}",
                    repo, e, FALLBACK_BRANCH
                );
                FALLBACK_BRANCH.to_string()
            }
        };

        let tree = self.api.list_tree(repo, &branch, token).await?;
        let candidates = self.candidates(tree);
        if candidates.is_empty() {
            return Err(GitWriterError::NotFound(
                "No readable files found in repository".to_string(),
            ));
        }
        debug!("Fetching up to {} files from {}@{}", candidates.len(), repo, branch);

        let mut contents = stream::iter(candidates)
            .map(|path| async move {
                let content = self.api.get_content(repo, &path, token).await;
                (path, content)
            })
            .buffered(self.fetch_concurrency);

        let mut budget = TokenBudget::new(self.budget.reader_token_ceiling);
        let mut files = Vec::new();

        while let Some((path, content)) = contents.next().await {
            match content {
                Ok(content) => {
                    if !budget.try_add_tokens(estimate_tokens(&content)) {
                        info!(
                            "Token ceiling {} reached at {}, stopping",
                            self.budget.reader_token_ceiling, path
                        );
                        break;
                    }
                    files.push(RepoFile::new(path, content));
                }
                Err(e) => warn!("Skipping {}: {}", path, e),
            }
        }

        RepoFiles::fetched(files).ok_or_else(|| {
            GitWriterError::NotFound("No files could be fetched from repository".to_string())
        })
    }

    /// Blob paths eligible for fetching, in tree order
    fn candidates(&self, tree: Vec<TreeEntry>) -> Vec<String> {
        tree.into_iter()
            .filter(|entry| entry.kind == EntryKind::Blob && !self.should_skip(entry))
            .take(self.budget.reader_file_cap)
            .map(|entry| entry.path)
            .collect()
    }

    fn should_skip(&self, entry: &TreeEntry) -> bool {
        if entry.size.is_some_and(|size| size > self.budget.max_blob_bytes) {
            return true;
        }
        path_extension(&entry.path)
            .map(|ext| BINARY_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }
}

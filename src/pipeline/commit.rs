//! Commit-back: write a generated README to the repository's default branch

use tracing::{info, instrument, warn};

use crate::constants::github::{COMMIT_MESSAGE, README_PATH};
use crate::github::{PutContent, SharedRepositoryApi, parse_repo_url};
use crate::storage::SharedCredentialStore;
use crate::types::{AccountId, GitWriterError, Result};

/// Result of a README commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    /// Commit revision returned by the repository service
    pub revision: String,
    /// True when README.md did not exist before
    pub created: bool,
    pub branch: String,
}

/// Commits READMEs on behalf of stored accounts
#[derive(Clone)]
pub struct CommitBack {
    api: SharedRepositoryApi,
    credentials: SharedCredentialStore,
    message: String,
}

impl CommitBack {
    pub fn new(api: SharedRepositoryApi, credentials: SharedCredentialStore) -> Self {
        Self {
            api,
            credentials,
            message: COMMIT_MESSAGE.to_string(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Create or replace README.md with `readme`
    #[instrument(skip(self, account, readme), fields(account = %account))]
    pub async fn commit_readme(
        &self,
        repo_url: &str,
        account: &AccountId,
        readme: &str,
    ) -> Result<CommitOutcome> {
        self.commit(repo_url, account, readme)
            .await
            .map_err(|e| GitWriterError::pipeline("commit README", e))
    }

    async fn commit(
        &self,
        repo_url: &str,
        account: &AccountId,
        readme: &str,
    ) -> Result<CommitOutcome> {
        if readme.trim().is_empty() {
            return Err(GitWriterError::InvalidInput(
                "README content is empty".to_string(),
            ));
        }

        let token = self.credentials.access_token(account)?;
        let repo = parse_repo_url(repo_url)?;

        let repo_info = self.api.get_repo_info(&repo, &token).await?;
        if !repo_info.can_push {
            warn!("Token for {} may lack push access to {}", account, repo);
        }
        let branch = repo_info.default_branch;

        let prior_revision = self
            .api
            .get_file_revision(&repo, README_PATH, &branch, &token)
            .await?;
        let created = prior_revision.is_none();

        let request = PutContent {
            path: README_PATH.to_string(),
            content: readme.to_string(),
            message: self.message.clone(),
            branch: branch.clone(),
            prior_revision,
        };
        let revision = self.api.put_content(&repo, &request, &token).await?;

        info!(
            "{} {} on {}@{} ({})",
            if created { "Created" } else { "Updated" },
            README_PATH,
            repo,
            branch,
            revision
        );

        Ok(CommitOutcome {
            revision,
            created,
            branch,
        })
    }
}

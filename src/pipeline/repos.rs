//! Repositories visible to an account

use tracing::info;

use crate::github::SharedRepositoryApi;
use crate::storage::SharedCredentialStore;
use crate::types::{AccountId, GitWriterError, RepoSummary, Result};

/// List the account's repositories, most recently updated first
pub async fn list_user_repos(
    api: &SharedRepositoryApi,
    credentials: &SharedCredentialStore,
    account: &AccountId,
) -> Result<Vec<RepoSummary>> {
    let fetch = async {
        let token = credentials.access_token(account)?;
        api.list_user_repos(&token).await
    };

    let repos = fetch
        .await
        .map_err(|e| GitWriterError::pipeline("fetch repositories", e))?;
    info!("Found {} repositories for account {}", repos.len(), account);
    Ok(repos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::testing::FakeRepositoryApi;
    use std::sync::Arc;

    fn summary(name: &str) -> RepoSummary {
        RepoSummary {
            name: name.to_string(),
            private: false,
            html_url: format!("https://github.com/octo/{name}"),
            description: None,
            updated_at: Some("2024-05-01T00:00:00Z".to_string()),
        }
    }

    #[tokio::test]
    async fn test_lists_repos() {
        let api: SharedRepositoryApi = Arc::new(
            FakeRepositoryApi::default()
                .with_user_repo(summary("widget"))
                .with_user_repo(summary("gadget")),
        );
        let credentials: SharedCredentialStore =
            Arc::new(MemoryStore::new().with_account("42", "ghp_x"));

        let repos = list_user_repos(&api, &credentials, &AccountId::new("42"))
            .await
            .unwrap();
        let names: Vec<_> = repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["widget", "gadget"]);
    }

    #[tokio::test]
    async fn test_unknown_account() {
        let api: SharedRepositoryApi = Arc::new(FakeRepositoryApi::default());
        let credentials: SharedCredentialStore = Arc::new(MemoryStore::new());
        let err = list_user_repos(&api, &credentials, &AccountId::new("42"))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Failed to fetch repositories:"));
    }
}

//! GitHub REST API client
//!
//! Thin `reqwest` wrapper with bearer auth, per-request timeouts and
//! exponential retry (`backon`) for transient failures. Auth, not-found and
//! bad-request responses are never retried. Request URLs are assembled from
//! percent-encoded path segments, so tree paths containing `#`, `?` or `%`
//! address the right file.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::{PutContent, RepositoryApi};
use crate::config::GitHubConfig;
use crate::constants::github::FALLBACK_BRANCH;
use crate::constants::network::{BASE_DELAY_MS, USER_AGENT};
use crate::types::{
    ErrorCategory, GitWriterError, RepoInfo, RepoRef, RepoSummary, Result, TreeEntry,
};

const SERVICE: &str = "GitHub";
const API_VERSION: &str = "2022-11-28";

/// GitHub REST API client
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    api_base: Url,
    max_retries: usize,
    retry_delay: Duration,
}

impl GitHubClient {
    /// Build a client; `timeout` bounds every single request
    pub fn new(config: &GitHubConfig, timeout: Duration) -> Result<Self> {
        let api_base = Url::parse(&config.api_base).map_err(|e| {
            GitWriterError::Config(format!("Invalid GitHub API base '{}': {}", config.api_base, e))
        })?;
        if api_base.cannot_be_a_base() {
            return Err(GitWriterError::Config(format!(
                "Invalid GitHub API base '{}'",
                config.api_base
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| {
                GitWriterError::Config(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            api_base,
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(BASE_DELAY_MS),
        })
    }

    /// Override the initial backoff delay
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.retry_delay)
            .with_max_delay(self.retry_delay * 8)
            .with_max_times(self.max_retries)
    }

    /// Join path segments onto the API base, encoding each one
    fn endpoint<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
        query: &[(&str, &str)],
    ) -> Url {
        let mut url = self.api_base.clone();
        // Checked in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    /// `/repos/{owner}/{repo}/contents/{path}`, one segment per path component
    fn contents_url(&self, repo: &RepoRef, path: &str, query: &[(&str, &str)]) -> Url {
        let segments = ["repos", repo.owner.as_str(), repo.repo.as_str(), "contents"]
            .into_iter()
            .chain(path.split('/').filter(|s| !s.is_empty()));
        self.endpoint(segments, query)
    }

    /// Send one request with retries; non-2xx responses become categorized errors
    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        token: &SecretString,
        body: Option<&Value>,
    ) -> Result<T> {
        let path = url.path().to_string();
        let (url, path, method) = (&url, path.as_str(), &method);

        let attempt = || async move {
            let mut request = self
                .client
                .request(method.clone(), url.clone())
                .bearer_auth(token.expose_secret());
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request.send().await.map_err(|e| {
                GitWriterError::upstream(
                    SERVICE,
                    ErrorCategory::from_reqwest(&e),
                    format!("{} {} failed: {}", method, path, e),
                )
            })?;

            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(GitWriterError::http_status(
                    SERVICE,
                    status.as_u16(),
                    format!("{} {} returned {}: {}", method, path, status, api_message(&text)),
                ));
            }

            response.json::<T>().await.map_err(|e| {
                GitWriterError::upstream(
                    SERVICE,
                    ErrorCategory::Unknown,
                    format!("Unexpected response from {} {}: {}", method, path, e),
                )
            })
        };

        attempt
            .retry(self.backoff())
            .when(|e: &GitWriterError| e.is_retryable())
            .notify(|e: &GitWriterError, delay: Duration| {
                warn!("Retrying {} {} in {:?}: {}", method, path, delay, e);
            })
            .await
    }
}

/// Pull `message` out of a GitHub error body, falling back to the raw text
fn api_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

fn is_not_found(err: &GitWriterError) -> bool {
    err.category() == Some(ErrorCategory::NotFound)
}

/// Decode a base64 content payload; GitHub wraps it at 60 columns
pub(crate) fn decode_content(encoded: &str) -> Result<String> {
    let cleaned: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(cleaned)
        .map_err(|e| GitWriterError::ParseFailure(format!("Invalid base64 content: {}", e)))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

// Response types

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    sha: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RepoResponse {
    default_branch: Option<String>,
    #[serde(default)]
    permissions: Option<Permissions>,
}

#[derive(Debug, Deserialize)]
struct Permissions {
    #[serde(default)]
    push: bool,
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    commit: CommitRef,
}

#[derive(Debug, Deserialize)]
struct CommitRef {
    sha: String,
}

#[async_trait]
impl RepositoryApi for GitHubClient {
    async fn list_tree(
        &self,
        repo: &RepoRef,
        branch: &str,
        token: &SecretString,
    ) -> Result<Vec<TreeEntry>> {
        let url = self.endpoint(
            ["repos", repo.owner.as_str(), repo.repo.as_str(), "git", "trees", branch],
            &[("recursive", "1")],
        );
        let response: TreeResponse = self.send(Method::GET, url, token, None).await?;

        if response.truncated {
            warn!("Tree listing for {} was truncated by the API", repo);
        }
        debug!("Listed {} tree entries for {}", response.tree.len(), repo);

        Ok(response.tree)
    }

    async fn get_content(
        &self,
        repo: &RepoRef,
        path: &str,
        token: &SecretString,
    ) -> Result<String> {
        let url = self.contents_url(repo, path, &[]);
        let response: ContentResponse = self.send(Method::GET, url, token, None).await?;

        match (response.encoding.as_deref(), response.content) {
            (Some("base64"), Some(content)) => decode_content(&content),
            (encoding, _) => Err(GitWriterError::ParseFailure(format!(
                "Unsupported content encoding for {}: {}",
                path,
                encoding.unwrap_or("none")
            ))),
        }
    }

    async fn get_repo_info(&self, repo: &RepoRef, token: &SecretString) -> Result<RepoInfo> {
        let url = self.endpoint(["repos", repo.owner.as_str(), repo.repo.as_str()], &[]);
        let response: RepoResponse = match self.send(Method::GET, url, token, None).await {
            Ok(response) => response,
            Err(e) if is_not_found(&e) => {
                return Err(GitWriterError::NotFound(format!(
                    "Repository not found: {}. Please check the repository URL and ensure you have access to it.",
                    repo
                )));
            }
            Err(e) if e.category() == Some(ErrorCategory::Auth) => {
                return Err(GitWriterError::upstream(
                    SERVICE,
                    ErrorCategory::Auth,
                    format!(
                        "Access denied to repository: {}. Please check your permissions.",
                        repo
                    ),
                ));
            }
            Err(e) => return Err(e),
        };

        Ok(RepoInfo {
            default_branch: response
                .default_branch
                .filter(|b| !b.is_empty())
                .unwrap_or_else(|| FALLBACK_BRANCH.to_string()),
            can_push: response.permissions.is_some_and(|p| p.push),
        })
    }

    async fn get_file_revision(
        &self,
        repo: &RepoRef,
        path: &str,
        branch: &str,
        token: &SecretString,
    ) -> Result<Option<String>> {
        let url = self.contents_url(repo, path, &[("ref", branch)]);
        match self
            .send::<ContentResponse>(Method::GET, url, token, None)
            .await
        {
            Ok(response) => Ok(Some(response.sha)),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn put_content(
        &self,
        repo: &RepoRef,
        request: &PutContent,
        token: &SecretString,
    ) -> Result<String> {
        let url = self.contents_url(repo, &request.path, &[]);

        let mut body = json!({
            "message": request.message,
            "content": STANDARD.encode(request.content.as_bytes()),
            "branch": request.branch,
        });
        if let Some(sha) = &request.prior_revision {
            body["sha"] = json!(sha);
        }

        let response: PutResponse = self
            .send(Method::PUT, url, token, Some(&body))
            .await?;
        Ok(response.commit.sha)
    }

    async fn list_user_repos(&self, token: &SecretString) -> Result<Vec<RepoSummary>> {
        let url = self.endpoint(
            ["user", "repos"],
            &[("per_page", "100"), ("sort", "updated")],
        );
        self.send(Method::GET, url, token, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::TimeoutConfig;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GitHubClient {
        let config = GitHubConfig {
            api_base: server.uri(),
            ..GitHubConfig::default()
        };
        GitHubClient::new(&config, Duration::from_secs(5))
            .unwrap()
            .with_retry_delay(Duration::from_millis(1))
    }

    fn token() -> SecretString {
        SecretString::from("ghp_test")
    }

    fn repo() -> RepoRef {
        RepoRef {
            owner: "octo".to_string(),
            repo: "widget".to_string(),
        }
    }

    #[test]
    fn test_decode_content_strips_newlines() {
        let encoded = "ZW5j\nb2Rl\nZA==\n";
        assert_eq!(decode_content(encoded).unwrap(), "encoded");
    }

    #[test]
    fn test_decode_content_lossy_utf8() {
        let encoded = STANDARD.encode([0x68, 0x69, 0xff]);
        assert_eq!(decode_content(&encoded).unwrap(), "hi\u{fffd}");
    }

    #[test]
    fn test_decode_content_invalid() {
        assert!(matches!(
            decode_content("***"),
            Err(GitWriterError::ParseFailure(_))
        ));
    }

    #[tokio::test]
    async fn test_list_tree() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widget/git/trees/main"))
            .and(query_param("recursive", "1"))
            .and(header("authorization", "Bearer ghp_test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sha": "abc",
                "tree": [
                    {"path": "src", "type": "tree"},
                    {"path": "src/main.rs", "type": "blob", "size": 42}
                ],
                "truncated": false
            })))
            .mount(&server)
            .await;

        let entries = client_for(&server)
            .list_tree(&repo(), "main", &token())
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1], TreeEntry::blob("src/main.rs", 42));
    }

    #[tokio::test]
    async fn test_get_content_decodes_base64() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widget/contents/src/main.rs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sha": "f00",
                "encoding": "base64",
                "content": "Zm4gbWFpbigp\nIHt9\n"
            })))
            .mount(&server)
            .await;

        let content = client_for(&server)
            .get_content(&repo(), "src/main.rs", &token())
            .await
            .unwrap();
        assert_eq!(content, "fn main() {}");
    }

    #[tokio::test]
    async fn test_transient_errors_are_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widget"))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widget"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "default_branch": "trunk",
                "permissions": {"push": true}
            })))
            .mount(&server)
            .await;

        let info = client_for(&server)
            .get_repo_info(&repo(), &token())
            .await
            .unwrap();
        assert_eq!(info.default_branch, "trunk");
        assert!(info.can_push);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widget"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_repo_info(&repo(), &token())
            .await
            .unwrap_err();
        assert!(matches!(err, GitWriterError::NotFound(_)));
        assert!(err.to_string().contains("Repository not found: octo/widget"));
    }

    #[tokio::test]
    async fn test_forbidden_repo_info() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widget"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_repo_info(&repo(), &token())
            .await
            .unwrap_err();
        assert_eq!(err.category(), Some(ErrorCategory::Auth));
        assert!(err.to_string().contains("Access denied"));
    }

    #[tokio::test]
    async fn test_missing_default_branch_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widget"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let info = client_for(&server)
            .get_repo_info(&repo(), &token())
            .await
            .unwrap();
        assert_eq!(info.default_branch, "main");
        assert!(!info.can_push);
    }

    #[tokio::test]
    async fn test_file_revision_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widget/contents/README.md"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let revision = client_for(&server)
            .get_file_revision(&repo(), "README.md", "main", &token())
            .await
            .unwrap();
        assert!(revision.is_none());
    }

    #[tokio::test]
    async fn test_put_content_sends_prior_revision() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/repos/octo/widget/contents/README.md"))
            .and(body_partial_json(json!({
                "message": "README.md added via GitWriter",
                "content": STANDARD.encode("# Widget"),
                "branch": "main",
                "sha": "old-sha"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": {"sha": "blob-sha"},
                "commit": {"sha": "commit-sha"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = PutContent {
            path: "README.md".to_string(),
            content: "# Widget".to_string(),
            message: "README.md added via GitWriter".to_string(),
            branch: "main".to_string(),
            prior_revision: Some("old-sha".to_string()),
        };
        let revision = client_for(&server)
            .put_content(&repo(), &request, &token())
            .await
            .unwrap();
        assert_eq!(revision, "commit-sha");
    }

    #[tokio::test]
    async fn test_list_user_repos() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/repos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "name": "widget",
                "private": false,
                "html_url": "https://github.com/octo/widget",
                "description": null,
                "updated_at": "2024-01-01T00:00:00Z",
                "stargazers_count": 3
            }])))
            .mount(&server)
            .await;

        let repos = client_for(&server).list_user_repos(&token()).await.unwrap();
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].name, "widget");
        assert!(repos[0].description.is_none());
    }

    #[tokio::test]
    async fn test_get_content_encodes_reserved_characters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widget/contents/docs/C%23.md"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sha": "c5",
                "encoding": "base64",
                "content": STANDARD.encode("# C# notes")
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widget/contents/docs/C"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sha": "wrong",
                "encoding": "base64",
                "content": STANDARD.encode("wrong file")
            })))
            .expect(0)
            .mount(&server)
            .await;

        let content = client_for(&server)
            .get_content(&repo(), "docs/C#.md", &token())
            .await
            .unwrap();
        assert_eq!(content, "# C# notes");
    }

    #[tokio::test]
    async fn test_file_revision_encodes_path_and_ref() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widget/contents/notes/what%3F.md"))
            .and(query_param("ref", "release/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sha": "rev-1"})))
            .expect(1)
            .mount(&server)
            .await;

        let revision = client_for(&server)
            .get_file_revision(&repo(), "notes/what?.md", "release/1.0", &token())
            .await
            .unwrap();
        assert_eq!(revision.as_deref(), Some("rev-1"));
    }

    #[tokio::test]
    async fn test_list_tree_encodes_branch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widget/git/trees/feature%2Fdocs"))
            .and(query_param("recursive", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tree": []})))
            .expect(1)
            .mount(&server)
            .await;

        let entries = client_for(&server)
            .list_tree(&repo(), "feature/docs", &token())
            .await
            .unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_request_timeout_applies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widget"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"default_branch": "main"}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let config = GitHubConfig {
            api_base: server.uri(),
            max_retries: 0,
            ..GitHubConfig::default()
        };
        let timeouts = TimeoutConfig {
            github_request: Duration::from_millis(50),
            ..TimeoutConfig::default()
        };
        let client = GitHubClient::new(&config, timeouts.github_request).unwrap();

        let err = client.get_repo_info(&repo(), &token()).await.unwrap_err();
        assert_eq!(err.category(), Some(ErrorCategory::Network));
    }

    #[test]
    fn test_invalid_api_base_rejected() {
        let config = GitHubConfig {
            api_base: "not a url".to_string(),
            ..GitHubConfig::default()
        };
        let err = GitHubClient::new(&config, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, GitWriterError::Config(_)));
    }
}

//! In-process fakes for driving the pipeline deterministically in tests

use async_trait::async_trait;
use secrecy::SecretString;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::ai::provider::{LlmProvider, LlmResponse};
use crate::github::{PutContent, RepositoryApi};
use crate::storage::{ResultStore, StoredReadme};
use crate::types::{
    AccountId, ErrorCategory, GitWriterError, RepoInfo, RepoRef, RepoSummary, Result, TreeEntry,
};

// =============================================================================
// Repository API
// =============================================================================

/// Scripted `RepositoryApi` backed by in-memory maps
pub struct FakeRepositoryApi {
    tree: Vec<TreeEntry>,
    contents: HashMap<String, String>,
    failing: HashSet<String>,
    tree_fails: bool,
    repo_info: Option<RepoInfo>,
    revisions: HashMap<String, String>,
    user_repos: Vec<RepoSummary>,
    calls: AtomicUsize,
    content_fetches: AtomicUsize,
    listed_branches: Mutex<Vec<String>>,
    puts: Mutex<Vec<PutContent>>,
}

impl Default for FakeRepositoryApi {
    fn default() -> Self {
        Self {
            tree: Vec::new(),
            contents: HashMap::new(),
            failing: HashSet::new(),
            tree_fails: false,
            repo_info: Some(RepoInfo {
                default_branch: "main".to_string(),
                can_push: true,
            }),
            revisions: HashMap::new(),
            user_repos: Vec::new(),
            calls: AtomicUsize::new(0),
            content_fetches: AtomicUsize::new(0),
            listed_branches: Mutex::new(Vec::new()),
            puts: Mutex::new(Vec::new()),
        }
    }
}

impl FakeRepositoryApi {
    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.tree
            .push(TreeEntry::blob(path, content.len() as u64));
        self.contents.insert(path.to_string(), content.to_string());
        self
    }

    pub fn with_entry(mut self, entry: TreeEntry) -> Self {
        self.tree.push(entry);
        self
    }

    pub fn with_failing_file(mut self, path: &str) -> Self {
        self.tree.push(TreeEntry::blob(path, 10));
        self.failing.insert(path.to_string());
        self
    }

    pub fn failing_tree(mut self) -> Self {
        self.tree_fails = true;
        self
    }

    pub fn with_branch(mut self, branch: &str) -> Self {
        self.repo_info = Some(RepoInfo {
            default_branch: branch.to_string(),
            can_push: true,
        });
        self
    }

    /// Repository info lookups fail with `NotFound`
    pub fn missing_repo(mut self) -> Self {
        self.repo_info = None;
        self
    }

    pub fn with_revision(mut self, path: &str, sha: &str) -> Self {
        self.revisions.insert(path.to_string(), sha.to_string());
        self
    }

    pub fn with_user_repo(mut self, repo: RepoSummary) -> Self {
        self.user_repos.push(repo);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn content_fetches(&self) -> usize {
        self.content_fetches.load(Ordering::SeqCst)
    }

    pub fn listed_branches(&self) -> Vec<String> {
        self.listed_branches.lock().unwrap().clone()
    }

    pub fn puts(&self) -> Vec<PutContent> {
        self.puts.lock().unwrap().clone()
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RepositoryApi for FakeRepositoryApi {
    async fn list_tree(
        &self,
        _repo: &RepoRef,
        branch: &str,
        _token: &SecretString,
    ) -> Result<Vec<TreeEntry>> {
        self.record_call();
        self.listed_branches.lock().unwrap().push(branch.to_string());
        if self.tree_fails {
            return Err(GitWriterError::http_status("GitHub", 502, "bad gateway"));
        }
        Ok(self.tree.clone())
    }

    async fn get_content(
        &self,
        _repo: &RepoRef,
        path: &str,
        _token: &SecretString,
    ) -> Result<String> {
        self.record_call();
        self.content_fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(path) {
            return Err(GitWriterError::upstream(
                "GitHub",
                ErrorCategory::Network,
                format!("connection reset fetching {path}"),
            ));
        }
        self.contents
            .get(path)
            .cloned()
            .ok_or_else(|| GitWriterError::http_status("GitHub", 404, path.to_string()))
    }

    async fn get_repo_info(&self, repo: &RepoRef, _token: &SecretString) -> Result<RepoInfo> {
        self.record_call();
        self.repo_info
            .clone()
            .ok_or_else(|| GitWriterError::NotFound(format!("Repository not found: {repo}")))
    }

    async fn get_file_revision(
        &self,
        _repo: &RepoRef,
        path: &str,
        _branch: &str,
        _token: &SecretString,
    ) -> Result<Option<String>> {
        self.record_call();
        Ok(self.revisions.get(path).cloned())
    }

    async fn put_content(
        &self,
        _repo: &RepoRef,
        request: &PutContent,
        _token: &SecretString,
    ) -> Result<String> {
        self.record_call();
        self.puts.lock().unwrap().push(request.clone());
        Ok(format!("commit-{}", self.puts.lock().unwrap().len()))
    }

    async fn list_user_repos(&self, _token: &SecretString) -> Result<Vec<RepoSummary>> {
        self.record_call();
        Ok(self.user_repos.clone())
    }
}

// =============================================================================
// LLM Provider
// =============================================================================

/// `LlmProvider` that replays scripted completions in order
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<(String, f32)>>,
    healthy: bool,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<Result<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
            healthy: true,
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn failing() -> Self {
        Self::new(vec![Err(GitWriterError::upstream(
            "OpenAI",
            ErrorCategory::Network,
            "connection refused",
        ))])
    }

    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    /// Prompts and temperatures received, in call order
    pub fn prompts(&self) -> Vec<(String, f32)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<LlmResponse> {
        self.prompts
            .lock()
            .unwrap()
            .push((prompt.to_string(), temperature));
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) => Ok(LlmResponse::content_only(text)),
            Some(Err(e)) => Err(e),
            None => Err(GitWriterError::upstream(
                "scripted",
                ErrorCategory::Unknown,
                "no scripted response left",
            )),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-1"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.healthy)
    }
}

// =============================================================================
// Result Store
// =============================================================================

/// `ResultStore` whose writes always fail; reads return nothing
#[derive(Default)]
pub struct FailingResultStore {
    writes: AtomicUsize,
}

impl FailingResultStore {
    pub fn write_attempts(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl ResultStore for FailingResultStore {
    fn upsert_readme(
        &self,
        _repo_url: &str,
        _account: &AccountId,
        _readme: &str,
    ) -> Result<StoredReadme> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(GitWriterError::PersistenceFailure(
            "Failed to save README: database is locked".to_string(),
        ))
    }

    fn readme(&self, _repo_url: &str, _account: &AccountId) -> Result<Option<StoredReadme>> {
        Ok(None)
    }

    fn list_readmes(&self, _account: &AccountId) -> Result<Vec<StoredReadme>> {
        Ok(Vec::new())
    }
}

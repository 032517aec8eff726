//! Repository URL parsing

use regex::Regex;
use std::sync::LazyLock;

use crate::types::{GitWriterError, RepoRef, Result};

static REPO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.)?github\.com/([^/\s]+)/([^/\s]+?)(?:\.git)?/?$")
        .expect("valid repository URL regex")
});

/// Parse `owner` and `repo` from a hosted repository URL.
///
/// Accepts `https://github.com/owner/repo` with an optional trailing `/`
/// or `.git` suffix. Deeper paths (`/tree/main/...`) are rejected.
pub fn parse_repo_url(url: &str) -> Result<RepoRef> {
    let captures = REPO_URL
        .captures(url.trim())
        .ok_or_else(|| GitWriterError::InvalidInput(format!("Invalid GitHub repo URL: {}", url)))?;

    Ok(RepoRef {
        owner: captures[1].to_string(),
        repo: captures[2].to_string(),
    })
}

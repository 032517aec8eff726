//! Commit Command
//!
//! Usage:
//!   gitwriter commit <repo-url> --account <id> [--file FILE]
//!
//! Without `--file`, commits the README last generated for that
//! repository and account.

use std::path::Path;

use crate::cli::CommandContext;
use crate::cli::ui::Output;
use crate::storage::ResultStore;
use crate::types::{AccountId, GitWriterError, Result};

pub async fn run(
    ctx: &CommandContext,
    repo_url: &str,
    account: &str,
    file: Option<&Path>,
) -> Result<()> {
    let account = AccountId::new(account);

    let readme = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => ctx
            .db
            .readme(repo_url, &account)?
            .map(|stored| stored.readme)
            .ok_or_else(|| {
                GitWriterError::NotFound(format!(
                    "No stored README for {} (account {}); run `gitwriter generate` first",
                    repo_url, account
                ))
            })?,
    };

    let outcome = ctx
        .commit_back()
        .commit_readme(repo_url, &account, &readme)
        .await?;

    let out = Output::new();
    out.success(if outcome.created {
        "README committed successfully (created)"
    } else {
        "README committed successfully (updated)"
    });
    out.field("Branch", &outcome.branch);
    out.field("Commit", &outcome.revision);
    Ok(())
}

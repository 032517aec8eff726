//! Repos Command
//!
//! Usage:
//!   gitwriter repos --account <id>

use crate::cli::CommandContext;
use crate::cli::ui::Output;
use crate::pipeline::list_user_repos;
use crate::storage::SharedCredentialStore;
use crate::types::{AccountId, Result};

pub async fn run(ctx: &CommandContext, account: &str) -> Result<()> {
    let credentials: SharedCredentialStore = ctx.db.clone();
    let repos = list_user_repos(&ctx.api, &credentials, &AccountId::new(account)).await?;

    let out = Output::new();
    if repos.is_empty() {
        out.info("No repositories found for this user.");
        return Ok(());
    }

    out.section(&format!("Repositories ({})", repos.len()));
    for repo in &repos {
        let visibility = if repo.private { "private" } else { "public" };
        println!("  {} [{}]", repo.name, visibility);
        out.field("URL", &repo.html_url);
        if let Some(description) = repo.description.as_deref().filter(|d| !d.is_empty()) {
            out.field("About", description);
        }
        if let Some(updated) = &repo.updated_at {
            out.field("Updated", updated);
        }
    }
    Ok(())
}

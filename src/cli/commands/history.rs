//! History Command
//!
//! Usage:
//!   gitwriter history --account <id> [--format text|json]

use crate::cli::CommandContext;
use crate::cli::ui::Output;
use crate::storage::ResultStore;
use crate::types::{AccountId, Result};

pub fn run(ctx: &CommandContext, account: &str, format: &str) -> Result<()> {
    let readmes = ctx.db.list_readmes(&AccountId::new(account))?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&readmes)?);
        return Ok(());
    }

    let out = Output::new();
    if readmes.is_empty() {
        out.info(&format!("No READMEs generated yet for account {}", account));
        return Ok(());
    }

    out.section(&format!("Generated READMEs ({})", readmes.len()));
    for stored in &readmes {
        println!("  {}", stored.repo_url);
        out.field("Updated", stored.updated_at.format("%Y-%m-%d %H:%M UTC"));
        out.field("Size", format!("{} chars", stored.readme.chars().count()));
        out.field("SHA-256", &stored.content_hash[..12.min(stored.content_hash.len())]);
    }
    Ok(())
}

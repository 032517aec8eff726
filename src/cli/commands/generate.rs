//! Generate Command
//!
//! Usage:
//!   gitwriter generate <repo-url> --account <id> [--output FILE]

use std::path::Path;

use crate::cli::CommandContext;
use crate::cli::ui::Output;
use crate::types::{AccountId, Result};

pub async fn run(
    ctx: &CommandContext,
    repo_url: &str,
    account: &str,
    output: Option<&Path>,
) -> Result<()> {
    let out = Output::new();
    let pipeline = ctx.pipeline().await?;
    if pipeline.strategies().is_heuristic() {
        out.info("No LLM backend available; using heuristic analysis and template README");
    }

    let result = pipeline.run(repo_url, &AccountId::new(account)).await?;

    match output {
        Some(path) => {
            std::fs::write(path, &result.readme)?;
            out.success(&format!(
                "README for {} written to {}",
                repo_url,
                path.display()
            ));
        }
        None => out.document(&result.readme),
    }
    Ok(())
}

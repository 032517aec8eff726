//! Account Command
//!
//! Usage:
//!   gitwriter account add <id> --username <name> --token <token>
//!   gitwriter account show <id>
//!   gitwriter account deduct <id> <amount>

use secrecy::SecretString;

use crate::cli::CommandContext;
use crate::cli::ui::Output;
use crate::storage::AccountStore;
use crate::types::{AccountId, GitWriterError, Result};

/// Register an account or refresh its stored token
pub fn add(ctx: &CommandContext, id: &str, username: &str, token: &str) -> Result<()> {
    if token.trim().is_empty() {
        return Err(GitWriterError::InvalidInput(
            "Access token is required".to_string(),
        ));
    }

    let account = ctx
        .db
        .upsert_account(&AccountId::new(id), username, &SecretString::from(token))?;

    let out = Output::new();
    out.success(&format!("Saved account {}", account.id));
    out.field("Username", &account.username);
    out.field("Credits", account.credits);
    Ok(())
}

pub fn show(ctx: &CommandContext, id: &str) -> Result<()> {
    let account = ctx
        .db
        .account(&AccountId::new(id))?
        .ok_or_else(|| GitWriterError::NotFound(format!("Account {} not found", id)))?;

    let out = Output::new();
    out.section(&format!("Account {}", account.id));
    out.field("Username", &account.username);
    out.field("Credits", account.credits);
    out.field("Created", account.created_at.format("%Y-%m-%d %H:%M UTC"));
    out.field("Updated", account.updated_at.format("%Y-%m-%d %H:%M UTC"));
    Ok(())
}

pub fn deduct(ctx: &CommandContext, id: &str, amount: i64) -> Result<()> {
    let remaining = ctx.db.deduct_credits(&AccountId::new(id), amount)?;
    Output::new().success(&format!(
        "Deducted {} credits from {}. Remaining: {}",
        amount, id, remaining
    ));
    Ok(())
}

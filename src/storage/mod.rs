//! Persistence
//!
//! Accounts (access token, credit balance) and generated README history.
//! `Database` persists to SQLite; `MemoryStore` keeps everything in process.

pub mod database;
pub mod memory;

pub use database::{Database, PoolConfig, SharedDatabase};
pub use memory::MemoryStore;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::types::{AccountId, Result};

/// A user account with its stored GitHub credential
#[derive(Clone)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub access_token: SecretString,
    pub credits: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("access_token", &"[REDACTED]")
            .field("credits", &self.credits)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// A generated README keyed by `(repo_url, account_id)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredReadme {
    pub repo_url: String,
    pub account_id: String,
    pub readme: String,
    /// Hex SHA-256 of `readme`
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Resolves an account's access credential
pub trait CredentialStore: Send + Sync {
    /// Fails with `Credential` if the account or its token is absent
    fn access_token(&self, account: &AccountId) -> Result<SecretString>;
}

/// Generated README persistence; writes are last-writer-wins
pub trait ResultStore: Send + Sync {
    fn upsert_readme(&self, repo_url: &str, account: &AccountId, readme: &str)
    -> Result<StoredReadme>;

    fn readme(&self, repo_url: &str, account: &AccountId) -> Result<Option<StoredReadme>>;

    /// Most recently updated first
    fn list_readmes(&self, account: &AccountId) -> Result<Vec<StoredReadme>>;
}

/// Account records and credit bookkeeping
pub trait AccountStore: Send + Sync {
    /// Insert a new account with the initial credit balance, or refresh the
    /// username and token of an existing one (credits untouched)
    fn upsert_account(
        &self,
        id: &AccountId,
        username: &str,
        access_token: &SecretString,
    ) -> Result<Account>;

    fn account(&self, id: &AccountId) -> Result<Option<Account>>;

    /// Deduct `amount` credits; returns the remaining balance
    ///
    /// `amount` must be positive.
    fn deduct_credits(&self, id: &AccountId, amount: i64) -> Result<i64>;
}

pub type SharedCredentialStore = Arc<dyn CredentialStore>;
pub type SharedResultStore = Arc<dyn ResultStore>;

/// Hex SHA-256 of a README body
pub fn content_hash(readme: &str) -> String {
    format!("{:x}", Sha256::digest(readme.as_bytes()))
}

pub(crate) fn account_not_found(id: &AccountId) -> crate::types::GitWriterError {
    crate::types::GitWriterError::Credential(format!("Account {} not found", id))
}

/// Reject zero and negative deductions
pub(crate) fn ensure_positive_amount(amount: i64) -> Result<()> {
    if amount <= 0 {
        return Err(crate::types::GitWriterError::InvalidInput(format!(
            "Amount must be positive, got {}",
            amount
        )));
    }
    Ok(())
}

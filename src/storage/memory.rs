//! In-process store backed by `DashMap`

use chrono::Utc;
use dashmap::DashMap;
use secrecy::{ExposeSecret, SecretString};

use super::{
    Account, AccountStore, CredentialStore, ResultStore, StoredReadme, account_not_found,
    content_hash, ensure_positive_amount,
};
use crate::constants::account::INITIAL_CREDITS;
use crate::types::{AccountId, GitWriterError, Result};

/// Volatile store for tests and one-off runs
#[derive(Default)]
pub struct MemoryStore {
    accounts: DashMap<AccountId, Account>,
    readmes: DashMap<(String, AccountId), StoredReadme>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder for seeding an account
    pub fn with_account(self, id: &str, token: &str) -> Self {
        let id = AccountId::new(id);
        // Fresh store, cannot fail
        let _ = self.upsert_account(&id, id.as_str(), &SecretString::from(token));
        self
    }

    pub fn readme_count(&self) -> usize {
        self.readmes.len()
    }
}

impl CredentialStore for MemoryStore {
    fn access_token(&self, account: &AccountId) -> Result<SecretString> {
        let entry = self
            .accounts
            .get(account)
            .ok_or_else(|| account_not_found(account))?;
        if entry.access_token.expose_secret().is_empty() {
            return Err(GitWriterError::Credential(format!(
                "Access token for account {} not found",
                account
            )));
        }
        Ok(entry.access_token.clone())
    }
}

impl ResultStore for MemoryStore {
    fn upsert_readme(
        &self,
        repo_url: &str,
        account: &AccountId,
        readme: &str,
    ) -> Result<StoredReadme> {
        let now = Utc::now();
        let key = (repo_url.to_string(), account.clone());
        let created_at = self
            .readmes
            .get(&key)
            .map(|existing| existing.created_at)
            .unwrap_or(now);

        let stored = StoredReadme {
            repo_url: repo_url.to_string(),
            account_id: account.to_string(),
            readme: readme.to_string(),
            content_hash: content_hash(readme),
            created_at,
            updated_at: now,
        };
        self.readmes.insert(key, stored.clone());
        Ok(stored)
    }

    fn readme(&self, repo_url: &str, account: &AccountId) -> Result<Option<StoredReadme>> {
        let key = (repo_url.to_string(), account.clone());
        Ok(self.readmes.get(&key).map(|r| r.clone()))
    }

    fn list_readmes(&self, account: &AccountId) -> Result<Vec<StoredReadme>> {
        let mut readmes: Vec<StoredReadme> = self
            .readmes
            .iter()
            .filter(|entry| &entry.key().1 == account)
            .map(|entry| entry.value().clone())
            .collect();
        readmes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(readmes)
    }
}

impl AccountStore for MemoryStore {
    fn upsert_account(
        &self,
        id: &AccountId,
        username: &str,
        access_token: &SecretString,
    ) -> Result<Account> {
        let now = Utc::now();
        let account = self
            .accounts
            .entry(id.clone())
            .and_modify(|existing| {
                existing.username = username.to_string();
                existing.access_token = access_token.clone();
                existing.updated_at = now;
            })
            .or_insert_with(|| Account {
                id: id.clone(),
                username: username.to_string(),
                access_token: access_token.clone(),
                credits: INITIAL_CREDITS,
                created_at: now,
                updated_at: now,
            })
            .clone();
        Ok(account)
    }

    fn account(&self, id: &AccountId) -> Result<Option<Account>> {
        Ok(self.accounts.get(id).map(|a| a.clone()))
    }

    fn deduct_credits(&self, id: &AccountId, amount: i64) -> Result<i64> {
        ensure_positive_amount(amount)?;
        let mut account = self
            .accounts
            .get_mut(id)
            .ok_or_else(|| account_not_found(id))?;
        if account.credits < amount {
            return Err(GitWriterError::InvalidInput(format!(
                "Insufficient credits for account {}",
                id
            )));
        }
        account.credits -= amount;
        account.updated_at = Utc::now();
        Ok(account.credits)
    }
}

//! SQLite Database with Connection Pooling
//!
//! - Connection pooling via r2d2
//! - WAL mode
//! - Schema versioning through `PRAGMA user_version`
//! - Panic-safe transactions with automatic rollback

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OptionalExtension, Row, params};
use secrecy::{ExposeSecret, SecretString};

use super::{
    Account, AccountStore, CredentialStore, ResultStore, StoredReadme, account_not_found,
    content_hash, ensure_positive_amount,
};
use crate::constants::account::INITIAL_CREDITS;
use crate::types::{AccountId, GitWriterError, Result, ResultExt};

/// Shared database handle for async contexts.
pub type SharedDatabase = Arc<Database>;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    id           TEXT PRIMARY KEY,
    username     TEXT NOT NULL,
    access_token TEXT NOT NULL,
    credits      INTEGER NOT NULL,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS readmes (
    id           TEXT PRIMARY KEY,
    repo_url     TEXT NOT NULL,
    account_id   TEXT NOT NULL,
    readme       TEXT NOT NULL,
    content_hash TEXT NOT NULL DEFAULT '',
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL,
    UNIQUE (repo_url, account_id)
);

CREATE INDEX IF NOT EXISTS idx_readmes_account ON readmes (account_id, updated_at);
"#;

/// Current schema version for migration tracking
const SCHEMA_VERSION: u32 = 2;

struct Migration {
    version: u32,
    description: &'static str,
    up: &'static str,
}

/// Upgrades for databases created by older releases
const MIGRATIONS: &[Migration] = &[Migration {
    version: 2,
    description: "Add README content hash",
    up: "ALTER TABLE readmes ADD COLUMN content_hash TEXT NOT NULL DEFAULT ''",
}];

const README_COLUMNS: &str = "repo_url, account_id, readme, content_hash, created_at, updated_at";
const ACCOUNT_COLUMNS: &str = "id, username, access_token, credits, created_at, updated_at";

/// Connection pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_size: u32,
    pub min_idle: u32,
    /// Timeout for acquiring a connection (seconds)
    pub connection_timeout_secs: u64,
}

impl PoolConfig {
    const MIN_POOL_SIZE: u32 = 2;
    const MAX_POOL_SIZE: u32 = 16;

    /// clamp(cores, MIN, MAX); the CLI issues few concurrent writes
    pub fn auto() -> Self {
        let cores = std::thread::available_parallelism()
            .map(|p| p.get() as u32)
            .unwrap_or(4);
        let max_size = cores.clamp(Self::MIN_POOL_SIZE, Self::MAX_POOL_SIZE);
        Self {
            max_size,
            min_idle: 1,
            connection_timeout_secs: 30,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::auto()
    }
}

/// Thread-safe database with connection pooling.
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Open (creating if needed) and initialize the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, PoolConfig::default())
    }

    pub fn open_with_config<P: AsRef<Path>>(path: P, config: PoolConfig) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context_fn(|| format!("Failed to create {}", parent.display()))?;
        }

        let manager =
            SqliteConnectionManager::file(path.as_ref()).with_init(Self::configure_connection);

        let pool = Pool::builder()
            .max_size(config.max_size)
            .min_idle(Some(config.min_idle))
            .connection_timeout(std::time::Duration::from_secs(
                config.connection_timeout_secs,
            ))
            .build(manager)
            .with_context("Failed to create connection pool")?;

        let db = Self { pool };
        db.initialize()?;
        Ok(db)
    }

    /// Open an initialized in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory();

        // One connection: every pooled connection would be a separate database
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .with_context("Failed to create in-memory pool")?;

        let db = Self { pool };
        db.initialize()?;
        Ok(db)
    }

    fn configure_connection(conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
            "#,
        )?;
        Ok(())
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        self.pool
            .get()
            .with_context("Failed to acquire database connection")
    }

    /// Create the schema on a fresh database or migrate an older one.
    fn initialize(&self) -> Result<()> {
        let conn = self.conn()?;
        let current_version: u32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .with_context("Failed to read schema version")?;

        if current_version == 0 {
            conn.execute_batch(SCHEMA)
                .with_context("Failed to initialize database schema")?;
        } else {
            for migration in MIGRATIONS.iter().filter(|m| m.version > current_version) {
                conn.execute_batch(migration.up).with_context_fn(|| {
                    format!(
                        "Failed to apply migration {}: {}",
                        migration.version, migration.description
                    )
                })?;
                tracing::info!(
                    "Applied migration {}: {}",
                    migration.version,
                    migration.description
                );
            }
        }

        if current_version < SCHEMA_VERSION {
            conn.pragma_update(None, "user_version", SCHEMA_VERSION)
                .with_context("Failed to update schema version")?;
        }
        Ok(())
    }

    /// Execute a function within a panic-safe database transaction.
    ///
    /// Returning an error or panicking rolls the transaction back.
    pub fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + std::panic::UnwindSafe,
    {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .with_context("Failed to start transaction")?;

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| f(&tx)));

        match result {
            Ok(Ok(value)) => {
                tx.commit().with_context("Failed to commit transaction")?;
                Ok(value)
            }
            Ok(Err(e)) => Err(e),
            Err(panic_payload) => {
                let panic_msg = panic_payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic_payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "Unknown panic".to_string());

                tracing::error!("Transaction panicked: {}", panic_msg);
                Err(GitWriterError::PersistenceFailure(format!(
                    "Transaction panicked: {}",
                    panic_msg
                )))
            }
        }
    }

    fn map_readme(row: &Row<'_>) -> rusqlite::Result<StoredReadme> {
        Ok(StoredReadme {
            repo_url: row.get(0)?,
            account_id: row.get(1)?,
            readme: row.get(2)?,
            content_hash: row.get(3)?,
            created_at: parse_timestamp(row, 4)?,
            updated_at: parse_timestamp(row, 5)?,
        })
    }

    fn map_account(row: &Row<'_>) -> rusqlite::Result<Account> {
        Ok(Account {
            id: AccountId::new(row.get::<_, String>(0)?),
            username: row.get(1)?,
            access_token: SecretString::from(row.get::<_, String>(2)?),
            credits: row.get(3)?,
            created_at: parse_timestamp(row, 4)?,
            updated_at: parse_timestamp(row, 5)?,
        })
    }

    fn query_account(conn: &Connection, id: &AccountId) -> Result<Option<Account>> {
        conn.query_row(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1"),
            params![id.as_str()],
            Self::map_account,
        )
        .optional()
        .with_context("Failed to load account")
    }
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

impl CredentialStore for Database {
    fn access_token(&self, account: &AccountId) -> Result<SecretString> {
        let conn = self.conn()?;
        let found = Self::query_account(&conn, account)?.ok_or_else(|| account_not_found(account))?;
        if found.access_token.expose_secret().is_empty() {
            return Err(GitWriterError::Credential(format!(
                "Access token for account {} not found",
                account
            )));
        }
        Ok(found.access_token)
    }
}

impl ResultStore for Database {
    fn upsert_readme(
        &self,
        repo_url: &str,
        account: &AccountId,
        readme: &str,
    ) -> Result<StoredReadme> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO readmes (id, repo_url, account_id, readme, content_hash, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             ON CONFLICT (repo_url, account_id) DO UPDATE SET
                readme = excluded.readme,
                content_hash = excluded.content_hash,
                updated_at = excluded.updated_at",
            params![
                uuid::Uuid::new_v4().to_string(),
                repo_url,
                account.as_str(),
                readme,
                content_hash(readme),
                now,
            ],
        )
        .with_context("Failed to save README")?;

        tracing::debug!("Saved README for {} ({} chars)", repo_url, readme.len());

        conn.query_row(
            &format!("SELECT {README_COLUMNS} FROM readmes WHERE repo_url = ?1 AND account_id = ?2"),
            params![repo_url, account.as_str()],
            Self::map_readme,
        )
        .with_context("Failed to load saved README")
    }

    fn readme(&self, repo_url: &str, account: &AccountId) -> Result<Option<StoredReadme>> {
        self.conn()?
            .query_row(
                &format!(
                    "SELECT {README_COLUMNS} FROM readmes WHERE repo_url = ?1 AND account_id = ?2"
                ),
                params![repo_url, account.as_str()],
                Self::map_readme,
            )
            .optional()
            .with_context("Failed to load README")
    }

    fn list_readmes(&self, account: &AccountId) -> Result<Vec<StoredReadme>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {README_COLUMNS} FROM readmes WHERE account_id = ?1 ORDER BY updated_at DESC"
            ))
            .with_context("Failed to prepare README listing")?;

        stmt.query_map(params![account.as_str()], Self::map_readme)
            .with_context("Failed to list READMEs")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .with_context("Failed to read README rows")
    }
}

impl AccountStore for Database {
    fn upsert_account(
        &self,
        id: &AccountId,
        username: &str,
        access_token: &SecretString,
    ) -> Result<Account> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO accounts (id, username, access_token, credits, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT (id) DO UPDATE SET
                username = excluded.username,
                access_token = excluded.access_token,
                updated_at = excluded.updated_at",
            params![
                id.as_str(),
                username,
                access_token.expose_secret(),
                INITIAL_CREDITS,
                now
            ],
        )
        .with_context("Failed to save account")?;

        Self::query_account(&conn, id)?.ok_or_else(|| account_not_found(id))
    }

    fn account(&self, id: &AccountId) -> Result<Option<Account>> {
        let conn = self.conn()?;
        Self::query_account(&conn, id)
    }

    fn deduct_credits(&self, id: &AccountId, amount: i64) -> Result<i64> {
        ensure_positive_amount(amount)?;
        self.transaction(|conn| {
            let credits: i64 = conn
                .query_row(
                    "SELECT credits FROM accounts WHERE id = ?1",
                    params![id.as_str()],
                    |row| row.get(0),
                )
                .optional()
                .with_context("Failed to load credits")?
                .ok_or_else(|| account_not_found(id))?;

            if credits < amount {
                return Err(GitWriterError::InvalidInput(format!(
                    "Insufficient credits for account {}",
                    id
                )));
            }

            let remaining = credits - amount;
            conn.execute(
                "UPDATE accounts SET credits = ?1, updated_at = ?2 WHERE id = ?3",
                params![remaining, Utc::now().to_rfc3339(), id.as_str()],
            )
            .with_context("Failed to update credits")?;

            tracing::info!("Deducted {} credits from {}, {} left", amount, id, remaining);
            Ok(remaining)
        })
    }
}

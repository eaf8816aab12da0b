//! # SQLite Store
//!
//! SQLite-backed implementation of [`KeyValueStore`].
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      SqliteStore Lifecycle                              │
//! │                                                                         │
//! │  StoreConfig::new(path) ── pool settings, WAL                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqliteStore::open(config).await                                        │
//! │       │                                                                 │
//! │       ├── create pool (create file if missing)                          │
//! │       ├── run embedded migrations                                       │
//! │       └── sweep the session scope (session values do not                │
//! │           outlive the run that wrote them)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  get / put / delete / clear_scope                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::kv::{KeyValueStore, StorageScope};

/// Embedded migrations from the crate's `migrations/` directory.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

// =============================================================================
// Configuration
// =============================================================================

/// SQLite store configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = StoreConfig::new("/path/to/tillpoint.db").max_connections(2);
/// let store = SqliteStore::open(config).await?;
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of pool connections. A client-side store sees little
    /// concurrency; the default is 2.
    pub max_connections: u32,

    /// Connection acquire timeout.
    pub connect_timeout: Duration,
}

impl StoreConfig {
    /// Creates a configuration with defaults for the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StoreConfig {
            database_path: path.into(),
            max_connections: 2,
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Sets the maximum number of pool connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }
}

// =============================================================================
// SqliteStore
// =============================================================================

/// SQLite-backed key-value store.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if needed) the store at the configured path, runs
    /// pending migrations, and sweeps the session scope.
    pub async fn open(config: StoreConfig) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(&format!(
            "sqlite://{}",
            config.database_path.display()
        ))
        .map_err(|e| StoreError::OpenFailed(e.to_string()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::OpenFailed(e.to_string()))?;

        Self::finish_open(pool, &format!("{}", config.database_path.display())).await
    }

    /// Opens an in-memory store (tests, opt-out of persistence).
    pub async fn open_in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StoreError::OpenFailed(e.to_string()))?;

        // A single connection: each in-memory connection is its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::OpenFailed(e.to_string()))?;

        Self::finish_open(pool, ":memory:").await
    }

    async fn finish_open(pool: SqlitePool, path: &str) -> StoreResult<Self> {
        MIGRATOR.run(&pool).await?;

        let store = SqliteStore { pool };
        store.clear_scope(StorageScope::Session).await?;

        info!(path = %path, "Key-value store opened");
        Ok(store)
    }

    /// Closes the underlying pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, scope: StorageScope, key: &str) -> StoreResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM kv_entries WHERE scope = ? AND key = ?")
                .bind(scope.as_str())
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value)
    }

    async fn put(&self, scope: StorageScope, key: &str, value: &str) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO kv_entries (scope, key, value, updated_at)
             VALUES (?, ?, ?, datetime('now'))
             ON CONFLICT (scope, key) DO UPDATE
             SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(scope.as_str())
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        debug!(scope = scope.as_str(), key = %key, "Stored value");
        Ok(())
    }

    async fn delete(&self, scope: StorageScope, key: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM kv_entries WHERE scope = ? AND key = ?")
            .bind(scope.as_str())
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear_scope(&self, scope: StorageScope) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM kv_entries WHERE scope = ?")
            .bind(scope.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            debug!(
                scope = scope.as_str(),
                rows = result.rows_affected(),
                "Cleared scope"
            );
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sqlite_roundtrip() {
        let store = SqliteStore::open_in_memory().await.unwrap();

        store
            .put(StorageScope::Durable, "session.credential", "{\"token\":\"t\"}")
            .await
            .unwrap();
        assert_eq!(
            store
                .get(StorageScope::Durable, "session.credential")
                .await
                .unwrap(),
            Some("{\"token\":\"t\"}".to_string())
        );
    }

    #[tokio::test]
    async fn test_put_replaces() {
        let store = SqliteStore::open_in_memory().await.unwrap();

        store.put(StorageScope::Durable, "k", "v1").await.unwrap();
        store.put(StorageScope::Durable, "k", "v2").await.unwrap();

        assert_eq!(
            store.get(StorageScope::Durable, "k").await.unwrap(),
            Some("v2".to_string())
        );
    }

    #[tokio::test]
    async fn test_clear_scope_leaves_other_scope() {
        let store = SqliteStore::open_in_memory().await.unwrap();

        store.put(StorageScope::Session, "k", "s").await.unwrap();
        store.put(StorageScope::Durable, "k", "d").await.unwrap();

        store.clear_scope(StorageScope::Session).await.unwrap();

        assert_eq!(store.get(StorageScope::Session, "k").await.unwrap(), None);
        assert_eq!(
            store.get(StorageScope::Durable, "k").await.unwrap(),
            Some("d".to_string())
        );
    }
}

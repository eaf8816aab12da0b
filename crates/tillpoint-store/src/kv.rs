//! # Key-Value Interface
//!
//! The storage seam consumed by the session manager and UI-preference
//! callers, plus the in-memory implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreResult;

// =============================================================================
// Storage Scope
// =============================================================================

/// Lifetime of a stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageScope {
    /// Lives for one application run; swept when the store is (re)opened.
    Session,
    /// Survives restarts.
    Durable,
}

impl StorageScope {
    /// Stable name used as the scope discriminator in persistent backends.
    pub const fn as_str(&self) -> &'static str {
        match self {
            StorageScope::Session => "session",
            StorageScope::Durable => "durable",
        }
    }
}

// =============================================================================
// KeyValueStore Trait
// =============================================================================

/// Scoped key-value persistence.
///
/// Values are opaque strings; callers serialize what they store. All
/// operations are infallible with respect to missing keys (`get` returns
/// `None`, `delete` of a missing key is a no-op).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads a value.
    async fn get(&self, scope: StorageScope, key: &str) -> StoreResult<Option<String>>;

    /// Writes a value, replacing any prior value under the same key.
    async fn put(&self, scope: StorageScope, key: &str, value: &str) -> StoreResult<()>;

    /// Deletes a value if present.
    async fn delete(&self, scope: StorageScope, key: &str) -> StoreResult<()>;

    /// Deletes every value in a scope.
    async fn clear_scope(&self, scope: StorageScope) -> StoreResult<()>;
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// Map-backed store.
///
/// Both scopes live in memory, so nothing survives the process; used for
/// tests and for deployments that opt out of on-disk persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<(StorageScope, String), String>>,
}

impl MemoryStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, scope: StorageScope, key: &str) -> StoreResult<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries.get(&(scope, key.to_string())).cloned())
    }

    async fn put(&self, scope: StorageScope, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.entries.write().await;
        entries.insert((scope, key.to_string()), value.to_string());
        Ok(())
    }

    async fn delete(&self, scope: StorageScope, key: &str) -> StoreResult<()> {
        let mut entries = self.entries.write().await;
        entries.remove(&(scope, key.to_string()));
        Ok(())
    }

    async fn clear_scope(&self, scope: StorageScope) -> StoreResult<()> {
        let mut entries = self.entries.write().await;
        entries.retain(|(s, _), _| *s != scope);
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
    async fn test_memory_roundtrip() {
        let store = MemoryStore::new();

        store
            .put(StorageScope::Durable, "prefs.theme", "dark")
            .await
            .unwrap();
        assert_eq!(
            store.get(StorageScope::Durable, "prefs.theme").await.unwrap(),
            Some("dark".to_string())
        );

        store.delete(StorageScope::Durable, "prefs.theme").await.unwrap();
        assert_eq!(
            store.get(StorageScope::Durable, "prefs.theme").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_scopes_are_disjoint() {
        let store = MemoryStore::new();

        store.put(StorageScope::Session, "k", "s").await.unwrap();
        store.put(StorageScope::Durable, "k", "d").await.unwrap();

        assert_eq!(
            store.get(StorageScope::Session, "k").await.unwrap(),
            Some("s".to_string())
        );
        assert_eq!(
            store.get(StorageScope::Durable, "k").await.unwrap(),
            Some("d".to_string())
        );

        store.clear_scope(StorageScope::Session).await.unwrap();
        assert_eq!(store.get(StorageScope::Session, "k").await.unwrap(), None);
        assert_eq!(
            store.get(StorageScope::Durable, "k").await.unwrap(),
            Some("d".to_string())
        );
    }

    #[tokio::test]
    async fn test_delete_missing_is_noop() {
        let store = MemoryStore::new();
        store.delete(StorageScope::Durable, "absent").await.unwrap();
    }
}

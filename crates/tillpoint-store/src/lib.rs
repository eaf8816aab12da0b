//! # tillpoint-store: Client-Side Key-Value Storage
//!
//! Durable client-side persistence for tillpoint, behind a small key-value
//! interface with two lifetimes:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storage Scopes                                   │
//! │                                                                         │
//! │  Session scope                        Durable scope                     │
//! │  ─────────────                        ─────────────                     │
//! │  • Lives for one app run              • Survives restarts               │
//! │  • Swept on store open                • SQLite on disk                  │
//! │  • Credential (non-remembered),       • Credential ("remember me"),     │
//! │    transient UI state                   UI preferences                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The [`KeyValueStore`] trait is the seam the session manager depends on;
//! [`SqliteStore`] and [`MemoryStore`] are the two implementations.

pub mod error;
pub mod kv;
pub mod sqlite;

pub use error::{StoreError, StoreResult};
pub use kv::{KeyValueStore, MemoryStore, StorageScope};
pub use sqlite::{SqliteStore, StoreConfig};

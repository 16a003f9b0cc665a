//! # Authkey Store
//!
//! Read access to the table of auth keys.
//!
//! The `KeyStore` trait is the only thing the exporter sees. A `StoreConnector`
//! produces a connected store and is what [`connect_with_retry`] drives until the
//! store comes up or the retry ceiling is hit.
//!
//! ## Backends
//!
//! - [`SqliteConnector`] / [`SqliteKeyStore`]: the `hmackeys` table in a SQLite file
//! - [`MemoryConnector`] / [`MemoryKeyStore`]: fixed records, for tests and dry runs

pub mod memory;
pub mod retry;
pub mod sqlite;

pub use memory::{MemoryConnector, MemoryKeyStore};
pub use retry::connect_with_retry;
pub use sqlite::{SqliteConnector, SqliteKeyStore, KEY_TABLE};

use async_trait::async_trait;
use authkey_core::{KeyRecord, Result};

/// Bulk read access to stored key records.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Every record in the store, in store order. No paging, no filtering.
    async fn fetch_all(&self) -> Result<Vec<KeyRecord>>;
}

/// Opens and synchronises a key store. May be called repeatedly.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    type Store: KeyStore;

    /// One connection attempt
    async fn connect(&self) -> Result<Self::Store>;

    /// Human readable target, for log lines
    fn describe(&self) -> String;
}

//! SQLite key store.
//!
//! Connecting opens an existing database file and makes sure the key table
//! exists. A missing file is never created; it counts as the store being
//! unavailable, so the retry loop keeps waiting for it.
//! Secrets may be stored as TEXT or BLOB; both come back as raw bytes.

use crate::{KeyStore, StoreConnector};
use async_trait::async_trait;
use authkey_core::{Error, KeyRecord, Result};
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Table holding one row per auth key
pub const KEY_TABLE: &str = "hmackeys";

fn store_err(e: impl std::fmt::Display) -> Error {
    Error::Store(e.to_string())
}

/// Connects to a SQLite database file
#[derive(Debug, Clone)]
pub struct SqliteConnector {
    path: PathBuf,
}

impl SqliteConnector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl StoreConnector for SqliteConnector {
    type Store = SqliteKeyStore;

    async fn connect(&self) -> Result<SqliteKeyStore> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || SqliteKeyStore::open(&path))
            .await
            .map_err(store_err)?
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }
}

/// Connected SQLite store
#[derive(Clone)]
pub struct SqliteKeyStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteKeyStore {
    /// Open an existing database and synchronise the schema
    pub fn open(path: &Path) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)
            .map_err(|e| Error::Store(format!("{}: {}", path.display(), e)))?;
        Self::sync_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Wrap an already open connection (in-memory databases, tests)
    pub fn from_connection(conn: Connection) -> Result<Self> {
        Self::sync_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn sync_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {KEY_TABLE} (
                tnt_addr TEXT NOT NULL,
                hmac_key BLOB NOT NULL
            );"
        ))
        .map_err(store_err)
    }

    fn read_all(conn: &Connection) -> Result<Vec<KeyRecord>> {
        let mut stmt = conn
            .prepare(&format!("SELECT tnt_addr, hmac_key FROM {KEY_TABLE} ORDER BY rowid"))
            .map_err(store_err)?;

        let rows = stmt
            .query_map([], |row| {
                let address: String = row.get(0)?;
                let secret: Value = row.get(1)?;
                Ok((address, secret))
            })
            .map_err(store_err)?;

        let mut records = Vec::new();
        for row in rows {
            let (address, secret) = row.map_err(store_err)?;
            let secret = match secret {
                Value::Blob(bytes) => bytes,
                Value::Text(text) => text.into_bytes(),
                other => {
                    return Err(Error::Store(format!(
                        "hmac_key for {address} has unsupported type {:?}",
                        other.data_type()
                    )))
                }
            };
            records.push(KeyRecord { address, secret });
        }
        Ok(records)
    }
}

#[async_trait]
impl KeyStore for SqliteKeyStore {
    async fn fetch_all(&self) -> Result<Vec<KeyRecord>> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| Error::Store("connection lock poisoned".into()))?;
            Self::read_all(&conn)
        })
        .await
        .map_err(store_err)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;

    fn seed(path: &Path, rows: &[(&str, Value)]) {
        let conn = Connection::open(path).unwrap();
        SqliteKeyStore::sync_schema(&conn).unwrap();
        for (addr, key) in rows {
            conn.execute(
                "INSERT INTO hmackeys (tnt_addr, hmac_key) VALUES (?1, ?2)",
                params![addr, key],
            )
            .unwrap();
        }
    }

    #[tokio::test]
    async fn test_connect_creates_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys.db");
        // empty database file, no schema yet
        Connection::open(&path).unwrap();

        let store = SqliteConnector::new(&path).connect().await.unwrap();
        assert!(store.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_database_is_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys.db");

        let err = SqliteConnector::new(&path).connect().await.err().unwrap();

        assert!(matches!(err, Error::Store(_)));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_fetch_all_in_store_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys.db");
        seed(
            &path,
            &[
                ("xyz", Value::Text("s2".into())),
                ("abc", Value::Blob(vec![0, 159, 146, 150])),
            ],
        );

        let store = SqliteConnector::new(&path).connect().await.unwrap();
        let records = store.fetch_all().await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0], KeyRecord::new("xyz", "s2"));
        assert_eq!(records[1], KeyRecord::new("abc", vec![0u8, 159, 146, 150]));
    }

    #[tokio::test]
    async fn test_connect_fails_in_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let connector = SqliteConnector::new(dir.path().join("missing/sub/keys.db"));
        let err = connector.connect().await.err().unwrap();
        assert!(matches!(err, Error::Store(_)));
    }

    #[tokio::test]
    async fn test_null_secret_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE hmackeys (tnt_addr TEXT NOT NULL, hmac_key BLOB);
             INSERT INTO hmackeys (tnt_addr, hmac_key) VALUES ('abc', NULL);",
        )
        .unwrap();

        let store = SqliteKeyStore::from_connection(conn).unwrap();
        let err = store.fetch_all().await.unwrap_err();
        assert!(err.to_string().contains("abc"));
    }
}

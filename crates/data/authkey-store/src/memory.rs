//! In-memory key store.
//!
//! Serves a fixed set of records. The connector can be told to fail a number of
//! times before succeeding, or forever, which is how the retry loop gets
//! exercised without a real database.

use crate::{KeyStore, StoreConnector};
use async_trait::async_trait;
use authkey_core::{Error, KeyRecord, Result};
use std::sync::atomic::{AtomicU32, Ordering};

/// Fixed list of records
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyStore {
    records: Vec<KeyRecord>,
}

impl MemoryKeyStore {
    pub fn new(records: Vec<KeyRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl KeyStore for MemoryKeyStore {
    async fn fetch_all(&self) -> Result<Vec<KeyRecord>> {
        Ok(self.records.clone())
    }
}

/// Connector handing out [`MemoryKeyStore`]s
#[derive(Debug)]
pub struct MemoryConnector {
    records: Vec<KeyRecord>,
    /// `None` never succeeds
    fail_first: Option<u32>,
    attempts: AtomicU32,
}

impl MemoryConnector {
    /// Connects on the first attempt
    pub fn new(records: Vec<KeyRecord>) -> Self {
        Self {
            records,
            fail_first: Some(0),
            attempts: AtomicU32::new(0),
        }
    }

    /// Fails `failures` times, then connects
    pub fn failing_for(records: Vec<KeyRecord>, failures: u32) -> Self {
        Self {
            fail_first: Some(failures),
            ..Self::new(records)
        }
    }

    /// Never connects
    pub fn unreachable() -> Self {
        Self {
            fail_first: None,
            ..Self::new(Vec::new())
        }
    }

    /// Connection attempts made so far
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StoreConnector for MemoryConnector {
    type Store = MemoryKeyStore;

    async fn connect(&self) -> Result<MemoryKeyStore> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        match self.fail_first {
            Some(failures) if attempt > failures => Ok(MemoryKeyStore::new(self.records.clone())),
            _ => Err(Error::Store(format!("memory store refused attempt {attempt}"))),
        }
    }

    fn describe(&self) -> String {
        format!("memory:{} records", self.records.len())
    }
}

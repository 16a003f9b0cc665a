//! Key records as read from the key store.

use std::fmt;

/// One party's authentication material.
///
/// Plain data, detached from the store that produced it.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyRecord {
    /// Identifier of the key owner
    pub address: String,
    /// Raw key material, written to disk untouched
    pub secret: Vec<u8>,
}

impl KeyRecord {
    pub fn new(address: impl Into<String>, secret: impl Into<Vec<u8>>) -> Self {
        Self {
            address: address.into(),
            secret: secret.into(),
        }
    }
}

// Secrets never reach the logs.
impl fmt::Debug for KeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRecord")
            .field("address", &self.address)
            .field("secret", &format_args!("<{} bytes>", self.secret.len()))
            .finish()
    }
}

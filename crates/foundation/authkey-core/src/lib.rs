//! # Authkey Core
//!
//! Shared vocabulary for the auth key backup tools.
//!
//! ```text
//! KEY STORE ──fetch_all──► [KeyRecord] ──write──► keys/backups/<addr>-<ms>.key
//!                                          │
//!                                          └──► [BackupStatus]
//! ```
//!
//! Every crate in the workspace reports failures through [`Error`].

pub mod record;
pub mod status;

pub use record::KeyRecord;
pub use status::{summarize, BackupStatus, BACKUP_FAILURE_MESSAGE};

use std::path::PathBuf;

/// Result type for auth key backup operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while backing up auth keys
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Key store unavailable after {attempts} attempts")]
    StoreUnavailable { attempts: u32 },

    #[error("Key store error: {0}")]
    Store(String),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Address cannot be used as a backup file name: {0:?}")]
    InvalidAddress(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap an IO error with the path it happened at
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_mentions_path() {
        let err = Error::io(
            "keys/backups/abc.key",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("keys/backups/abc.key"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_store_unavailable() {
        let err = Error::StoreUnavailable { attempts: 20 };
        assert_eq!(err.to_string(), "Key store unavailable after 20 attempts");
    }
}

//! Backup directory and file handling.
//!
//! File names are `<address>-<millis>.key`. A name already on disk is never
//! overwritten; the next free `<address>-<millis>-<n>.key` is used instead.

use authkey_core::{Error, KeyRecord, Result};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Extension of every backup file
pub const BACKUP_EXTENSION: &str = "key";

/// Upper bound on same-millisecond suffixes for one address
const MAX_SUFFIX: u32 = 1024;

/// Reject addresses that would leave the backup directory or name nothing
pub fn validate_address(address: &str) -> Result<()> {
    let bad = address.is_empty()
        || address == "."
        || address == ".."
        || address.contains(['/', '\\', '\0']);
    if bad {
        return Err(Error::InvalidAddress(address.to_string()));
    }
    Ok(())
}

/// File name for `address` at `millis`, with an optional collision suffix
pub fn backup_file_name(address: &str, millis: i64, suffix: Option<u32>) -> String {
    match suffix {
        None => format!("{address}-{millis}.{BACKUP_EXTENSION}"),
        Some(n) => format!("{address}-{millis}-{n}.{BACKUP_EXTENSION}"),
    }
}

/// Create `dir` if it does not exist yet. Anything else at that path is an error.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    if dir.exists() {
        return Err(not_a_dir(dir));
    }
    match std::fs::create_dir_all(dir) {
        Ok(()) => {
            tracing::info!(dir = %dir.display(), "created backup directory");
            Ok(())
        }
        Err(_) if dir.is_dir() => Ok(()),
        Err(e) => Err(Error::io(dir, e)),
    }
}

fn not_a_dir(dir: &Path) -> Error {
    Error::io(
        dir,
        std::io::Error::new(ErrorKind::AlreadyExists, "exists and is not a directory"),
    )
}

/// Write one record's secret into `dir`. Returns the path written.
pub fn write_backup(dir: &Path, record: &KeyRecord, millis: i64) -> Result<PathBuf> {
    validate_address(&record.address)?;

    let mut suffix = None;
    loop {
        let path = dir.join(backup_file_name(&record.address, millis, suffix));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(&record.secret)
                    .map_err(|e| Error::io(&path, e))?;
                tracing::debug!(path = %path.display(), bytes = record.secret.len(), "wrote backup");
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let next = suffix.map_or(1, |n| n + 1);
                if next > MAX_SUFFIX {
                    return Err(Error::io(&path, e));
                }
                suffix = Some(next);
            }
            Err(e) => return Err(Error::io(&path, e)),
        }
    }
}

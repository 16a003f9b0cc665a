//! Per-record backup outcomes.

use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

/// Message reported outward when a backup run fails for any reason
pub const BACKUP_FAILURE_MESSAGE: &str = "Unable to generate backups for Auth Keys.";

/// Outcome of backing up one key record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupStatus {
    /// Address of the record that was backed up
    pub address: String,
    /// File the secret was written to
    pub path: PathBuf,
}

impl BackupStatus {
    pub fn new(address: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            address: address.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for BackupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Auth key has been backed up", self.address)
    }
}

// Serialized as the human readable status line.
impl Serialize for BackupStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Join the addresses of a run into the consolidated summary list.
pub fn summarize(statuses: &[BackupStatus]) -> String {
    statuses
        .iter()
        .map(|s| s.address.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line() {
        let status = BackupStatus::new("abc", "keys/backups/abc-1.key");
        assert_eq!(status.to_string(), "abc Auth key has been backed up");
    }

    #[test]
    fn test_serializes_as_status_line() {
        let statuses = vec![
            BackupStatus::new("abc", "a.key"),
            BackupStatus::new("xyz", "x.key"),
        ];
        let json = serde_json::to_string(&statuses).unwrap();
        assert_eq!(
            json,
            r#"["abc Auth key has been backed up","xyz Auth key has been backed up"]"#
        );
    }

    #[test]
    fn test_summarize() {
        let statuses = vec![
            BackupStatus::new("abc", "a.key"),
            BackupStatus::new("xyz", "x.key"),
        ];
        assert_eq!(summarize(&statuses), "abc, xyz");
        assert_eq!(summarize(&[]), "");
    }
}

//! # Authkey Config
//!
//! Layered configuration: built-in defaults, then an optional YAML file named by
//! `AUTHKEY_BACKUP_CONFIG`, then individual environment overrides.
//!
//! ```yaml
//! database_path: /var/lib/authkeys/authkeys.db
//! base_dir: keys
//! backup_subdir: backups
//! retry:
//!   max_attempts: 20
//!   delay_ms: 5000
//! http_bind: 127.0.0.1:8080
//! ```

use authkey_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Env var naming the YAML config file
pub const CONFIG_FILE_ENV: &str = "AUTHKEY_BACKUP_CONFIG";

/// Connection retry policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Attempts before the store is declared unreachable
    pub max_attempts: u32,
    /// Constant wait between attempts (ms)
    pub delay_ms: u64,
}

impl RetryPolicy {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            delay_ms: 5_000,
        }
    }
}

/// Backup tool configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// SQLite database holding the key table
    pub database_path: PathBuf,
    /// Base directory, relative to the working directory
    pub base_dir: PathBuf,
    /// Subdirectory of `base_dir` receiving backup files
    pub backup_subdir: PathBuf,
    /// Store connection retries
    pub retry: RetryPolicy,
    /// Bind address for the HTTP adapter
    pub http_bind: String,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("authkeys.db"),
            base_dir: PathBuf::from("keys"),
            backup_subdir: PathBuf::from("backups"),
            retry: RetryPolicy::default(),
            http_bind: "127.0.0.1:8080".to_string(),
        }
    }
}

impl BackupConfig {
    /// Load from the process environment
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load using a custom variable lookup
    pub fn load_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_FILE_ENV) {
            Some(path) => Self::from_yaml_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(lookup)?;
        Ok(config)
    }

    /// Read a YAML file. Missing keys keep their defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), "loaded backup config");
        Ok(config)
    }

    /// Apply `AUTHKEY_*` overrides
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("AUTHKEY_DB_PATH") {
            self.database_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("AUTHKEY_BACKUP_BASE_DIR") {
            self.base_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("AUTHKEY_BACKUP_SUBDIR") {
            self.backup_subdir = PathBuf::from(v);
        }
        if let Some(v) = lookup("AUTHKEY_RETRY_MAX") {
            self.retry.max_attempts = parse_number("AUTHKEY_RETRY_MAX", &v)?;
        }
        if let Some(v) = lookup("AUTHKEY_RETRY_DELAY_MS") {
            self.retry.delay_ms = parse_number("AUTHKEY_RETRY_DELAY_MS", &v)?;
        }
        if let Some(v) = lookup("AUTHKEY_HTTP_BIND") {
            self.http_bind = v;
        }
        Ok(())
    }

    /// Directory the backup files land in
    pub fn backup_dir(&self) -> PathBuf {
        self.base_dir.join(&self.backup_subdir)
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{name} must be a non-negative integer, got {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = BackupConfig::load_with(env(&[])).unwrap();
        assert_eq!(config, BackupConfig::default());
        assert_eq!(config.backup_dir(), PathBuf::from("keys/backups"));
        // the database is not inside the tree the exporter creates
        assert!(!config.database_path.starts_with(&config.base_dir));
        assert_eq!(config.retry.max_attempts, 20);
        assert_eq!(config.retry.delay(), Duration::from_secs(5));
    }

    #[test]
    fn test_env_overrides() {
        let config = BackupConfig::load_with(env(&[
            ("AUTHKEY_DB_PATH", "/tmp/keys.db"),
            ("AUTHKEY_BACKUP_BASE_DIR", "/srv/keys"),
            ("AUTHKEY_RETRY_MAX", "3"),
            ("AUTHKEY_RETRY_DELAY_MS", "10"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/keys.db"));
        assert_eq!(config.backup_dir(), PathBuf::from("/srv/keys/backups"));
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay_ms, 10);
    }

    #[test]
    fn test_bad_number_rejected() {
        let err = BackupConfig::load_with(env(&[("AUTHKEY_RETRY_MAX", "many")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_yaml_then_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.yaml");
        std::fs::write(
            &path,
            "base_dir: /data/keys\nretry:\n  delay_ms: 250\n",
        )
        .unwrap();

        let path_str = path.to_string_lossy().to_string();
        let config = BackupConfig::load_with(env(&[
            (CONFIG_FILE_ENV, path_str.as_str()),
            ("AUTHKEY_BACKUP_SUBDIR", "nightly"),
        ]))
        .unwrap();

        assert_eq!(config.backup_dir(), PathBuf::from("/data/keys/nightly"));
        assert_eq!(config.retry.delay_ms, 250);
        // untouched by the file
        assert_eq!(config.retry.max_attempts, 20);
    }

    #[test]
    fn test_missing_yaml_file() {
        let err = BackupConfig::from_yaml_file("/nonexistent/backup.yaml").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}

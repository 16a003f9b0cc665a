//! # Authkey Export
//!
//! One-shot backup of every key in a [`KeyStore`].
//!
//! ```text
//! fetch_all ──► ensure keys/ ──► ensure keys/backups/ ──► write <addr>-<ms>.key  (per record)
//! ```
//!
//! Any failure aborts the run with a single error. Files already written stay
//! on disk.
//!
//! ```ignore
//! let exporter = BackupExporter::from_config(&config);
//! let statuses = exporter.export(&store).await?;
//! println!("{}", authkey_core::summarize(&statuses));
//! ```

pub mod files;

pub use files::{backup_file_name, validate_address, BACKUP_EXTENSION};

use authkey_config::BackupConfig;
use authkey_core::{BackupStatus, Result};
use authkey_store::KeyStore;
use std::path::{Path, PathBuf};

type Clock = Box<dyn Fn() -> i64 + Send + Sync>;

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Writes key records into a backup directory
pub struct BackupExporter {
    base_dir: PathBuf,
    backup_dir: PathBuf,
    clock: Clock,
}

impl BackupExporter {
    /// `base_dir/backup_subdir` receives the files
    pub fn new(base_dir: impl Into<PathBuf>, backup_subdir: impl AsRef<Path>) -> Self {
        let base_dir = base_dir.into();
        Self {
            backup_dir: base_dir.join(backup_subdir),
            base_dir,
            clock: Box::new(now_millis),
        }
    }

    pub fn from_config(config: &BackupConfig) -> Self {
        Self::new(&config.base_dir, &config.backup_subdir)
    }

    /// Replace the millisecond clock used for file names
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Back up every record in `store`. Statuses come back in store order.
    pub async fn export<S>(&self, store: &S) -> Result<Vec<BackupStatus>>
    where
        S: KeyStore + ?Sized,
    {
        tracing::info!("Starting Auth key backups...");

        let result = self.run(store).await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "Unable to complete Auth key backup(s)");
        }
        result
    }

    async fn run<S>(&self, store: &S) -> Result<Vec<BackupStatus>>
    where
        S: KeyStore + ?Sized,
    {
        let records = store.fetch_all().await?;

        files::ensure_dir(&self.base_dir)?;
        files::ensure_dir(&self.backup_dir)?;

        let mut statuses = Vec::with_capacity(records.len());
        for record in &records {
            let path = files::write_backup(&self.backup_dir, record, (self.clock)())?;
            let status = BackupStatus::new(record.address.clone(), path);
            tracing::info!("{}", status);
            statuses.push(status);
        }

        Ok(statuses)
    }
}

/// Back up `store` into the directory layout described by `config`
pub async fn export_backups<S>(store: &S, config: &BackupConfig) -> Result<Vec<BackupStatus>>
where
    S: KeyStore + ?Sized,
{
    BackupExporter::from_config(config).export(store).await
}

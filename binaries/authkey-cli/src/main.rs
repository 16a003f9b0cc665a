//! authkey-backup
//!
//! One-shot export of every stored auth key to `keys/backups/<addr>-<ms>.key`.
//! Takes no arguments. Exit code 0 when every key was written (an empty store
//! counts), 1 on any failure.
//!
//! ## Environment
//!
//! ```text
//! AUTHKEY_BACKUP_CONFIG    YAML config file
//! AUTHKEY_DB_PATH          SQLite database, must exist [default: authkeys.db]
//! AUTHKEY_BACKUP_BASE_DIR  [default: keys]
//! AUTHKEY_BACKUP_SUBDIR    [default: backups]
//! AUTHKEY_RETRY_MAX        [default: 20]
//! AUTHKEY_RETRY_DELAY_MS   [default: 5000]
//! RUST_LOG                 log filter
//! ```

use std::process::ExitCode;

use authkey_config::BackupConfig;
use authkey_core::{summarize, BackupStatus};
use authkey_export::BackupExporter;
use authkey_store::{connect_with_retry, SqliteConnector, StoreConnector};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "authkey_backup=info,authkey_store=info,authkey_export=info".into()),
        )
        .with_target(false)
        .init();

    let config = match BackupConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let connector = SqliteConnector::new(&config.database_path);
    exit_code(run(&connector, &config).await)
}

/// Connect, then back up every key exactly once
async fn run<C: StoreConnector>(
    connector: &C,
    config: &BackupConfig,
) -> anyhow::Result<Vec<BackupStatus>> {
    let store = connect_with_retry(connector, &config.retry).await?;
    let statuses = BackupExporter::from_config(config).export(&store).await?;
    Ok(statuses)
}

fn exit_code(result: anyhow::Result<Vec<BackupStatus>>) -> ExitCode {
    match result {
        Ok(statuses) => {
            tracing::info!(
                "Key backup(s) complete for TNT addresses - {}",
                summarize(&statuses)
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Unable to complete key backup(s)");
            ExitCode::FAILURE
        }
    }
}

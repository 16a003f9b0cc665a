//! Auth key backup HTTP server
//!
//! Connects to the key store (with retries) and serves `POST /backups`.
//! Configured through `AUTHKEY_*` environment variables. Exits 1 when the store
//! never comes up or the server cannot start.

use std::process::ExitCode;
use std::sync::Arc;

use authkey_config::BackupConfig;
use authkey_export::BackupExporter;
use authkey_store::{connect_with_retry, SqliteConnector};
use authkey_web::{router, AppState};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "authkey_web=info,authkey_store=info,authkey_export=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match serve().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "authkey-web stopped");
            ExitCode::FAILURE
        }
    }
}

async fn serve() -> anyhow::Result<()> {
    let config = BackupConfig::load()?;

    let connector = SqliteConnector::new(&config.database_path);
    let store = connect_with_retry(&connector, &config.retry).await?;

    let state = Arc::new(AppState::new(
        Arc::new(store),
        BackupExporter::from_config(&config),
    ));
    let app = router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.http_bind).await?;
    tracing::info!(bind = %config.http_bind, "authkey-web listening");
    axum::serve(listener, app).await?;

    Ok(())
}

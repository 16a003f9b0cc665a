//! # Authkey Web
//!
//! HTTP adapter over the backup exporter.
//!
//! | Method | Path       | 200                          | 500                      |
//! |--------|------------|------------------------------|--------------------------|
//! | POST   | `/backups` | JSON array of status lines   | JSON string failure text |
//! | GET    | `/health`  | `{"status":"ok"}`            |                          |

use std::sync::Arc;

use authkey_core::BACKUP_FAILURE_MESSAGE;
use authkey_export::BackupExporter;
use authkey_store::KeyStore;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde_json::json;

pub struct AppState {
    pub store: Arc<dyn KeyStore>,
    pub exporter: BackupExporter,
}

impl AppState {
    pub fn new(store: Arc<dyn KeyStore>, exporter: BackupExporter) -> Self {
        Self { store, exporter }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/backups", post(create_backups))
        .route("/health", get(health))
        .with_state(state)
}

async fn create_backups(State(state): State<Arc<AppState>>) -> Response {
    match state.exporter.export(state.store.as_ref()).await {
        Ok(statuses) => {
            tracing::info!(count = statuses.len(), "backup request complete");
            (StatusCode::OK, Json(statuses)).into_response()
        }
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(BACKUP_FAILURE_MESSAGE),
        )
            .into_response(),
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

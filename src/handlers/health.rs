use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db;
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageStatus {
    Connected,
    Unavailable,
    NotConfigured,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub name: String,
    pub version: String,
    pub debug: bool,
    pub timezone: String,
    pub storage: StorageStatus,
    pub business_count: Option<u64>,
    pub checked_at: DateTime<Utc>,
}

/// Report configuration and whether storage answers; the API keeps serving
/// sample data either way.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (storage, business_count) = match state.businesses.storage() {
        None => (StorageStatus::NotConfigured, None),
        Some(conn) => match db::count_businesses(conn, state.businesses.query_timeout()).await {
            Ok(count) => (StorageStatus::Connected, Some(count)),
            Err(e) => {
                tracing::warn!(error = %e, "Storage health check failed");
                (StorageStatus::Unavailable, None)
            }
        },
    };

    let app = &state.config.app;
    Json(HealthResponse {
        name: app.name.clone(),
        version: app.version.clone(),
        debug: app.debug,
        timezone: app.timezone.clone(),
        storage,
        business_count,
        checked_at: Utc::now(),
    })
}

//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::AppState;

/// Health check response
///
/// Reports module identity plus the state of the snapshot store, so a stalled
/// poller shows up as an old `last_commit`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub build: String,
    pub tracks: usize,
    pub commits: u64,
    pub last_commit: Option<DateTime<Utc>>,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = state.store.status().await;

    Json(HealthResponse {
        status: "ok".to_string(),
        module: "djbuddy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        build: env!("GIT_HASH").to_string(),
        tracks: store.tracks,
        commits: store.commits,
        last_commit: store.last_commit,
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

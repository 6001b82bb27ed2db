//! djbuddy library
//!
//! Polls the Mixxx library for the current DJ session and publishes it as JSON
//! for a local display page.

use axum::Router;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod poller;
pub mod snapshot;

pub use poller::{PollOutcome, Poller, PollerConfig};
pub use snapshot::{SnapshotStore, TrackRecord, TrackSnapshot};

/// Application state shared across HTTP handlers
///
/// Holds only the snapshot store; handlers never see the database.
#[derive(Clone)]
pub struct AppState {
    pub store: SnapshotStore,
}

impl AppState {
    /// Create new application state
    pub fn new(store: SnapshotStore) -> Self {
        Self { store }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .route("/api/data", get(api::get_tracks))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

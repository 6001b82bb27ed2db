//! Snapshot publisher
//!
//! `GET /api/data` returns whatever the poller committed last. It never touches
//! the database.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::AppState;

/// GET /api/data
///
/// Current track snapshot as a JSON array.
pub async fn get_tracks(State(state): State<AppState>) -> Response {
    let snapshot = state.store.current().await;
    json_response(&*snapshot)
}

/// Serialize outside any lock; failures become a 500 with no internal detail
fn json_response<T: Serialize + ?Sized>(value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Err(e) => PublishError::Serialization(e).into_response(),
    }
}

/// Publisher errors
#[derive(Debug)]
pub enum PublishError {
    Serialization(serde_json::Error),
}

impl IntoResponse for PublishError {
    fn into_response(self) -> Response {
        match self {
            PublishError::Serialization(e) => {
                error!("Failed to encode snapshot as JSON: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal error" })),
                )
                    .into_response()
            }
        }
    }
}

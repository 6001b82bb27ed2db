//! HTTP API handlers for djbuddy

pub mod health;
pub mod tracks;
pub mod ui;

pub use health::health_routes;
pub use tracks::get_tracks;
pub use ui::{serve_app_js, serve_index};

//! HTTP API module
//!
//! Every route forwards one user intent into the engine and answers with the
//! resulting snapshot.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/state", get(state_handler))
        .route("/events", get(events_handler))
        .route("/toggle", post(toggle_handler))
        .route("/next", post(next_handler))
        .route("/tap", post(tap_handler))
        .route("/skip", post(skip_handler))
        .route("/reverse", post(reverse_handler))
        .route("/undo", post(undo_handler))
        .route("/reset", post(reset_request_handler))
        .route("/reset/confirm", post(reset_confirm_handler))
        .route("/reset/cancel", post(reset_cancel_handler))
        .route("/players", post(add_player_handler).delete(remove_player_handler))
        .route("/players/:index/name", put(rename_player_handler))
        .route("/players/:index/time", put(set_player_time_handler))
        .route("/players/:index/color", put(set_player_color_handler))
        .route("/toggles", put(toggles_handler))
        .route("/intent", post(intent_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
#[path = "tests/router_tests.rs"]
mod tests;

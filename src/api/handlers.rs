//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use tokio_stream::{wrappers::WatchStream, Stream, StreamExt};
use tracing::error;

use crate::{
    engine::Intent,
    state::{AppState, Applied},
};
use super::responses::{
    ColorRequest, HealthResponse, IntentResponse, RenameRequest, StatusResponse, TimeRequest,
    TogglesRequest,
};

/// Turn an engine outcome into the JSON reply
fn reply(
    state: &AppState,
    action: &str,
    result: Result<Applied, String>,
) -> Result<Json<IntentResponse>, StatusCode> {
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Failed to apply {}: {}", action, e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let reset_pending = match state.is_reset_pending() {
        Ok(pending) => pending,
        Err(e) => {
            error!("Failed to read reset confirmation: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    Ok(Json(IntentResponse::new(
        action,
        outcome.applied,
        reset_pending,
        outcome.snapshot,
    )))
}

fn dispatch(state: &AppState, intent: Intent) -> Result<Json<IntentResponse>, StatusCode> {
    let action = intent.label();
    reply(state, action, state.dispatch(intent))
}

/// Handle POST /toggle - Start or pause the clock
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> Result<Json<IntentResponse>, StatusCode> {
    dispatch(&state, Intent::ToggleRunning)
}

/// Handle POST /next - Hand the turn to the next player
pub async fn next_handler(State(state): State<Arc<AppState>>) -> Result<Json<IntentResponse>, StatusCode> {
    dispatch(&state, Intent::AdvanceTurn)
}

/// Handle POST /tap - Board tap, advances only while running
pub async fn tap_handler(State(state): State<Arc<AppState>>) -> Result<Json<IntentResponse>, StatusCode> {
    dispatch(&state, Intent::Tap)
}

/// Handle POST /skip - Pass over the next player
pub async fn skip_handler(State(state): State<Arc<AppState>>) -> Result<Json<IntentResponse>, StatusCode> {
    dispatch(&state, Intent::SkipTurn)
}

/// Handle POST /reverse - Flip rotation direction
pub async fn reverse_handler(State(state): State<Arc<AppState>>) -> Result<Json<IntentResponse>, StatusCode> {
    dispatch(&state, Intent::ReverseDirection)
}

/// Handle POST /undo - Rewind the last rotation
pub async fn undo_handler(State(state): State<Arc<AppState>>) -> Result<Json<IntentResponse>, StatusCode> {
    dispatch(&state, Intent::UndoTurn)
}

/// Handle POST /reset - Ask for reset confirmation
pub async fn reset_request_handler(State(state): State<Arc<AppState>>) -> Result<Json<IntentResponse>, StatusCode> {
    reply(&state, "reset-request", state.request_reset())
}

/// Handle POST /reset/confirm - Reset the table if confirmation is open
pub async fn reset_confirm_handler(State(state): State<Arc<AppState>>) -> Result<Json<IntentResponse>, StatusCode> {
    reply(&state, "reset", state.confirm_reset())
}

/// Handle POST /reset/cancel - Dismiss reset confirmation
pub async fn reset_cancel_handler(State(state): State<Arc<AppState>>) -> Result<Json<IntentResponse>, StatusCode> {
    reply(&state, "reset-cancel", state.cancel_reset())
}

/// Handle POST /players - Add a player at the end of the rotation
pub async fn add_player_handler(State(state): State<Arc<AppState>>) -> Result<Json<IntentResponse>, StatusCode> {
    dispatch(&state, Intent::AddPlayer)
}

/// Handle DELETE /players - Remove the last player
pub async fn remove_player_handler(State(state): State<Arc<AppState>>) -> Result<Json<IntentResponse>, StatusCode> {
    dispatch(&state, Intent::RemovePlayer)
}

/// Handle PUT /players/:index/name
pub async fn rename_player_handler(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
    Json(body): Json<RenameRequest>,
) -> Result<Json<IntentResponse>, StatusCode> {
    dispatch(&state, Intent::RenamePlayer { index, name: body.name })
}

/// Handle PUT /players/:index/time
pub async fn set_player_time_handler(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
    Json(body): Json<TimeRequest>,
) -> Result<Json<IntentResponse>, StatusCode> {
    dispatch(
        &state,
        Intent::SetPlayerTime { index, seconds: body.seconds.into_raw() },
    )
}

/// Handle PUT /players/:index/color
pub async fn set_player_color_handler(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
    Json(body): Json<ColorRequest>,
) -> Result<Json<IntentResponse>, StatusCode> {
    dispatch(&state, Intent::SetPlayerColor { index, color: body.color })
}

/// Handle PUT /toggles - Enable or disable reverse and skip
pub async fn toggles_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TogglesRequest>,
) -> Result<Json<IntentResponse>, StatusCode> {
    dispatch(
        &state,
        Intent::SetToggles {
            reverse_enabled: body.reverse_enabled,
            skip_enabled: body.skip_enabled,
        },
    )
}

/// Handle POST /intent - Any intent as tagged JSON.
/// A reset sent this way still goes through confirmation.
pub async fn intent_handler(
    State(state): State<Arc<AppState>>,
    Json(intent): Json<Intent>,
) -> Result<Json<IntentResponse>, StatusCode> {
    match intent {
        Intent::ResetAll => reply(&state, "reset-request", state.request_reset()),
        other => dispatch(&state, other),
    }
}

/// Handle GET /state - Current table and server status
pub async fn state_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let snapshot = match state.get_snapshot() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to get engine snapshot: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let reset_pending = match state.is_reset_pending() {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to read reset confirmation: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        state: snapshot,
        reset_pending,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /events - Stream a snapshot after every change
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let stream = WatchStream::new(state.subscribe_snapshots())
        .map(|snapshot| Event::default().event("state").json_data(&snapshot));

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

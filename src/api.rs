//! Read-only HTTP API for scoreboards and overlays that don't hold a socket.

use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;

use crate::protocol::GameSnapshot;
use crate::state::AppState;
use crate::types::GameSummary;

/// Current game state with derived fields.
///
/// GET /api/state
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<GameSnapshot> {
    Json(state.snapshot().await)
}

/// Final standings, or the standings so far while a game is running.
///
/// GET /api/summary
pub async fn get_summary(State(state): State<Arc<AppState>>) -> Json<GameSummary> {
    Json(state.game.read().await.summary())
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/state", get(get_state))
        .route("/api/summary", get(get_summary))
}

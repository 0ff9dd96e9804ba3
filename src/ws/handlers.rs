//! WebSocket message dispatch
//!
//! Every client command maps to exactly one state transition. Transitions
//! broadcast their own events; the direct reply is only used for errors and
//! requester-only answers.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::game::GameError;
use crate::state::AppState;
use std::sync::Arc;

fn reply(result: Result<(), GameError>) -> Option<ServerMessage> {
    match result {
        Ok(()) => None,
        Err(e) => {
            tracing::warn!("Rejected command: {}", e);
            Some(ServerMessage::error(e.code(), e.to_string()))
        }
    }
}

/// Setup changes are acknowledged to the sender on top of the state broadcast
fn ack<T>(result: Result<T, GameError>) -> Option<ServerMessage> {
    match result {
        Ok(_) => Some(ServerMessage::Ok),
        Err(e) => reply(Err(e)),
    }
}

/// Handle client messages and return optional response
pub async fn handle_message(msg: ClientMessage, state: &Arc<AppState>) -> Option<ServerMessage> {
    match msg {
        // Setup
        ClientMessage::SetPlayerName { index, name } => {
            ack(state.update_settings(|g| g.set_player_name(index, &name)).await)
        }

        ClientMessage::SetTimerDuration { seconds } => {
            ack(state.update_settings(|g| g.set_timer_duration(seconds)).await)
        }

        ClientMessage::SetTotalRounds { rounds } => {
            ack(state.update_settings(|g| g.set_total_rounds(rounds)).await)
        }

        ClientMessage::SetAutoListen { enabled } => {
            ack(state.update_settings(|g| g.set_auto_listen(enabled)).await)
        }

        ClientMessage::SetInvalidWordPolicy { policy } => {
            ack(state.update_settings(|g| g.set_invalid_word_policy(policy)).await)
        }

        // Lifecycle
        ClientMessage::StartGame => reply(state.start_game().await),
        ClientMessage::PauseGame => reply(state.pause_game().await),
        ClientMessage::ResumeGame => reply(state.resume_game().await),
        ClientMessage::RestartGame => {
            state.restart_game().await;
            None
        }
        ClientMessage::NewGame => {
            state.new_game().await;
            None
        }

        // Turn
        ClientMessage::SetCurrentWord { text } => reply(state.set_current_word(&text).await),

        ClientMessage::CheckWord { word } => Some(state.check_word(&word).await),

        ClientMessage::SubmitWord { word } => match state.begin_submission(&word).await {
            Ok(pending) => {
                // Lookup runs off the socket loop so pause/restart stay responsive
                let state = state.clone();
                tokio::spawn(async move {
                    let _ = state.complete_submission(pending).await;
                });
                None
            }
            Err(e) => reply(Err(e)),
        },

        ClientMessage::ClearValidation => {
            state.clear_validation().await;
            None
        }

        ClientMessage::GetState => Some(ServerMessage::State {
            game: state.snapshot().await,
        }),
    }
}

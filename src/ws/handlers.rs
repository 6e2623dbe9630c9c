//! Client message dispatch.
//!
//! Precondition violations (guessing as the drawer, drawing as a guesser,
//! starting the game without host privilege) are silent no-ops: the UI is
//! expected to prevent them, and surfacing errors for them would only reward
//! hand-crafted clients with feedback. Missing entities and lobby mistakes
//! are answered with coded errors.

use crate::hint;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::scheduler;
use crate::state::{AdvanceReason, AppState, GuessOutcome, RoomState};
use crate::types::*;
use std::sync::Arc;

/// Macro to silently drop a request whose precondition does not hold
macro_rules! ensure {
    ($cond:expr, $why:expr) => {
        if !$cond {
            tracing::debug!("ignoring request: {}", $why);
            return None;
        }
    };
}

/// Handle a client message and return an optional direct reply. Most effects
/// reach the client through the room broadcast instead.
pub async fn handle_message(
    msg: ClientMessage,
    state: &Arc<AppState>,
    room: &Arc<RoomState>,
    player_id: &PlayerId,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::UpdateProfile { name, avatar } => {
            match state.update_profile(room, player_id, name, avatar).await {
                Ok(_) => None,
                Err(e) => Some(ServerMessage::Error {
                    code: "PROFILE_UPDATE_FAILED".to_string(),
                    msg: e,
                }),
            }
        }

        ClientMessage::StartGame => {
            ensure!(
                is_host(room, player_id).await,
                "only the host can start the game"
            );
            match state.start_game(room).await {
                Ok(_) => {
                    scheduler::spawn_turn_loop(state.clone(), room.clone()).await;
                    None
                }
                Err(e) => Some(ServerMessage::Error {
                    code: "START_FAILED".to_string(),
                    msg: e,
                }),
            }
        }

        ClientMessage::Guess { text } => match state.submit_guess(room, player_id, &text).await {
            Ok(GuessOutcome::Correct {
                all_guessed: true, ..
            }) => {
                // Everyone solved it: advance now instead of waiting for the
                // deadline. The engine re-verifies under its own lock.
                if let Err(e) = state.advance_turn(room, AdvanceReason::AllGuessed).await {
                    tracing::warn!("early turn advance failed: {}", e);
                }
                None
            }
            Ok(_) => None,
            Err(e) => Some(ServerMessage::Error {
                code: "GUESS_FAILED".to_string(),
                msg: e,
            }),
        },

        ClientMessage::Draw { point } => {
            ensure!(
                is_drawer(room, player_id).await,
                "only the current drawer may draw"
            );
            state.append_stroke(room, point).await;
            None
        }

        ClientMessage::ClearCanvas => {
            ensure!(
                is_drawer(room, player_id).await,
                "only the current drawer may clear the canvas"
            );
            state.append_stroke(room, DrawingPoint::Clear).await;
            None
        }

        ClientMessage::RequestHint => handle_request_hint(state, room).await,
    }
}

/// Fetch a hint for the room and post it to the chat. Degrades to canned
/// strings when no guesses exist yet or no provider is configured.
async fn handle_request_hint(
    state: &Arc<AppState>,
    room: &Arc<RoomState>,
) -> Option<ServerMessage> {
    let recent = state.recent_guesses(room, 5).await;

    let text = match &state.hint {
        Some(manager) => manager.hint_for("A player's drawing", &recent).await,
        None if recent.is_empty() => hint::NO_GUESSES_HINT.to_string(),
        None => hint::FALLBACK_HINT.to_string(),
    };

    state
        .append_message(room, MessageKind::Hint, None, text)
        .await;
    None
}

async fn is_host(room: &Arc<RoomState>, player_id: &PlayerId) -> bool {
    room.players
        .read()
        .await
        .iter()
        .any(|p| &p.id == player_id && p.is_host)
}

async fn is_drawer(room: &Arc<RoomState>, player_id: &PlayerId) -> bool {
    let game = room.game.read().await;
    game.status == GameStatus::Playing && game.current_drawer_id.as_ref() == Some(player_id)
}

//! Game turn engine.
//!
//! Owns the authoritative game document of each room: status, secret word,
//! drawer, round counter, turn deadline and the correct-guesser set. All
//! transitions run inside one critical section over the game document (with
//! the player list read under the same section), so duplicated or stale
//! triggers from timers and early-completion signals are tolerated rather
//! than prevented.

use super::{AppState, RoomState};
use crate::protocol::ServerMessage;
use crate::types::*;
use crate::words;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Why a turn advance was requested. The engine re-validates the reason
/// under the game lock, which is what makes stale triggers harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceReason {
    /// A scheduled deadline elapsed; carries the deadline the timer was
    /// armed for so a rescheduled turn invalidates it.
    DeadlineElapsed(DateTime<Utc>),
    /// The guess engine observed that every non-drawer solved the word.
    AllGuessed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// A new turn began with a fresh drawer, word and deadline
    Advanced,
    /// The round limit was exceeded; the game is over
    Ended,
    /// Stale or redundant trigger; nothing changed
    Skipped,
}

/// True when the correct-guesser set covers every non-drawer player.
pub(super) fn all_non_drawers_guessed(game: &Game, players: &[Player]) -> bool {
    let non_drawers = players
        .iter()
        .filter(|p| Some(&p.id) != game.current_drawer_id.as_ref())
        .count();
    non_drawers > 0 && game.correct_guessers.len() >= non_drawers
}

impl AppState {
    /// The only legal status moves. Never backward, never ended to playing.
    fn is_valid_status_transition(from: GameStatus, to: GameStatus) -> bool {
        use GameStatus::*;
        matches!((from, to), (Waiting, Playing) | (Playing, Ended))
    }

    /// Move a room from the lobby into play. Host-only (checked at the
    /// dispatch layer); requires at least two players.
    pub async fn start_game(&self, room: &Arc<RoomState>) -> Result<Game, String> {
        let (snapshot, drawer) = {
            let mut game = room.game.write().await;
            let players = room.players.read().await;

            if !Self::is_valid_status_transition(game.status, GameStatus::Playing) {
                return Err(format!("Cannot start game from {:?} status", game.status));
            }
            if players.len() < 2 {
                return Err("Need at least 2 players to start".to_string());
            }

            let drawer = players[0].clone();
            game.status = GameStatus::Playing;
            game.round = 1;
            game.current_word = words::random_word().to_string();
            game.current_drawer_id = Some(drawer.id.clone());
            game.turn_ends_at = Some(self.next_deadline());
            game.correct_guessers.clear();
            (game.clone(), drawer)
        };

        self.begin_turn_side_effects(room, &drawer).await;
        Ok(snapshot)
    }

    /// Advance to the next turn, or end the game once the drawer rotation
    /// has completed the configured number of rounds.
    pub async fn advance_turn(
        &self,
        room: &Arc<RoomState>,
        reason: AdvanceReason,
    ) -> Result<TurnOutcome, String> {
        let (outcome, next_drawer) = {
            let mut game = room.game.write().await;
            let players = room.players.read().await;

            if game.status != GameStatus::Playing {
                return Ok(TurnOutcome::Skipped);
            }
            match reason {
                AdvanceReason::DeadlineElapsed(deadline)
                    if game.turn_ends_at != Some(deadline) =>
                {
                    // A newer turn rescheduled the deadline; this timer is stale.
                    return Ok(TurnOutcome::Skipped);
                }
                AdvanceReason::AllGuessed if !all_non_drawers_guessed(&game, &players) => {
                    return Ok(TurnOutcome::Skipped);
                }
                _ => {}
            }
            if players.is_empty() {
                return Err("No players in room".to_string());
            }

            let current_index = game
                .current_drawer_id
                .as_ref()
                .and_then(|id| players.iter().position(|p| &p.id == id));
            let next_index = current_index.map(|i| (i + 1) % players.len()).unwrap_or(0);

            // Wrapping back to (or before) the current drawer means the
            // rotation completed a full pass.
            let mut round = game.round;
            if let Some(current) = current_index {
                if next_index <= current {
                    round += 1;
                }
            }

            if round > self.config.total_rounds {
                // Terminal. Word, drawer and deadline keep their final-turn
                // values; only the status moves.
                game.status = GameStatus::Ended;
                (TurnOutcome::Ended, None)
            } else {
                let next_drawer = players[next_index].clone();
                game.round = round;
                game.current_word = words::random_word().to_string();
                game.current_drawer_id = Some(next_drawer.id.clone());
                game.turn_ends_at = Some(self.next_deadline());
                game.correct_guessers.clear();
                (TurnOutcome::Advanced, Some(next_drawer))
            }
        };

        match (outcome, next_drawer) {
            (TurnOutcome::Advanced, Some(drawer)) => {
                self.begin_turn_side_effects(room, &drawer).await;
            }
            (TurnOutcome::Ended, _) => {
                self.broadcast_game_state(room).await;
            }
            _ => {}
        }
        Ok(outcome)
    }

    fn next_deadline(&self) -> DateTime<Utc> {
        Utc::now() + Duration::seconds(self.config.turn_seconds as i64)
    }

    /// Best-effort side effects of a committed turn transition: seed the
    /// canvas with a clear tombstone, announce the drawer, push the new
    /// state. None of these can roll the transition back.
    async fn begin_turn_side_effects(&self, room: &Arc<RoomState>, drawer: &Player) {
        self.append_stroke(room, DrawingPoint::Clear).await;
        self.append_message(
            room,
            MessageKind::System,
            None,
            format!("{} is now drawing!", drawer.name),
        )
        .await;
        self.broadcast_game_state(room).await;
    }

    /// Broadcast the game document with the secret word masked. The
    /// connection layer re-personalizes it for drawers and solvers.
    pub async fn broadcast_game_state(&self, room: &Arc<RoomState>) {
        let mut game = room.game.read().await.clone();
        if game.status == GameStatus::Playing {
            game.current_word = "*".repeat(game.current_word.chars().count());
        }
        room.send(ServerMessage::GameState {
            game,
            server_now: Utc::now().to_rfc3339(),
        });
    }
}

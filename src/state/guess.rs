//! Guess evaluation and scoring.
//!
//! A correct guess awards the guesser a base amount plus a time bonus that
//! decays linearly to zero at the deadline, and the drawer a flat amount for
//! every correct guesser. The award, the correct-guesser membership check
//! and the score mutations all happen in one critical section over the game
//! document, which is what guarantees at-most-one award per player and turn.

use super::game::all_non_drawers_guessed;
use super::{AppState, RoomState};
use crate::protocol::ServerMessage;
use crate::types::*;
use chrono::Utc;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    /// Text did not match; a guess message was appended
    Incorrect,
    /// Correct guess scored. `all_guessed` means every non-drawer has now
    /// solved the word and the turn should advance immediately.
    Correct { points: u32, all_guessed: bool },
    /// Precondition violation or duplicate submission; nothing happened
    Ignored,
}

/// Linear time bonus: full `max_bonus` at turn start, zero at the deadline.
pub(super) fn time_bonus(remaining_ms: i64, turn_ms: i64, max_bonus: u32) -> u32 {
    if turn_ms <= 0 || remaining_ms <= 0 {
        return 0;
    }
    let remaining = remaining_ms.min(turn_ms);
    ((remaining * max_bonus as i64) / turn_ms) as u32
}

impl AppState {
    /// Evaluate a chat guess against the live game document.
    ///
    /// The comparison happens under the game write lock, so a guess racing a
    /// turn transition is evaluated against the new word and can never award
    /// points against a stale one.
    pub async fn submit_guess(
        &self,
        room: &Arc<RoomState>,
        player_id: &PlayerId,
        text: &str,
    ) -> Result<GuessOutcome, String> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(GuessOutcome::Ignored);
        }

        let mut game = room.game.write().await;
        if game.status != GameStatus::Playing {
            return Ok(GuessOutcome::Ignored);
        }
        if game.current_drawer_id.as_ref() == Some(player_id) {
            // The drawer cannot guess their own word.
            return Ok(GuessOutcome::Ignored);
        }

        let correct = text.to_lowercase() == game.current_word.to_lowercase();

        if !correct {
            let name = {
                let players = room.players.read().await;
                players
                    .iter()
                    .find(|p| &p.id == player_id)
                    .map(|p| p.name.clone())
                    .ok_or("Player not found")?
            };
            drop(game);
            self.append_message(room, MessageKind::Guess, Some((player_id, name.as_str())), text)
                .await;
            return Ok(GuessOutcome::Incorrect);
        }

        if game.correct_guessers.contains(player_id) {
            // Duplicate submission (double click, retry): at most one award
            // per player and turn.
            return Ok(GuessOutcome::Ignored);
        }

        let drawer_id = game
            .current_drawer_id
            .clone()
            .ok_or("No active drawer")?;

        let mut players = room.players.write().await;
        let guesser_index = players
            .iter()
            .position(|p| &p.id == player_id)
            .ok_or("Player not found")?;
        let drawer_index = players
            .iter()
            .position(|p| p.id == drawer_id)
            .ok_or("Drawer not found")?;

        let remaining_ms = game
            .turn_ends_at
            .map(|deadline| (deadline - Utc::now()).num_milliseconds())
            .unwrap_or(0);
        let points = self.config.base_points
            + time_bonus(
                remaining_ms,
                self.config.turn_seconds as i64 * 1000,
                self.config.max_time_bonus,
            );

        players[guesser_index].score += points;
        players[drawer_index].score += self.config.drawer_points;
        game.correct_guessers.push(player_id.clone());

        let all_guessed = all_non_drawers_guessed(&game, &players);
        let guesser_name = players[guesser_index].name.clone();
        let snapshot = players.clone();
        drop(players);
        drop(game);

        self.append_message(
            room,
            MessageKind::Correct,
            Some((player_id, guesser_name.as_str())),
            format!("{} guessed the word!", guesser_name),
        )
        .await;
        room.send(ServerMessage::PlayersUpdate { players: snapshot });
        self.broadcast_game_state(room).await;

        Ok(GuessOutcome::Correct {
            points,
            all_guessed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn playing_room(
        state: &AppState,
        code: &str,
        count: usize,
    ) -> (Arc<RoomState>, Vec<Player>, String) {
        let mut players = Vec::new();
        let mut room = None;
        for _ in 0..count {
            let (r, p) = state.join_room(code, None).await.unwrap();
            room = Some(r);
            players.push(p);
        }
        let room = room.unwrap();
        state.start_game(&room).await.unwrap();
        let word = room.game.read().await.current_word.clone();
        (room, players, word)
    }

    async fn score_of(room: &Arc<RoomState>, id: &PlayerId) -> u32 {
        room.players
            .read()
            .await
            .iter()
            .find(|p| &p.id == id)
            .unwrap()
            .score
    }

    #[test]
    fn test_time_bonus_linear_decay() {
        // 45s of a 90s turn remaining: floor(45/90 * 50) = 25
        assert_eq!(time_bonus(45_000, 90_000, 50), 25);
        assert_eq!(time_bonus(90_000, 90_000, 50), 50);
        assert_eq!(time_bonus(0, 90_000, 50), 0);
        assert_eq!(time_bonus(-1_000, 90_000, 50), 0);
        // floor, not round
        assert_eq!(time_bonus(44_999, 90_000, 50), 24);
        // clamped if the deadline was somehow pushed out
        assert_eq!(time_bonus(120_000, 90_000, 50), 50);
        // degenerate turn length
        assert_eq!(time_bonus(1_000, 0, 50), 0);
    }

    #[tokio::test]
    async fn test_wrong_guess_appends_message_only() {
        let state = AppState::new();
        let (room, players, _word) = playing_room(&state, "WRONG", 2).await;

        let outcome = state
            .submit_guess(&room, &players[1].id, "definitely not it")
            .await
            .unwrap();
        assert_eq!(outcome, GuessOutcome::Incorrect);
        assert_eq!(score_of(&room, &players[1].id).await, 0);
        assert!(room.game.read().await.correct_guessers.is_empty());

        let messages = room.messages.read().await;
        let guess = messages.iter().find(|m| m.kind == MessageKind::Guess);
        assert_eq!(guess.unwrap().text, "definitely not it");
    }

    #[tokio::test]
    async fn test_correct_guess_awards_both_sides() {
        let state = AppState::new();
        let (room, players, word) = playing_room(&state, "RIGHT", 3).await;
        let config = GameConfig::default();

        let outcome = state
            .submit_guess(&room, &players[1].id, &word.to_uppercase())
            .await
            .unwrap();
        let GuessOutcome::Correct {
            points,
            all_guessed,
        } = outcome
        else {
            panic!("expected a correct guess, got {:?}", outcome);
        };
        assert!(!all_guessed, "one non-drawer is still guessing");
        assert!(points >= config.base_points);
        assert!(points <= config.base_points + config.max_time_bonus);

        assert_eq!(score_of(&room, &players[1].id).await, points);
        assert_eq!(score_of(&room, &players[0].id).await, config.drawer_points);
        assert_eq!(
            room.game.read().await.correct_guessers,
            vec![players[1].id.clone()]
        );

        let messages = room.messages.read().await;
        let correct = messages.iter().find(|m| m.kind == MessageKind::Correct);
        assert!(correct.unwrap().text.contains("guessed the word!"));
    }

    #[tokio::test]
    async fn test_duplicate_correct_guess_is_ignored() {
        let state = AppState::new();
        let (room, players, word) = playing_room(&state, "DUPE", 3).await;

        state
            .submit_guess(&room, &players[1].id, &word)
            .await
            .unwrap();
        let guesser_score = score_of(&room, &players[1].id).await;
        let drawer_score = score_of(&room, &players[0].id).await;

        let outcome = state
            .submit_guess(&room, &players[1].id, &word)
            .await
            .unwrap();
        assert_eq!(outcome, GuessOutcome::Ignored);
        assert_eq!(score_of(&room, &players[1].id).await, guesser_score);
        assert_eq!(score_of(&room, &players[0].id).await, drawer_score);
        assert_eq!(room.game.read().await.correct_guessers.len(), 1);
    }

    #[tokio::test]
    async fn test_drawer_cannot_guess() {
        let state = AppState::new();
        let (room, players, word) = playing_room(&state, "CHEAT", 2).await;

        let outcome = state
            .submit_guess(&room, &players[0].id, &word)
            .await
            .unwrap();
        assert_eq!(outcome, GuessOutcome::Ignored);
        assert_eq!(score_of(&room, &players[0].id).await, 0);
        assert!(room.game.read().await.correct_guessers.is_empty());
        // no guess or correct message was appended
        let messages = room.messages.read().await;
        assert!(messages.iter().all(|m| m.kind == MessageKind::System));
    }

    #[tokio::test]
    async fn test_last_guesser_signals_all_guessed() {
        let state = AppState::new();
        let (room, players, word) = playing_room(&state, "SWEEP", 3).await;

        let GuessOutcome::Correct { all_guessed, .. } = state
            .submit_guess(&room, &players[1].id, &word)
            .await
            .unwrap()
        else {
            panic!("expected correct");
        };
        assert!(!all_guessed);

        let GuessOutcome::Correct { all_guessed, .. } = state
            .submit_guess(&room, &players[2].id, &word)
            .await
            .unwrap()
        else {
            panic!("expected correct");
        };
        assert!(all_guessed);

        // correct guessers never include the drawer and never exceed
        // players - 1
        let game = room.game.read().await;
        assert!(!game
            .correct_guessers
            .contains(game.current_drawer_id.as_ref().unwrap()));
        assert_eq!(game.correct_guessers.len(), players.len() - 1);
    }

    #[tokio::test]
    async fn test_drawer_earns_per_correct_guesser() {
        let state = AppState::new();
        let (room, players, word) = playing_room(&state, "FLAT", 3).await;

        state
            .submit_guess(&room, &players[1].id, &word)
            .await
            .unwrap();
        state
            .submit_guess(&room, &players[2].id, &word)
            .await
            .unwrap();

        let drawer_points = GameConfig::default().drawer_points;
        assert_eq!(score_of(&room, &players[0].id).await, drawer_points * 2);
    }

    #[tokio::test]
    async fn test_guess_outside_playing_is_ignored() {
        let state = AppState::new();
        let (room, player) = state.join_room("IDLE", None).await.unwrap();

        let outcome = state
            .submit_guess(&room, &player.id, "Star")
            .await
            .unwrap();
        assert_eq!(outcome, GuessOutcome::Ignored);
        assert!(room.messages.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_blank_guess_is_ignored() {
        let state = AppState::new();
        let (room, players, _) = playing_room(&state, "BLANK", 2).await;

        let outcome = state
            .submit_guess(&room, &players[1].id, "   ")
            .await
            .unwrap();
        assert_eq!(outcome, GuessOutcome::Ignored);
        let messages = room.messages.read().await;
        assert!(messages.iter().all(|m| m.kind == MessageKind::System));
    }

    #[tokio::test]
    async fn test_unknown_player_is_an_error() {
        let state = AppState::new();
        let (room, _, word) = playing_room(&state, "GHOST", 2).await;

        let result = state.submit_guess(&room, &"ghost".to_string(), &word).await;
        assert_eq!(result.unwrap_err(), "Player not found");
    }
}

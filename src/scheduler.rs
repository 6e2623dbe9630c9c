//! Server-owned turn scheduling.
//!
//! One watcher task per active game sleeps until the authoritative deadline
//! and fires the turn engine with the deadline it was armed for. The engine
//! treats stale or duplicated firings as no-ops, so the watcher never needs
//! to coordinate with early-completion signals: after every firing it simply
//! re-reads the live deadline and sleeps again.

use crate::state::{AdvanceReason, AppState, RoomState, TurnOutcome};
use crate::types::GameStatus;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

/// Arm the turn watcher for a room, replacing any previous one.
pub async fn spawn_turn_loop(state: Arc<AppState>, room: Arc<RoomState>) {
    let handle = tokio::spawn(turn_loop(state, room.clone()));
    let mut slot = room.turn_timer.lock().await;
    if let Some(old) = slot.replace(handle) {
        old.abort();
    }
}

async fn turn_loop(state: Arc<AppState>, room: Arc<RoomState>) {
    loop {
        let deadline = {
            let game = room.game.read().await;
            if game.status != GameStatus::Playing {
                break;
            }
            match game.turn_ends_at {
                Some(deadline) => deadline,
                None => break,
            }
        };

        let wait = (deadline - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        tokio::time::sleep(wait).await;

        match state
            .advance_turn(&room, AdvanceReason::DeadlineElapsed(deadline))
            .await
        {
            Ok(TurnOutcome::Ended) => break,
            // Advanced or Skipped: the next iteration picks up the live deadline
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("turn watcher for room {} stopped: {}", room.code, e);
                break;
            }
        }
    }
    tracing::debug!("turn watcher for room {} exited", room.code);
}

//! Append-only room message log.
//!
//! Timestamps are server-assigned on append, which is what gives the log its
//! total order. Entries are never mutated or deleted.

use super::{AppState, RoomState};
use crate::protocol::ServerMessage;
use crate::types::*;
use chrono::Utc;
use std::sync::Arc;

impl AppState {
    /// Append a message and fan it out to the room.
    pub async fn append_message(
        &self,
        room: &Arc<RoomState>,
        kind: MessageKind,
        author: Option<(&PlayerId, &str)>,
        text: impl Into<String>,
    ) -> Message {
        let message = Message {
            id: ulid::Ulid::new().to_string(),
            player_id: author.map(|(id, _)| id.clone()),
            player_name: author.map(|(_, name)| name.to_string()),
            text: text.into(),
            kind,
            ts: Utc::now(),
        };

        room.messages.write().await.push(message.clone());
        room.send(ServerMessage::Chat {
            message: message.clone(),
        });
        message
    }

    /// The texts of the most recent guess messages, oldest first.
    /// Feeds the hint service.
    pub async fn recent_guesses(&self, room: &Arc<RoomState>, limit: usize) -> Vec<String> {
        let messages = room.messages.read().await;
        let guesses: Vec<&Message> = messages
            .iter()
            .filter(|m| m.kind == MessageKind::Guess)
            .collect();
        guesses
            .iter()
            .skip(guesses.len().saturating_sub(limit))
            .map(|m| m.text.clone())
            .collect()
    }
}

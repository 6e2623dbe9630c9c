//! Room membership: join-on-first-contact, host designation, profile edits.
//!
//! Join is idempotent per identity and the only place players are created.
//! The ordered player list it maintains (by join time) is what the turn
//! engine's drawer rotation iterates.

use super::{AppState, RoomState};
use crate::protocol::ServerMessage;
use crate::types::*;
use chrono::Utc;
use rand::Rng;
use std::sync::Arc;

const AVATARS: &[&str] = &[
    "avatar-1.svg",
    "avatar-2.svg",
    "avatar-3.svg",
    "avatar-4.svg",
    "avatar-5.svg",
    "avatar-6.svg",
    "avatar-7.svg",
    "avatar-8.svg",
    "avatar-9.svg",
    "avatar-10.svg",
];

const ROOM_CODE_MAX_LEN: usize = 12;

/// Uppercase and validate a human-shareable room code.
fn normalize_room_code(code: &str) -> Result<RoomId, String> {
    let code = code.trim().to_uppercase();
    if code.is_empty() || code.len() > ROOM_CODE_MAX_LEN {
        return Err("Invalid room code".to_string());
    }
    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("Invalid room code".to_string());
    }
    Ok(code)
}

fn generate_player_name() -> String {
    petname::petname(2, "-").unwrap_or_else(|| "mystery-artist".to_string())
}

fn random_avatar() -> String {
    let mut rng = rand::rng();
    AVATARS[rng.random_range(0..AVATARS.len())].to_string()
}

impl AppState {
    /// Look up an existing room by code.
    pub async fn room(&self, code: &str) -> Option<Arc<RoomState>> {
        let code = normalize_room_code(code).ok()?;
        self.rooms.read().await.get(&code).cloned()
    }

    /// Join a room, creating it on first contact.
    ///
    /// Rejoining with a known player id returns the existing record without
    /// duplicating or resetting it. The first joiner becomes the host. Fails
    /// with "Room is full" once the player cap is reached.
    pub async fn join_room(
        &self,
        code: &str,
        player_id: Option<PlayerId>,
    ) -> Result<(Arc<RoomState>, Player), String> {
        let code = normalize_room_code(code)?;

        let room = {
            let mut rooms = self.rooms.write().await;
            rooms
                .entry(code.clone())
                .or_insert_with(|| Arc::new(RoomState::new(code)))
                .clone()
        };

        let mut players = room.players.write().await;

        if let Some(id) = &player_id {
            if let Some(existing) = players.iter().find(|p| &p.id == id) {
                return Ok((room.clone(), existing.clone()));
            }
        }

        if players.len() >= self.config.max_players {
            return Err("Room is full".to_string());
        }

        let is_host = players.is_empty();
        let player = Player {
            id: player_id.unwrap_or_else(|| ulid::Ulid::new().to_string()),
            name: generate_player_name(),
            avatar: random_avatar(),
            score: 0,
            is_host,
            joined_at: Utc::now(),
        };

        if is_host {
            let _ = room.host_id.set(player.id.clone());
        }
        players.push(player.clone());
        let snapshot = players.clone();
        drop(players);

        room.send(ServerMessage::PlayersUpdate { players: snapshot });
        Ok((room, player))
    }

    /// Change a player's display name and avatar. Scores are untouchable here.
    pub async fn update_profile(
        &self,
        room: &Arc<RoomState>,
        player_id: &PlayerId,
        name: String,
        avatar: String,
    ) -> Result<Player, String> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err("Name cannot be empty".to_string());
        }

        let mut players = room.players.write().await;
        let player = players
            .iter_mut()
            .find(|p| &p.id == player_id)
            .ok_or("Player not found")?;
        player.name = name;
        player.avatar = avatar;
        let updated = player.clone();
        let snapshot = players.clone();
        drop(players);

        room.send(ServerMessage::PlayersUpdate { players: snapshot });
        Ok(updated)
    }
}

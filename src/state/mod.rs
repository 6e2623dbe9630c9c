mod chat;
mod drawing;
mod game;
mod guess;
mod room;

pub use game::{AdvanceReason, TurnOutcome};
pub use guess::GuessOutcome;

use crate::hint::HintManager;
use crate::protocol::ServerMessage;
use crate::types::*;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;

/// Shared application state
pub struct AppState {
    pub rooms: RwLock<HashMap<RoomId, Arc<RoomState>>>,
    pub config: GameConfig,
    pub hint: Option<HintManager>,
}

/// The document set of one room.
///
/// Lock order is game, then players, then messages/drawing. Every multi-document
/// mutation (turn transition, correct-guess award) holds the game lock for
/// the whole critical section, which is what makes those operations atomic
/// with respect to each other.
#[derive(Debug)]
pub struct RoomState {
    pub code: RoomId,
    pub created_at: DateTime<Utc>,
    /// First joiner; set once, never transferred
    pub host_id: OnceLock<PlayerId>,
    pub game: RwLock<Game>,
    /// Join order, which fixes the drawer rotation
    pub players: RwLock<Vec<Player>>,
    pub messages: RwLock<Vec<Message>>,
    pub drawing: RwLock<Vec<StrokeEvent>>,
    /// Fanout channel for all clients connected to this room
    pub broadcast: broadcast::Sender<ServerMessage>,
    /// Handle of the turn watcher task, if a game is running
    pub turn_timer: Mutex<Option<JoinHandle<()>>>,
}

impl RoomState {
    pub(crate) fn new(code: RoomId) -> Self {
        let (tx, _rx) = broadcast::channel(256);
        Self {
            code,
            created_at: Utc::now(),
            host_id: OnceLock::new(),
            game: RwLock::new(Game::new()),
            players: RwLock::new(Vec::new()),
            messages: RwLock::new(Vec::new()),
            drawing: RwLock::new(Vec::new()),
            broadcast: tx,
            turn_timer: Mutex::new(None),
        }
    }

    /// Players in join order; the drawer rotation iterates this list.
    pub async fn ordered_players(&self) -> Vec<Player> {
        self.players.read().await.clone()
    }

    /// Send to every connected client; no receivers is fine.
    pub fn send(&self, msg: ServerMessage) {
        let _ = self.broadcast.send(msg);
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with(GameConfig::default(), None)
    }

    pub fn new_with_hint(hint: Option<HintManager>) -> Self {
        Self::with(GameConfig::default(), hint)
    }

    pub fn new_with_config(config: GameConfig) -> Self {
        Self::with(config, None)
    }

    fn with(config: GameConfig, hint: Option<HintManager>) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            config,
            hint,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Change own display name and avatar (lobby action; never touches score)
    UpdateProfile {
        name: String,
        avatar: String,
    },
    /// Host-only: move the room from waiting to playing
    StartGame,
    /// Submit a chat guess against the current word
    Guess {
        text: String,
    },
    /// Drawer-only: append a stroke event to the drawing log
    Draw {
        point: DrawingPoint,
    },
    /// Drawer-only: append a clear tombstone
    ClearCanvas,
    /// Ask the hint service for a nudge based on recent guesses
    RequestHint,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once after a successful join; carries the full room snapshot.
    /// `game` is already personalized for the receiving player.
    Welcome {
        protocol: String,
        room: RoomId,
        player: Player,
        game: Game,
        players: Vec<Player>,
        messages: Vec<Message>,
        drawing: Vec<StrokeEvent>,
        server_now: String,
    },
    /// Ordered player list changed (join, profile edit, score change)
    PlayersUpdate {
        players: Vec<Player>,
    },
    /// Authoritative game document changed. Broadcast with the word masked;
    /// the connection layer re-personalizes it per recipient.
    GameState {
        game: Game,
        server_now: String,
    },
    /// A message was appended to the room log
    Chat {
        message: Message,
    },
    /// A stroke event was appended to the drawing log
    Drawing {
        event: StrokeEvent,
    },
    Error {
        code: String,
        msg: String,
    },
}

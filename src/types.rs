use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type RoomId = String;
pub type PlayerId = String;
pub type MessageId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Waiting,
    Playing,
    Ended,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Length of a single drawing turn in seconds
    pub turn_seconds: u32,
    /// Number of full drawer rotations before the game ends
    pub total_rounds: u32,
    /// Maximum players per room, enforced at join time
    pub max_players: usize,
    /// Flat award for any correct guess
    pub base_points: u32,
    /// Upper bound of the linear time bonus (full bonus at turn start)
    pub max_time_bonus: u32,
    /// Flat award to the drawer for every correct guesser
    pub drawer_points: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            turn_seconds: 90,
            total_rounds: 5,
            max_players: 5,
            base_points: 50,
            max_time_bonus: 50,
            drawer_points: 25,
        }
    }
}

/// The singleton game document of a room.
///
/// Field ownership: status/current_word/current_drawer_id/round/turn_ends_at
/// belong to the turn engine; correct_guessers additions and player scores
/// belong to the guess engine. Nothing else writes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub status: GameStatus,
    pub current_word: String,
    pub current_drawer_id: Option<PlayerId>,
    /// 1-indexed while playing; 0 before the game starts
    pub round: u32,
    pub turn_ends_at: Option<DateTime<Utc>>,
    /// Players who solved the current turn's word. Cleared on every turn
    /// transition; never contains the drawer.
    pub correct_guessers: Vec<PlayerId>,
}

impl Game {
    pub fn new() -> Self {
        Self {
            status: GameStatus::Waiting,
            current_word: String::new(),
            current_drawer_id: None,
            round: 0,
            turn_ends_at: None,
            correct_guessers: Vec::new(),
        }
    }

    /// The view of the game a given player is allowed to see. While a turn is
    /// running the secret word is masked for everyone except the drawer and
    /// the players who already solved it.
    pub fn visible_to(&self, player_id: &PlayerId) -> Game {
        let mut game = self.clone();
        let may_see_word = self.status != GameStatus::Playing
            || self.current_drawer_id.as_ref() == Some(player_id)
            || self.correct_guessers.contains(player_id);
        if !may_see_word {
            game.current_word = "*".repeat(self.current_word.chars().count());
        }
        game
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub avatar: String,
    pub score: u32,
    pub is_host: bool,
    /// Fixes the deterministic drawer rotation; stable for the lifetime
    /// of the room.
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Guess,
    System,
    Hint,
    Correct,
}

/// Append-only chat entry. System and hint messages carry no author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_id: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Server-assigned; provides the total order of the log
    pub ts: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point {
    /// Normalized to the unit square, aspect-independent
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolSettings {
    pub color: String,
    pub brush_size: u32,
}

/// One entry of the append-only drawing log. A `clear` entry is a tombstone:
/// replaying readers discard everything before it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DrawingPoint {
    Start { coords: Point, settings: ToolSettings },
    Draw { coords: Point, settings: ToolSettings },
    End { coords: Point, settings: ToolSettings },
    Clear,
}

impl DrawingPoint {
    pub fn is_clear(&self) -> bool {
        matches!(self, DrawingPoint::Clear)
    }
}

/// A drawing point with its server-assigned timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrokeEvent {
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub point: DrawingPoint,
}

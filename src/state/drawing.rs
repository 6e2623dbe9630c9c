//! Drawing stream relay.
//!
//! An append-only, server-timestamped log of stroke events per room. A
//! `clear` entry is a tombstone; replaying readers reconstruct the canvas
//! from the last clear onward. No turn or scoring logic depends on the
//! content of this log.

use super::{AppState, RoomState};
use crate::protocol::ServerMessage;
use crate::types::*;
use chrono::Utc;
use std::sync::Arc;

impl AppState {
    /// Append a stroke event and fan it out to the room.
    pub async fn append_stroke(&self, room: &Arc<RoomState>, point: DrawingPoint) -> StrokeEvent {
        let event = StrokeEvent {
            ts: Utc::now(),
            point,
        };

        room.drawing.write().await.push(event.clone());
        room.send(ServerMessage::Drawing {
            event: event.clone(),
        });
        event
    }

    /// The events a late subscriber needs to reconstruct the canvas:
    /// everything after the last `clear` tombstone.
    pub async fn drawing_snapshot(&self, room: &Arc<RoomState>) -> Vec<StrokeEvent> {
        let log = room.drawing.read().await;
        match log.iter().rposition(|e| e.point.is_clear()) {
            Some(i) => log[i + 1..].to_vec(),
            None => log.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke(x: f32, y: f32) -> DrawingPoint {
        DrawingPoint::Draw {
            coords: Point { x, y },
            settings: ToolSettings {
                color: "#FFFFFF".to_string(),
                brush_size: 5,
            },
        }
    }

    #[tokio::test]
    async fn test_snapshot_replays_full_log_without_clear() {
        let state = AppState::new();
        let (room, _) = state.join_room("DRAW", None).await.unwrap();

        state.append_stroke(&room, stroke(0.1, 0.1)).await;
        state.append_stroke(&room, stroke(0.2, 0.2)).await;

        assert_eq!(state.drawing_snapshot(&room).await.len(), 2);
    }

    #[tokio::test]
    async fn test_clear_discards_prior_entries() {
        let state = AppState::new();
        let (room, _) = state.join_room("CLEAR", None).await.unwrap();

        state.append_stroke(&room, stroke(0.1, 0.1)).await;
        state.append_stroke(&room, stroke(0.2, 0.2)).await;
        state.append_stroke(&room, DrawingPoint::Clear).await;

        assert!(state.drawing_snapshot(&room).await.is_empty());

        state.append_stroke(&room, stroke(0.3, 0.3)).await;
        let snapshot = state.drawing_snapshot(&room).await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].point, stroke(0.3, 0.3));

        // the raw log itself is append-only
        assert_eq!(room.drawing.read().await.len(), 4);
    }

    #[tokio::test]
    async fn test_snapshot_uses_last_of_several_clears() {
        let state = AppState::new();
        let (room, _) = state.join_room("MULTI", None).await.unwrap();

        state.append_stroke(&room, stroke(0.1, 0.1)).await;
        state.append_stroke(&room, DrawingPoint::Clear).await;
        state.append_stroke(&room, stroke(0.2, 0.2)).await;
        state.append_stroke(&room, DrawingPoint::Clear).await;
        state.append_stroke(&room, stroke(0.4, 0.4)).await;
        state.append_stroke(&room, stroke(0.5, 0.5)).await;

        assert_eq!(state.drawing_snapshot(&room).await.len(), 2);
    }
}

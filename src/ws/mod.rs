pub mod handlers;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Shareable room code; the room is created on first contact
    pub room: Option<String>,
    /// Stable anonymous identity from a previous visit, if any
    pub player: Option<String>,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    tracing::info!(
        "WebSocket connection request: room={:?}, player={:?}",
        params.room,
        params.player
    );

    ws.on_upgrade(move |socket| handle_socket(socket, params, state))
}

/// Handle individual WebSocket connection: join the room, replay a snapshot,
/// then relay broadcasts and dispatch client messages until the socket dies.
async fn handle_socket(socket: WebSocket, params: WsQuery, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let Some(code) = params.room else {
        send_to(&mut sender, &error("MISSING_ROOM", "room query parameter is required")).await;
        return;
    };

    // Joining is the room-creating transaction: first contact creates the
    // room, the first joiner becomes host, rejoins are idempotent.
    let (room, player) = match state.join_room(&code, params.player).await {
        Ok(joined) => joined,
        Err(e) => {
            send_to(&mut sender, &error("JOIN_FAILED", &e)).await;
            return;
        }
    };

    tracing::info!("player {} connected to room {}", player.id, room.code);

    // Subscribe before snapshotting so nothing is lost in between.
    let mut broadcast_rx = room.broadcast.subscribe();

    let welcome = ServerMessage::Welcome {
        protocol: "1.0".to_string(),
        room: room.code.clone(),
        player: player.clone(),
        game: room.game.read().await.visible_to(&player.id),
        players: room.ordered_players().await,
        messages: room.messages.read().await.clone(),
        drawing: state.drawing_snapshot(&room).await,
        server_now: chrono::Utc::now().to_rfc3339(),
    };
    if !send_to(&mut sender, &welcome).await {
        return;
    }

    loop {
        tokio::select! {
            // Relay room broadcasts
            broadcast_msg = broadcast_rx.recv() => {
                match broadcast_msg {
                    Ok(msg) => {
                        // Authoritative state is re-personalized per recipient
                        // so only the drawer and solvers see the word.
                        let msg = match msg {
                            ServerMessage::GameState { .. } => ServerMessage::GameState {
                                game: room.game.read().await.visible_to(&player.id),
                                server_now: chrono::Utc::now().to_rfc3339(),
                            },
                            other => other,
                        };
                        if !send_to(&mut sender, &msg).await {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("client {} lagged, skipped {} broadcasts", player.id, skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            // Handle client messages
            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!("Received message: {}", text);

                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                if let Some(response) =
                                    handlers::handle_message(client_msg, &state, &room, &player.id).await
                                {
                                    if !send_to(&mut sender, &response).await {
                                        break;
                                    }
                                }
                            }
                            Err(e) => {
                                tracing::error!("Failed to parse client message: {}", e);
                                let reply = error("PARSE_ERROR", &format!("Invalid message format: {}", e));
                                send_to(&mut sender, &reply).await;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("WebSocket closed");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    tracing::info!("player {} disconnected from room {}", player.id, room.code);
}

fn error(code: &str, msg: &str) -> ServerMessage {
    ServerMessage::Error {
        code: code.to_string(),
        msg: msg.to_string(),
    }
}

async fn send_to(
    sender: &mut (impl SinkExt<Message> + Unpin),
    msg: &ServerMessage,
) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => sender.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            tracing::error!("Failed to serialize server message: {}", e);
            true
        }
    }
}

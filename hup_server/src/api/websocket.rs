//! WebSocket gateway for room play.
//!
//! One socket is one session. The client creates or joins a room over the
//! socket, then exchanges intents and state updates on it until it drops.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /ws`; the server assigns a session id
//! 2. Client sends `create` or `join` and is seated (or spectates)
//! 3. The server pushes a redacted `state` message after every change the
//!    room accepts; invalid intents are dropped without a reply
//! 4. On disconnect the room starts the reconnect grace clock; the same
//!    `external_key` on a fresh socket reclaims the seat
//!
//! # Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:6969/ws');
//!
//! ws.onmessage = (event) => {
//!   const data = JSON.parse(event.data);
//!   if (data.type === 'state') {
//!     renderTable(data.room);
//!   }
//! };
//!
//! ws.send(JSON.stringify({ type: 'create', name: 'alice', buy_in: 1000 }));
//! ws.send(JSON.stringify({ type: 'action', action: 'raise', raise_amount: 40 }));
//! ```

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use heads_up_poker::{
    entities::Action, view::RoomSnapshot, JoinReply, RoomHandle, RoomReply, SessionId,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{rate_limiter::RateLimiter, AppState};

/// Client messages received via WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    /// Create a fresh room and take the first seat. `external_key` is the
    /// opaque settlement identifier; it doubles as the reconnect key.
    Create {
        name: String,
        buy_in: u64,
        #[serde(default)]
        external_key: Option<String>,
    },
    /// Join a room by code. Seats the player, reclaims a disconnected seat
    /// on a matching `external_key`, or spectates when the table is full.
    Join {
        room_code: String,
        name: String,
        #[serde(default)]
        external_key: Option<String>,
    },
    /// Take a betting action. `raise_amount` is required for `raise` and
    /// ignored otherwise.
    Action {
        action: ActionKind,
        #[serde(default)]
        raise_amount: Option<u64>,
    },
    /// Spectator side wager on a seat.
    Bet {
        name: String,
        bet_on_player: usize,
        amount: u64,
        #[serde(default)]
        external_key: Option<String>,
    },
    /// Start the next hand after settlement.
    Rematch,
    /// Leave the room (mid-hand this forfeits).
    Leave,
    /// Keepalive.
    Ping,
}

/// Action verb from the client; the raise amount travels alongside it.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ActionKind {
    Fold,
    Check,
    Call,
    Raise,
    AllIn,
}

/// Whether a `join` landed in a seat or in the gallery.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum Role {
    Player,
    Spectator,
}

/// Messages sent to the client.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerResponse {
    Created {
        room_code: String,
        player_index: usize,
    },
    Joined {
        room_code: String,
        player_index: Option<usize>,
        role: Role,
    },
    State {
        room: RoomSnapshot,
    },
    Left,
    Error {
        message: String,
    },
    Pong,
}

/// Upgrade the HTTP connection to the game WebSocket.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let session_id: SessionId = Uuid::new_v4();
    let (mut sender, mut receiver) = socket.split();

    info!("WebSocket connected: session={session_id}");

    let mut burst_limiter = RateLimiter::burst();
    let mut sustained_limiter = RateLimiter::sustained();

    // Responses from the message handler, and redacted snapshots pushed by
    // whichever room this session subscribes to.
    let (response_tx, mut response_rx) = tokio::sync::mpsc::channel::<String>(32);
    let (snapshot_tx, mut snapshot_rx) = tokio::sync::mpsc::channel::<RoomSnapshot>(32);

    let send_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                Some(snapshot) = snapshot_rx.recv() => {
                    let message = ServerResponse::State { room: snapshot };
                    let json = match serde_json::to_string(&message) {
                        Ok(j) => j,
                        Err(e) => {
                            warn!("Failed to serialize room state: {e}");
                            continue;
                        }
                    };
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Some(response_json) = response_rx.recv() => {
                    if sender.send(Message::Text(response_json.into())).await.is_err() {
                        break;
                    }
                }
                else => break,
            }
        }
    });

    // The room this session is attached to, if any.
    let mut room: Option<RoomHandle> = None;

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if !burst_limiter.check() || !sustained_limiter.check() {
                    warn!("Rate limit exceeded for session {session_id}, dropping message");
                    continue;
                }

                let response = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => {
                        handle_client_message(
                            client_msg,
                            session_id,
                            &mut room,
                            &snapshot_tx,
                            &state,
                        )
                        .await
                    }
                    // Malformed messages are dropped without a reply.
                    Err(e) => {
                        warn!("Failed to parse client message: {e}");
                        None
                    }
                };

                if let Some(response) = response {
                    if let Ok(json) = serde_json::to_string(&response) {
                        if response_tx.send(json).await.is_err() {
                            break;
                        }
                    }
                }
            }
            Ok(Message::Close(_)) => {
                info!("WebSocket closed: session={session_id}");
                break;
            }
            Err(e) => {
                warn!("WebSocket error for session {session_id}: {e}");
                break;
            }
            _ => {}
        }
    }

    send_task.abort();

    // Tell the room the socket is gone; for a seated player this starts the
    // reconnect grace clock instead of forfeiting on the spot.
    if let Some(handle) = room {
        let _ = handle.disconnect(session_id).await;
    }

    info!("WebSocket disconnected: session={session_id}");
}

/// Process one client message. Returns `None` when the contract calls for
/// silence (accepted intents surface as a `state` push, rejected ones are
/// dropped).
async fn handle_client_message(
    msg: ClientMessage,
    session_id: SessionId,
    room: &mut Option<RoomHandle>,
    snapshot_tx: &tokio::sync::mpsc::Sender<RoomSnapshot>,
    state: &AppState,
) -> Option<ServerResponse> {
    match msg {
        ClientMessage::Create {
            name,
            buy_in,
            external_key,
        } => {
            if room.is_some() {
                return Some(ServerResponse::Error {
                    message: "Already in a room".to_string(),
                });
            }
            let handle = match state.registry.create_room(buy_in).await {
                Ok(h) => h,
                Err(e) => {
                    return Some(ServerResponse::Error {
                        message: e.to_string(),
                    });
                }
            };
            let key = external_key.unwrap_or_else(|| session_id.to_string());
            let reply = match handle.join(session_id, name, key).await {
                Ok(r) => r,
                Err(e) => {
                    return Some(ServerResponse::Error {
                        message: e.to_string(),
                    });
                }
            };
            let _ = handle.subscribe(session_id, snapshot_tx.clone()).await;
            let room_code = handle.code().to_string();
            *room = Some(handle);
            // The creator takes seat 0 in the freshly spawned room.
            Some(ServerResponse::Created {
                room_code,
                player_index: reply.seat().unwrap_or(0),
            })
        }

        ClientMessage::Join {
            room_code,
            name,
            external_key,
        } => {
            if room.is_some() {
                return Some(ServerResponse::Error {
                    message: "Already in a room".to_string(),
                });
            }
            let handle = match state.registry.get(&room_code).await {
                Ok(h) => h,
                Err(e) => {
                    return Some(ServerResponse::Error {
                        message: e.to_string(),
                    });
                }
            };
            let key = external_key.unwrap_or_else(|| session_id.to_string());
            let reply = match handle.join(session_id, name, key).await {
                Ok(r) => r,
                Err(e) => {
                    return Some(ServerResponse::Error {
                        message: e.to_string(),
                    });
                }
            };
            let role = match reply {
                JoinReply::Seated { .. } | JoinReply::Reclaimed { .. } => Role::Player,
                JoinReply::Spectating => {
                    info!("session {session_id} spectating room {}", handle.code());
                    Role::Spectator
                }
            };
            let _ = handle.subscribe(session_id, snapshot_tx.clone()).await;
            let room_code = handle.code().to_string();
            *room = Some(handle);
            Some(ServerResponse::Joined {
                room_code,
                player_index: reply.seat(),
                role,
            })
        }

        ClientMessage::Action {
            action,
            raise_amount,
        } => {
            let handle = room.as_ref()?;
            let action = match (action, raise_amount) {
                (ActionKind::Fold, _) => Action::Fold,
                (ActionKind::Check, _) => Action::Check,
                (ActionKind::Call, _) => Action::Call,
                (ActionKind::AllIn, _) => Action::AllIn,
                (ActionKind::Raise, Some(amount)) => Action::Raise(amount),
                // A raise with no amount is malformed and dropped.
                (ActionKind::Raise, None) => {
                    warn!("raise without raise_amount from session {session_id}");
                    return None;
                }
            };
            match handle.take_action(session_id, action).await {
                // Accepted intents surface as a state push; rejected ones
                // are silently dropped.
                Ok(RoomReply::Applied | RoomReply::Ignored) => None,
                Ok(RoomReply::NotInRoom) => Some(ServerResponse::Error {
                    message: "Not seated in this room".to_string(),
                }),
                Err(e) => Some(ServerResponse::Error {
                    message: e.to_string(),
                }),
            }
        }

        ClientMessage::Bet {
            name,
            bet_on_player,
            amount,
            external_key,
        } => {
            let handle = room.as_ref()?;
            let key = external_key.unwrap_or_else(|| session_id.to_string());
            match handle.side_wager(key, name, bet_on_player, amount).await {
                Ok(_) => None,
                Err(e) => Some(ServerResponse::Error {
                    message: e.to_string(),
                }),
            }
        }

        ClientMessage::Rematch => {
            let handle = room.as_ref()?;
            match handle.rematch(session_id).await {
                Ok(RoomReply::Applied | RoomReply::Ignored) => None,
                Ok(RoomReply::NotInRoom) => Some(ServerResponse::Error {
                    message: "Not seated in this room".to_string(),
                }),
                Err(e) => Some(ServerResponse::Error {
                    message: e.to_string(),
                }),
            }
        }

        ClientMessage::Leave => {
            let Some(handle) = room.take() else {
                return Some(ServerResponse::Error {
                    message: "Not in a room".to_string(),
                });
            };
            let _ = handle.unsubscribe(session_id).await;
            let _ = handle.leave(session_id).await;
            Some(ServerResponse::Left)
        }

        ClientMessage::Ping => Some(ServerResponse::Pong),
    }
}

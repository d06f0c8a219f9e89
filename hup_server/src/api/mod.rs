//! HTTP/WebSocket API for the room server.
//!
//! The surface is deliberately small: rooms are created and played entirely
//! over one WebSocket connection, so HTTP only carries the health check and
//! a room-existence probe for share links.
//!
//! # Endpoints
//!
//! - `GET /health` - server health and live room count (public)
//! - `GET /api/v1/rooms/{code}` - does this room code exist (public)
//! - `GET /ws` - game WebSocket; see [`websocket`] for the message protocol

pub mod rate_limiter;
pub mod websocket;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use heads_up_poker::RoomRegistry;
use serde_json::json;
use tower_http::cors::CorsLayer;

/// Shared application state, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub registry: RoomRegistry,
}

/// Create the API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/rooms/{code}", get(room_exists))
        .route("/ws", get(websocket::websocket_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "rooms": state.registry.len().await,
    }))
}

/// Probe whether a room code refers to a live room, without joining it.
async fn room_exists(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match state.registry.get(&code).await {
        Ok(handle) => (
            StatusCode::OK,
            Json(json!({ "code": handle.code(), "exists": true })),
        ),
        Err(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "code": code, "exists": false })),
        ),
    }
}

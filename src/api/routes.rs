//! HTTP and WebSocket surface.
//!
//! Pull: `GET /api/matches` and `GET /api/matches/:id` run at most one
//! due generation cycle per match before snapshotting. Push:
//! `GET /ws/matches` delivers the full snapshot array on a fixed
//! interval until the client goes away.

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::models::MatchSnapshot;
use crate::sim::Simulation;
use crate::store::{MatchStore, StoreError};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub sim: Arc<Simulation>,
    pub store: Arc<MatchStore>,
    pub clock: Arc<dyn Clock>,
    pub push_interval: Duration,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/matches", get(list_matches))
        .route("/api/matches/:id", get(get_match))
        .route("/ws/matches", get(ws_matches))
        .with_state(state)
}

// ===== Route Handlers =====

/// Health check endpoint
async fn health_check() -> &'static str {
    "Livescore operational"
}

/// All matches, ascending id. Runs any due generation cycles first so a
/// poll-only consumer still sees the simulation move.
async fn list_matches(
    State(state): State<AppState>,
) -> Result<Json<Vec<MatchSnapshot>>, ApiError> {
    for id in state.store.ids() {
        state.sim.advance(id).await?;
    }
    Ok(Json(state.store.snapshot_all(state.clock.now()).await))
}

/// A single match by id.
async fn get_match(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MatchSnapshot>, ApiError> {
    state.sim.advance(id).await?;
    let snapshot = state.store.get_snapshot(id, state.clock.now()).await?;
    Ok(Json(snapshot))
}

async fn ws_matches(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| push_loop(socket, state))
}

/// One standing subscription. Reads through the same store as the pull
/// path; never triggers generation. Any send failure or close frame
/// ends this loop only.
async fn push_loop(mut socket: WebSocket, state: AppState) {
    let mut ticker = interval(state.push_interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let snapshots = state.store.snapshot_all(state.clock.now()).await;
                let payload = match serde_json::to_string(&snapshots) {
                    Ok(payload) => payload,
                    Err(e) => {
                        warn!("failed to serialize snapshot frame: {e}");
                        continue;
                    }
                };
                if socket.send(Message::Text(payload)).await.is_err() {
                    break;
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }
    debug!("push subscriber disconnected");
}

// ===== Error Handling =====

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Store(anyhow::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ApiError::NotFound(format!("Match {} not found", id)),
            StoreError::Unavailable(e) => ApiError::Store(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Store(err) => {
                tracing::error!("Store error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

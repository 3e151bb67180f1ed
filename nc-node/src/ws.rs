use axum::{
    extract::{
        ConnectInfo, State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use std::{net::SocketAddr, sync::Arc};
use tracing::{error, info};

use crate::{connection, socket_metadata::SocketMetadata, state::AppState};

/// `GET /ws`: accepts a peer connection.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    ConnectInfo(origin): ConnectInfo<SocketAddr>,
) -> impl IntoResponse {
    let meta = SocketMetadata::inbound(origin);

    info!("Upgrading to WebSocket: origin = {}", meta.address);

    ws.on_upgrade(|ws| handle_ws_connection(ws, state, meta))
}

async fn handle_ws_connection(ws: WebSocket, state: Arc<AppState>, meta: SocketMetadata) {
    let (handler, rx) = match connection::register(&state, meta) {
        Ok(registered) => registered,
        Err(e) => {
            error!("Failed to register inbound peer: {e}");
            return;
        }
    };

    info!("WebSocket connected: peer = {}", handler.address());

    connection::run(ws, rx, handler, state).await;
}

use axum::{Router, routing::get};
use std::{
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
};
use tokio::task::JoinHandle;

use crate::{state::AppState, ws::ws_handler};

/// Serves `/ws` for `state` on a loopback port.
pub(crate) async fn spawn_ws_node(state: Arc<AppState>) -> (SocketAddr, JoinHandle<()>) {
    let app = Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state)
        .into_make_service_with_connect_info::<SocketAddr>();

    let listener = tokio::net::TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    let task = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, task)
}

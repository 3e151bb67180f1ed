use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use nc_core::Block;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::{dialer, state::AppState, ws::ws_handler};

#[derive(Debug, Deserialize)]
pub struct MineBlockRequest {
    pub data: String,
}

/// Body of `POST /joinNetwork`.
#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub url: String,
}

/// Every route the node serves, including the `/ws` peer endpoint.
pub(crate) fn routes(router: Router<Arc<AppState>>) -> Router<Arc<AppState>> {
    router
        .route("/blocks", get(get_blocks))
        .route("/block/{hash}", get(get_block))
        .route("/mineBlock", post(mine_block))
        .route("/peers", get(get_peers))
        .route("/joinNetwork", post(join_network))
        .route("/ws", get(ws_handler))
}

async fn get_blocks(State(state): State<Arc<AppState>>) -> Json<Vec<Block>> {
    Json(state.blocks().await)
}

async fn get_block(
    State(state): State<Arc<AppState>>,
    Path(hash): Path<String>,
) -> Result<Json<Block>, crate::Error> {
    state
        .block_by_hash(&hash)
        .await
        .map(Json)
        .ok_or(crate::Error::BlockNotFound(hash))
}

async fn mine_block(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MineBlockRequest>,
) -> Result<Json<Block>, crate::Error> {
    state.mine_block(request.data).await.map(Json)
}

async fn get_peers(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.peer_addresses())
}

async fn join_network(
    State(state): State<Arc<AppState>>,
    Json(request): Json<JoinRequest>,
) -> Result<StatusCode, crate::Error> {
    info!("Join requested: {}", request.url);
    dialer::connect(&state, &request.url).await?;
    Ok(StatusCode::OK)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::test_node::spawn_ws_node;
    use axum::{
        body::Body,
        http::{Request, header},
        response::IntoResponse,
    };
    use http_body_util::BodyExt;
    use nc_core::Blockchain;
    use tower::ServiceExt;
    use tracing_test::traced_test;

    fn setup() -> (Router, Arc<AppState>) {
        let state = Arc::new(AppState::new(Blockchain::default()));
        (routes(Router::new()).with_state(state.clone()), state)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_get_blocks() {
        let (app, _) = setup();

        let response = app.oneshot(get_request("/blocks")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["hash"], Block::genesis().hash.as_str());
    }

    #[tokio::test]
    async fn test_mine_block_then_get_it() {
        let (app, state) = setup();

        let response = app
            .clone()
            .oneshot(post_json("/mineBlock", r#"{"data":"hello"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let mined = body_json(response).await;
        assert_eq!(mined["index"], 1);
        assert_eq!(mined["data"], "hello");
        assert_eq!(mined["prevHash"], Block::genesis().hash.as_str());

        let hash = mined["hash"].as_str().unwrap();
        let response = app.oneshot(get_request(&format!("/block/{hash}"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, mined);
        assert_eq!(state.blocks().await.len(), 2);
    }

    #[tokio::test]
    async fn test_get_unknown_block() {
        let (app, _) = setup();

        let response = app.oneshot(get_request("/block/deadbeef")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await["error"],
            "Block not found: deadbeef"
        );
    }

    #[tokio::test]
    async fn test_get_peers_empty() {
        let (app, _) = setup();

        let response = app.oneshot(get_request("/peers")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!([]));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_join_network_invalid_url() {
        let (app, state) = setup();

        let response = app
            .oneshot(post_json("/joinNetwork", r#"{"url":"not a url"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(state.peer_addresses().is_empty());
        assert!(logs_contain("Join requested: not a url"));
    }

    #[tokio::test]
    async fn test_join_network_requires_url() {
        let (app, _) = setup();

        let response = app
            .oneshot(post_json("/joinNetwork", r#"{"peer":"ws://a/ws"}"#))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_join_network_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let (app, _) = setup();

        let response = app
            .oneshot(post_json(
                "/joinNetwork",
                &format!(r#"{{"url":"ws://{addr}/ws"}}"#),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_join_network_success_then_conflict() {
        let remote_state = Arc::new(AppState::new(Blockchain::default()));
        let (remote_addr, remote_task) = spawn_ws_node(remote_state).await;
        let (app, state) = setup();
        let body = format!(r#"{{"url":"ws://{remote_addr}/ws"}}"#);

        let response = app
            .clone()
            .oneshot(post_json("/joinNetwork", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
        assert_eq!(
            state.peer_addresses(),
            vec![format!("ws://{remote_addr}/ws")]
        );

        let response = app
            .clone()
            .oneshot(post_json("/joinNetwork", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = app.oneshot(get_request("/peers")).await.unwrap();
        assert_eq!(
            body_json(response).await,
            serde_json::json!([format!("ws://{remote_addr}/ws")])
        );

        remote_task.abort();
    }

    #[tokio::test]
    async fn test_mine_block_conflicts_when_chain_moved() {
        let (app, state) = setup();
        let stale = state.block_template("late".into()).await;

        let response = app
            .oneshot(post_json("/mineBlock", r#"{"data":"first"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let error = state.mine_template(stale).await.unwrap_err();
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().starts_with("Block rejected"));
        assert_eq!(state.blocks().await.len(), 2);
    }
}

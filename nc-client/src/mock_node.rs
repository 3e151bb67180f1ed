use axum::{
    Router,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use std::{
    net::{Ipv4Addr, SocketAddr},
    sync::{Arc, Mutex},
};
use tokio::task::JoinHandle;
use url::Url;

/// A request as seen by the mock node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Recorded {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) content_type: Option<String>,
    pub(crate) body: String,
}

#[derive(Clone)]
struct MockState {
    peers_status: StatusCode,
    peers_body: String,
    join_status: StatusCode,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

/// An HTTP server on a loopback port that answers `/peers` and
/// `/joinNetwork` with canned responses and records every request.
pub(crate) struct MockNode {
    pub(crate) url: Url,
    requests: Arc<Mutex<Vec<Recorded>>>,
    task: JoinHandle<()>,
}

impl MockNode {
    pub(crate) async fn start(peers_body: &str, join_status: StatusCode) -> Self {
        Self::start_with(StatusCode::OK, peers_body, join_status).await
    }

    pub(crate) async fn start_with(
        peers_status: StatusCode,
        peers_body: &str,
        join_status: StatusCode,
    ) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            peers_status,
            peers_body: peers_body.to_string(),
            join_status,
            requests: requests.clone(),
        };
        let app = Router::new().fallback(record).with_state(state);

        let listener = tokio::net::TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            url: Url::parse(&format!("http://{addr}")).unwrap(),
            requests,
            task,
        }
    }

    pub(crate) fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

impl Drop for MockNode {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn record(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let path = uri.path().to_string();
    state.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    match (method, path.as_str()) {
        (Method::GET, "/peers") => (
            state.peers_status,
            [(header::CONTENT_TYPE, "application/json")],
            state.peers_body,
        )
            .into_response(),
        (Method::POST, "/joinNetwork") => state.join_status.into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

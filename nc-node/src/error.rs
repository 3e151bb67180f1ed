use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use nc_core::BlockError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("bind: {0}")]
    Bind(std::io::Error),

    /// Error on serve
    #[error("Serve error: {0}")]
    Serve(std::io::Error),

    /// Error when trying to add a peer that already exists
    #[error("Peer already exists: {0}")]
    PeerAlreadyExists(String),

    /// The join target is not a `ws://` URL
    #[error("Invalid peer url `{url}`: {reason}")]
    InvalidPeerUrl { url: String, reason: String },

    /// The WebSocket handshake with the join target failed
    #[error("Failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: Box<tokio_tungstenite::tungstenite::Error>,
    },

    #[error("Block not found: {0}")]
    BlockNotFound(String),

    /// A mined block no longer fits on the chain
    #[error("Block rejected: {0}")]
    Block(#[from] BlockError),

    #[error("Mining task failed: {0}")]
    Mining(String),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::InvalidPeerUrl { .. } => StatusCode::BAD_REQUEST,
            Error::BlockNotFound(_) => StatusCode::NOT_FOUND,
            Error::PeerAlreadyExists(_) | Error::Block(_) => StatusCode::CONFLICT,
            Error::Connect { .. } => StatusCode::BAD_GATEWAY,
            Error::Bind(_) | Error::Serve(_) | Error::Mining(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

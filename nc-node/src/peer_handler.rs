use crate::{socket_metadata::SocketMetadata, state::AppStateInterface};
use core::fmt;
use nc_protocol::Message;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, warn};

/// A WebSocket frame, independent of which WebSocket implementation
/// (axum for inbound, tungstenite for outbound) received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(usize),
    Ping,
    Pong,
    Close,
}

impl From<axum::extract::ws::Message> for Frame {
    fn from(msg: axum::extract::ws::Message) -> Self {
        use axum::extract::ws::Message as Ws;
        match msg {
            Ws::Text(text) => Frame::Text(text.as_str().to_owned()),
            Ws::Binary(data) => Frame::Binary(data.len()),
            Ws::Ping(_) => Frame::Ping,
            Ws::Pong(_) => Frame::Pong,
            Ws::Close(_) => Frame::Close,
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Message> for Frame {
    fn from(msg: tokio_tungstenite::tungstenite::Message) -> Self {
        use tokio_tungstenite::tungstenite::Message as Ws;
        match msg {
            Ws::Text(text) => Frame::Text(text.as_str().to_owned()),
            Ws::Binary(data) => Frame::Binary(data.len()),
            Ws::Ping(_) => Frame::Ping,
            Ws::Pong(_) => Frame::Pong,
            Ws::Close(_) => Frame::Close,
            Ws::Frame(frame) => Frame::Binary(frame.payload().len()),
        }
    }
}

/// Represents a connected peer and the channel feeding its connection task.
#[derive(Clone)]
pub struct PeerHandler {
    meta: SocketMetadata,
    sender: mpsc::Sender<Arc<Message>>,
}

impl PeerHandler {
    pub fn new(meta: SocketMetadata, sender: mpsc::Sender<Arc<Message>>) -> Self {
        Self { meta, sender }
    }

    /// The address the peer is listed under in `/peers`.
    pub fn address(&self) -> &str {
        &self.meta.address
    }

    pub fn meta(&self) -> &SocketMetadata {
        &self.meta
    }

    /// Queues a message for this peer's connection task without waiting.
    ///
    /// Messages reach the socket in the order they were queued. When the
    /// queue is full the message is dropped; returns `false` in that case and
    /// when the task is gone.
    pub fn send(&self, message: Arc<Message>) -> bool {
        debug!("Queueing message for peer {}: {}", self.meta.address, message);

        match self.sender.try_send(message) {
            Ok(()) => true,
            Err(TrySendError::Full(message)) => {
                warn!(
                    "Outbound queue of peer {} is full, dropping {}",
                    self.meta.address, message
                );
                false
            }
            Err(TrySendError::Closed(_)) => {
                error!(
                    "Failed to send message to peer {}: receiver dropped, connection task likely terminated",
                    self.meta.address
                );
                false
            }
        }
    }

    /// Parses an incoming frame and delegates protocol handling to the state.
    ///
    /// Returns `false` when the connection should be closed.
    pub async fn process_incoming(
        &self,
        frame: Frame,
        state: &Arc<impl AppStateInterface>,
    ) -> bool {
        match frame {
            Frame::Text(text) => match Message::from_json(&text) {
                Ok(message) => {
                    debug!("Received from {}: {}", self.address(), message);
                    state.handle_message(self.address(), message).await;
                }
                Err(e) => {
                    warn!(
                        "Failed to parse text from peer {} as Message: {}. Text: '{}'",
                        self.address(),
                        e,
                        text
                    );
                }
            },
            Frame::Binary(len) => {
                warn!(
                    "Ignoring binary message of {len} bytes from peer {}",
                    self.meta.address
                );
            }
            Frame::Ping => debug!("Received ping from peer {}", self.meta.address),
            Frame::Pong => debug!("Received pong from peer {}", self.meta.address),
            Frame::Close => {
                debug!("Received close from peer {}", self.meta.address);
                return false;
            }
        }
        true
    }
}

impl fmt::Debug for PeerHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerHandler")
            .field("address", &self.meta.address)
            .field("direction", &self.meta.direction)
            .finish()
    }
}

use futures::{Sink, SinkExt, Stream, StreamExt};
use nc_protocol::Message;
use std::{fmt::Display, sync::Arc};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    peer_handler::{Frame, PeerHandler},
    socket_metadata::SocketMetadata,
    state::AppState,
};

/// Messages queued per peer before senders start waiting.
const OUTBOUND_CAPACITY: usize = 32;

/// A WebSocket message type the connection loop can write text frames with.
pub(crate) trait WsMessage: Into<Frame> + Send + Unpin + 'static {
    fn text(text: String) -> Self;
}

impl WsMessage for axum::extract::ws::Message {
    fn text(text: String) -> Self {
        Self::Text(text.into())
    }
}

impl WsMessage for tokio_tungstenite::tungstenite::Message {
    fn text(text: String) -> Self {
        Self::Text(text.into())
    }
}

/// Registers a freshly connected peer and queues the initial `QueryLatest`.
pub(crate) fn register(
    state: &Arc<AppState>,
    meta: SocketMetadata,
) -> Result<(PeerHandler, mpsc::Receiver<Arc<Message>>), crate::Error> {
    let (tx, rx) = mpsc::channel::<Arc<Message>>(OUTBOUND_CAPACITY);
    let handler = PeerHandler::new(meta, tx);

    state.add_peer(handler.clone())?;
    handler.send(Arc::new(Message::QueryLatest));

    Ok((handler, rx))
}

/// Pumps queued messages out to the socket and incoming frames into the
/// state until either side closes. The peer is unregistered on exit.
pub(crate) async fn run<S, M, E>(
    socket: S,
    mut outbound_rx: mpsc::Receiver<Arc<Message>>,
    handler: PeerHandler,
    state: Arc<AppState>,
) where
    S: Stream<Item = Result<M, E>> + Sink<M> + Send,
    <S as Sink<M>>::Error: Display,
    M: WsMessage,
    E: Display,
{
    let address = handler.address().to_owned();
    info!(
        "Starting connection task for {:?} peer {address}",
        handler.meta().direction
    );

    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            Some(message) = outbound_rx.recv() => {
                debug!("Sending to {address}: {message}");
                match message.to_json() {
                    Ok(text) => {
                        if let Err(e) = sink.send(M::text(text)).await {
                            warn!("Failed to send message to {address}: {e}. Closing connection");
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Failed to serialize message for {address}: {e}. Closing connection");
                        break;
                    }
                }
            },
            Some(frame) = stream.next() => {
                match frame {
                    Ok(msg) => {
                        if !handler.process_incoming(msg.into(), &state).await {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Error receiving from {address}: {e}");
                        break;
                    }
                }
            },
            else => break,
        }
    }

    info!("Connection closed: peer = {address}");
    state.remove_peer(&address);
}

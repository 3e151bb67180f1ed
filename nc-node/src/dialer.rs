use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

use crate::{connection, socket_metadata::SocketMetadata, state::AppState};

/// Checks that `url` is something we can dial: an absolute `ws://` URL with
/// a host and neither query nor fragment. Returns it in normalized form
/// (lowercase host, default port elided, dot segments resolved).
pub(crate) fn validate_peer_url(url: &str) -> Result<Url, crate::Error> {
    let invalid = |reason: String| crate::Error::InvalidPeerUrl {
        url: url.to_string(),
        reason,
    };

    let parsed = Url::parse(url.trim()).map_err(|e| invalid(e.to_string()))?;
    if parsed.scheme() != "ws" {
        return Err(invalid(format!("unsupported scheme `{}`", parsed.scheme())));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid("query and fragment are not allowed".to_string()));
    }
    Ok(parsed)
}

/// Dials `url` and, once the handshake succeeds, registers it as a peer
/// and spawns its connection task.
///
/// The peer is listed under the normalized form of `url`, so two spellings
/// of the same address count as one peer.
pub(crate) async fn connect(state: &Arc<AppState>, url: &str) -> Result<(), crate::Error> {
    let url = validate_peer_url(url)?;
    let address = url.as_str();

    if state.has_peer(address) {
        warn!("Already connected to {address}");
        return Err(crate::Error::PeerAlreadyExists(address.to_string()));
    }

    info!("Connecting to peer {address}");
    let (socket, _response) =
        tokio_tungstenite::connect_async(address)
            .await
            .map_err(|source| crate::Error::Connect {
                url: address.to_string(),
                source: Box::new(source),
            })?;

    let (handler, rx) = connection::register(state, SocketMetadata::outbound(address))?;
    info!("Connected to peer {}", handler.address());

    tokio::spawn(connection::run(socket, rx, handler, state.clone()));
    Ok(())
}

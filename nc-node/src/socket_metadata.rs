use std::{fmt, net::SocketAddr};

/// Which side opened the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The peer connected to our `/ws` endpoint
    Inbound,
    /// We dialed the peer after a join request or at startup
    Outbound,
}

#[derive(Clone)]
pub struct SocketMetadata {
    /// Remote `ip:port` for inbound sockets, the dialed URL for outbound ones.
    pub address: String,
    pub direction: Direction,
}

impl SocketMetadata {
    pub fn inbound(origin: SocketAddr) -> Self {
        Self {
            address: origin.to_string(),
            direction: Direction::Inbound,
        }
    }

    pub fn outbound(url: impl Into<String>) -> Self {
        Self {
            address: url.into(),
            direction: Direction::Outbound,
        }
    }
}

impl fmt::Debug for SocketMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SocketMetadata")
            .field("address", &self.address)
            .field("direction", &self.direction)
            .finish()
    }
}

use nc_core::{Block, Blockchain};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Frames exchanged between nodes over the `/ws` channel.
///
/// Encoded as adjacently tagged JSON, e.g.
/// `{"type":"response_blockchain","data":[...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Message {
    /// Ask the peer for its latest block
    QueryLatest,

    /// Ask the peer for its whole chain
    QueryAll,

    /// Blocks sent in answer to a query, or pushed after a new block
    ResponseBlockchain(Vec<Block>),
}

impl Message {
    /// A response carrying only the latest block of `chain`.
    pub fn latest(chain: &Blockchain) -> Self {
        Self::ResponseBlockchain(vec![chain.latest().clone()])
    }

    /// A response carrying every block of `chain`.
    pub fn all(chain: &Blockchain) -> Self {
        Self::ResponseBlockchain(chain.blocks().to_vec())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueryLatest => write!(f, "QueryLatest"),
            Self::QueryAll => write!(f, "QueryAll"),
            Self::ResponseBlockchain(blocks) => match blocks.last() {
                Some(latest) => write!(
                    f,
                    "ResponseBlockchain {{ blocks: {}, latest: #{} }}",
                    blocks.len(),
                    latest.index
                ),
                None => write!(f, "ResponseBlockchain {{ blocks: 0 }}"),
            },
        }
    }
}

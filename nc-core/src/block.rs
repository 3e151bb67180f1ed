use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pow::{calculate_hash, hash_matches_difficulty};

/// Timestamp (unix seconds) every node agrees on for block 0.
pub const GENESIS_TIMESTAMP: i64 = 1_664_476_570;

/// Payload of the genesis block.
pub const GENESIS_DATA: &str = "genesis";

/// A single link of the chain.
///
/// The wire form uses camelCase field names so that blocks exchanged over
/// the HTTP API and the peer protocol look the same.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub index: u64,
    pub hash: String,
    /// `None` only for the genesis block.
    pub prev_hash: Option<String>,
    pub timestamp: i64,
    pub data: String,
    pub difficulty: u32,
    pub nonce: u64,
}

impl Block {
    /// The hard-coded first block. Its hash is derived from its content, so
    /// two nodes built from the same source share the same genesis.
    pub fn genesis() -> Self {
        let hash = calculate_hash(0, None, GENESIS_TIMESTAMP, GENESIS_DATA, 0, 0);
        Self {
            index: 0,
            hash,
            prev_hash: None,
            timestamp: GENESIS_TIMESTAMP,
            data: GENESIS_DATA.to_string(),
            difficulty: 0,
            nonce: 0,
        }
    }

    /// Recomputes the hash over every field except `hash` itself.
    pub fn calculate_hash(&self) -> String {
        calculate_hash(
            self.index,
            self.prev_hash.as_deref(),
            self.timestamp,
            &self.data,
            self.difficulty,
            self.nonce,
        )
    }

    pub fn has_matching_hash(&self) -> bool {
        self.calculate_hash() == self.hash
    }

    pub fn meets_difficulty(&self) -> bool {
        hash_matches_difficulty(&self.hash, self.difficulty)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} (difficulty: {}, nonce: {})",
            self.index, self.hash, self.difficulty, self.nonce
        )
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_genesis_is_deterministic() {
        assert_eq!(Block::genesis(), Block::genesis());
        let genesis = Block::genesis();
        assert_eq!(genesis.index, 0);
        assert!(genesis.prev_hash.is_none());
        assert!(genesis.has_matching_hash());
        assert!(genesis.meets_difficulty());
    }

    #[test]
    fn test_tampered_block_has_mismatching_hash() {
        let mut block = Block::genesis();
        block.data = "tampered".to_string();
        assert!(!block.has_matching_hash());
    }

    #[test]
    fn test_serialize_camel_case() {
        let genesis = Block::genesis();
        let json = serde_json::to_value(&genesis).unwrap();
        assert_eq!(json["prevHash"], serde_json::Value::Null);
        assert_eq!(json["timestamp"], GENESIS_TIMESTAMP);
        assert_eq!(json["hash"], genesis.hash.as_str());
        assert!(json.get("prev_hash").is_none());
    }

    #[test]
    fn test_deserialize() {
        let json = r#"{"index":1,"hash":"ab","prevHash":"cd","timestamp":5,"data":"x","difficulty":2,"nonce":7}"#;
        let block: Block = serde_json::from_str(json).unwrap();
        assert_eq!(block.index, 1);
        assert_eq!(block.prev_hash.as_deref(), Some("cd"));
        assert_eq!(block.nonce, 7);
    }

    #[test]
    fn test_display() {
        let genesis = Block::genesis();
        assert_eq!(
            genesis.to_string(),
            format!("#0 {} (difficulty: 0, nonce: 0)", genesis.hash)
        );
    }
}

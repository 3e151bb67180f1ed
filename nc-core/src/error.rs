/// Reasons a block cannot follow its predecessor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlockError {
    #[error("invalid index: expected {expected}, got {actual}")]
    InvalidIndex { expected: u64, actual: u64 },

    #[error("previous hash does not match hash of block {index}")]
    PrevHashMismatch { index: u64 },

    #[error("hash does not match block content")]
    InvalidHash,

    #[error("hash does not satisfy difficulty {0}")]
    DifficultyNotMet(u32),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(i64),
}

/// Reasons a received chain is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    #[error("chain is empty")]
    Empty,

    #[error("first block is not the genesis block")]
    GenesisMismatch,

    #[error("block at position {position} is invalid: {source}")]
    InvalidBlock {
        position: usize,
        #[source]
        source: BlockError,
    },

    /// The chain is valid but does not carry more work than ours.
    #[error("cumulative difficulty {received} does not exceed {current}")]
    NotHeavier { received: u128, current: u128 },
}

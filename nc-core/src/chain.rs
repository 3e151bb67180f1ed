use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    block::Block,
    clock::{Clock, SystemClock},
    error::{BlockError, ChainError},
    pow::find_block,
};

/// Expected seconds between two blocks.
pub const BLOCK_GENERATION_INTERVAL: i64 = 10;

/// Number of blocks between two difficulty adjustments.
pub const DIFFICULTY_ADJUSTMENT_INTERVAL: u64 = 10;

/// Allowed clock drift, in seconds, when validating block timestamps.
const TIMESTAMP_TOLERANCE: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainParams {
    pub block_generation_interval: i64,
    pub difficulty_adjustment_interval: u64,
}

impl Default for ChainParams {
    fn default() -> Self {
        Self {
            block_generation_interval: BLOCK_GENERATION_INTERVAL,
            difficulty_adjustment_interval: DIFFICULTY_ADJUSTMENT_INTERVAL,
        }
    }
}

/// Everything needed to mine the next block, detached from the chain so the
/// nonce search can run without holding a lock on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTemplate {
    pub index: u64,
    pub prev_hash: String,
    pub timestamp: i64,
    pub data: String,
    pub difficulty: u32,
}

impl BlockTemplate {
    pub fn mine(self) -> Block {
        find_block(
            self.index,
            Some(self.prev_hash),
            self.timestamp,
            self.data,
            self.difficulty,
        )
    }
}

/// The local copy of the chain. Never empty: the first block is always the
/// genesis block.
#[derive(Debug, Clone)]
pub struct Blockchain {
    blocks: Vec<Block>,
    params: ChainParams,
    clock: Arc<dyn Clock>,
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new(ChainParams::default())
    }
}

impl Blockchain {
    pub fn new(params: ChainParams) -> Self {
        Self::with_clock(params, Arc::new(SystemClock))
    }

    pub fn with_clock(params: ChainParams, clock: Arc<dyn Clock>) -> Self {
        Self {
            blocks: vec![Block::genesis()],
            params,
            clock,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn genesis(&self) -> &Block {
        &self.blocks[0]
    }

    pub fn latest(&self) -> &Block {
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn get_by_hash(&self, hash: &str) -> Option<&Block> {
        self.blocks.iter().find(|block| block.hash == hash)
    }

    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Difficulty the next block has to be mined at.
    pub fn difficulty(&self) -> u32 {
        let latest = self.latest();
        let interval = self.params.difficulty_adjustment_interval;
        if interval != 0 && latest.index != 0 && latest.index % interval == 0 {
            self.adjusted_difficulty(latest)
        } else {
            latest.difficulty
        }
    }

    /// Raises the difficulty when the last interval was mined more than twice
    /// as fast as expected, lowers it when it took more than twice as long.
    fn adjusted_difficulty(&self, latest: &Block) -> u32 {
        let interval = self.params.difficulty_adjustment_interval as usize;
        let prev_adjustment = &self.blocks[self.blocks.len().saturating_sub(interval)];
        let expected = self.params.block_generation_interval * interval as i64;
        let taken = latest.timestamp - prev_adjustment.timestamp;

        let difficulty = if taken * 2 < expected {
            prev_adjustment.difficulty.saturating_add(1)
        } else if taken > expected * 2 {
            prev_adjustment.difficulty.saturating_sub(1)
        } else {
            prev_adjustment.difficulty
        };
        debug!(
            "Difficulty adjusted at block #{}: took {taken}s, expected {expected}s, now {difficulty}",
            latest.index
        );
        difficulty
    }

    /// Sum of `2^difficulty` over `blocks`.
    pub fn cumulative_difficulty(blocks: &[Block]) -> u128 {
        blocks
            .iter()
            .map(|block| 1u128.checked_shl(block.difficulty).unwrap_or(u128::MAX))
            .fold(0, u128::saturating_add)
    }

    pub fn is_valid_chain(&self, blocks: &[Block]) -> Result<(), ChainError> {
        let first = blocks.first().ok_or(ChainError::Empty)?;
        if first != self.genesis() {
            return Err(ChainError::GenesisMismatch);
        }
        let now = self.now();
        for (position, pair) in blocks.windows(2).enumerate() {
            validate_new_block(&pair[1], &pair[0], now).map_err(|source| {
                ChainError::InvalidBlock {
                    position: position + 1,
                    source,
                }
            })?;
        }
        Ok(())
    }

    /// Appends `block` if it is a valid successor of the latest block.
    pub fn add_block(&mut self, block: Block) -> Result<(), BlockError> {
        validate_new_block(&block, self.latest(), self.now())?;
        debug!("Block added: {block}");
        self.blocks.push(block);
        Ok(())
    }

    /// Swaps the local chain for `blocks` when they form a valid chain that
    /// carries strictly more cumulative difficulty.
    pub fn replace_chain(&mut self, blocks: Vec<Block>) -> Result<(), ChainError> {
        if let Err(e) = self.is_valid_chain(&blocks) {
            warn!("Received invalid chain: {e}");
            return Err(e);
        }
        let received = Self::cumulative_difficulty(&blocks);
        let current = Self::cumulative_difficulty(&self.blocks);
        if received <= current {
            return Err(ChainError::NotHeavier { received, current });
        }
        info!(
            "Replacing chain of {} blocks with received chain of {} blocks",
            self.blocks.len(),
            blocks.len()
        );
        self.blocks = blocks;
        Ok(())
    }

    pub fn next_block_template(&self, data: impl Into<String>) -> BlockTemplate {
        let latest = self.latest();
        BlockTemplate {
            index: latest.index + 1,
            prev_hash: latest.hash.clone(),
            timestamp: self.now(),
            data: data.into(),
            difficulty: self.difficulty(),
        }
    }

    /// Mines and appends the next block in place.
    pub fn mine_next(&mut self, data: impl Into<String>) -> Result<Block, BlockError> {
        let block = self.next_block_template(data).mine();
        self.add_block(block.clone())?;
        Ok(block)
    }
}

/// `now + 60 > new.timestamp > prev.timestamp - 60`
pub fn is_valid_timestamp(new: &Block, prev: &Block, now: i64) -> bool {
    now + TIMESTAMP_TOLERANCE > new.timestamp && new.timestamp > prev.timestamp - TIMESTAMP_TOLERANCE
}

/// Checks that `new` may directly follow `prev`.
pub fn validate_new_block(new: &Block, prev: &Block, now: i64) -> Result<(), BlockError> {
    if !is_valid_timestamp(new, prev, now) {
        return Err(BlockError::InvalidTimestamp(new.timestamp));
    }
    if prev.index + 1 != new.index {
        return Err(BlockError::InvalidIndex {
            expected: prev.index + 1,
            actual: new.index,
        });
    }
    if new.prev_hash.as_deref() != Some(prev.hash.as_str()) {
        return Err(BlockError::PrevHashMismatch { index: prev.index });
    }
    if !new.has_matching_hash() {
        return Err(BlockError::InvalidHash);
    }
    if !new.meets_difficulty() {
        return Err(BlockError::DifficultyNotMet(new.difficulty));
    }
    Ok(())
}

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod block;
mod chain;
mod clock;
mod error;
mod pow;

pub use crate::{
    block::{Block, GENESIS_DATA, GENESIS_TIMESTAMP},
    chain::{
        BLOCK_GENERATION_INTERVAL, BlockTemplate, Blockchain, ChainParams,
        DIFFICULTY_ADJUSTMENT_INTERVAL, is_valid_timestamp, validate_new_block,
    },
    clock::{Clock, ManualClock, SystemClock},
    error::{BlockError, ChainError},
    pow::{calculate_hash, find_block, hash_matches_difficulty},
};

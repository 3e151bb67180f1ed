use sha2::{Digest, Sha256};
use tracing::trace;

use crate::block::Block;

/// SHA-256 over the concatenated textual form of every block field.
pub fn calculate_hash(
    index: u64,
    prev_hash: Option<&str>,
    timestamp: i64,
    data: &str,
    difficulty: u32,
    nonce: u64,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(index.to_string());
    hasher.update(prev_hash.unwrap_or_default());
    hasher.update(timestamp.to_string());
    hasher.update(data);
    hasher.update(difficulty.to_string());
    hasher.update(nonce.to_string());
    hex::encode(hasher.finalize())
}

/// True when the hex encoded `hash` starts with at least `difficulty` zero bits.
pub fn hash_matches_difficulty(hash: &str, difficulty: u32) -> bool {
    match hex::decode(hash) {
        Ok(bytes) => leading_zero_bits(&bytes) >= difficulty,
        Err(_) => false,
    }
}

fn leading_zero_bits(bytes: &[u8]) -> u32 {
    let mut bits = 0;
    for byte in bytes {
        if *byte != 0 {
            return bits + byte.leading_zeros();
        }
        bits += 8;
    }
    bits
}

/// Increments the nonce from zero until the hash satisfies `difficulty`.
///
/// This is CPU bound and unbounded in time; async callers should run it on a
/// blocking thread.
pub fn find_block(
    index: u64,
    prev_hash: Option<String>,
    timestamp: i64,
    data: String,
    difficulty: u32,
) -> Block {
    let mut nonce: u64 = 0;
    loop {
        let hash = calculate_hash(
            index,
            prev_hash.as_deref(),
            timestamp,
            &data,
            difficulty,
            nonce,
        );
        if hash_matches_difficulty(&hash, difficulty) {
            trace!("Found block #{index} after {} attempts", nonce + 1);
            return Block {
                index,
                hash,
                prev_hash,
                timestamp,
                data,
                difficulty,
                nonce,
            };
        }
        nonce = nonce.wrapping_add(1);
    }
}

//! Difficulty Retargeting
//!
//! Per-block adjustment from the previous mined block's search time:
//! slower than target makes the next block one hex zero easier, faster
//! makes it one harder.

use shared_types::ProofOfWorkConsent;
use std::cmp::Ordering;

/// Difficulty for the block following `previous`.
///
/// Never drops below zero.
pub fn retarget(previous: &ProofOfWorkConsent, target_mining_rate_ms: u64) -> u32 {
    match previous.milli_seconds_spent_mining.cmp(&target_mining_rate_ms) {
        Ordering::Greater => previous.difficulty.saturating_sub(1),
        Ordering::Less => previous.difficulty.saturating_add(1),
        Ordering::Equal => previous.difficulty,
    }
}

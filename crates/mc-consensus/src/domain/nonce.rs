//! Nonce Search
//!
//! Tight synchronous loop over the nonce space with no I/O inside. It exits
//! on a qualifying hash or when the cancellation flag is raised.

use shared_crypto::{hash, meets_difficulty, HashingError};
use shared_types::{current_time_millis, Block, Consent, ProofOfWorkConsent};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Outcome of a nonce search.
#[derive(Debug)]
pub enum SearchOutcome {
    /// `block.hash` satisfies the block's difficulty.
    Sealed(Block),
    /// The cancellation flag was raised.
    Cancelled,
}

/// Search for a nonce sealing `block` at `difficulty`, starting from nonce 1.
///
/// `milli_seconds_spent_mining` is refreshed on every attempt so the
/// recorded duration is covered by the sealed hash. When the counter
/// reaches `u64::MAX` it restarts at 1 with a fresh consent timestamp.
pub fn search_nonce(
    mut block: Block,
    difficulty: u32,
    cancelled: &AtomicBool,
) -> Result<SearchOutcome, HashingError> {
    let started = Instant::now();
    let mut nonce: u64 = 1;
    let mut timestamp = current_time_millis();

    loop {
        if cancelled.load(Ordering::Relaxed) {
            return Ok(SearchOutcome::Cancelled);
        }

        block.consent = Consent::ProofOfWork(ProofOfWorkConsent {
            difficulty,
            nonce,
            timestamp,
            milli_seconds_spent_mining: started.elapsed().as_millis() as u64,
        });
        block.hash = hash(&block)?;
        if meets_difficulty(&block.hash, difficulty) {
            return Ok(SearchOutcome::Sealed(block));
        }

        nonce = next_nonce(nonce, &mut timestamp);
    }
}

fn next_nonce(nonce: u64, timestamp: &mut u64) -> u64 {
    if nonce == u64::MAX {
        *timestamp = current_time_millis();
        1
    } else {
        nonce + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::is_correct;
    use shared_types::fixtures::{sample_transactions, successor};

    fn candidate() -> Block {
        let genesis = Block::genesis().unwrap();
        successor(&genesis, sample_transactions(3, 7))
    }

    #[test]
    fn test_sealed_block_meets_difficulty() {
        let flag = AtomicBool::new(false);
        let SearchOutcome::Sealed(block) = search_nonce(candidate(), 2, &flag).unwrap() else {
            panic!("search should not be cancelled");
        };
        assert!(block.hash.starts_with("00"));
        assert!(is_correct(&block.hash, &block).unwrap());
        assert_eq!(block.proof_of_work().unwrap().difficulty, 2);
    }

    #[test]
    fn test_zero_difficulty_takes_first_nonce() {
        let flag = AtomicBool::new(false);
        let SearchOutcome::Sealed(block) = search_nonce(candidate(), 0, &flag).unwrap() else {
            panic!("search should not be cancelled");
        };
        assert_eq!(block.proof_of_work().unwrap().nonce, 1);
    }

    #[test]
    fn test_raised_flag_stops_search() {
        let flag = AtomicBool::new(true);
        assert!(matches!(
            search_nonce(candidate(), 128, &flag).unwrap(),
            SearchOutcome::Cancelled
        ));
    }

    #[test]
    fn test_nonce_wraps_to_one_with_fresh_timestamp() {
        let mut timestamp = 0;
        assert_eq!(next_nonce(41, &mut timestamp), 42);
        assert_eq!(timestamp, 0);

        assert_eq!(next_nonce(u64::MAX, &mut timestamp), 1);
        assert!(timestamp > 0);
    }
}

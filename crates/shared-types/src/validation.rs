//! # Block Validation
//!
//! Structural checks applied before a block is accepted into storage.
//! A forged block that went stale mid-search fails here, not in consensus.

use crate::entities::Block;
use crate::errors::ChainValidationError;
use shared_crypto::{is_correct, meets_difficulty, merkle_root};

/// Check that `block` is a valid direct successor of `head`.
///
/// Order of checks: linkage (position, last hash), seal hash,
/// proof-of-work target, transaction Merkle root.
pub fn validate_successor(head: &Block, block: &Block) -> Result<(), ChainValidationError> {
    let expected = head.position + 1;
    if block.position != expected {
        return Err(ChainValidationError::PositionMismatch {
            expected,
            actual: block.position,
        });
    }

    if block.last_hash != head.hash {
        return Err(ChainValidationError::LastHashMismatch {
            position: block.position,
        });
    }

    validate_contents(block)
}

/// Checks that depend only on the block itself.
pub fn validate_contents(block: &Block) -> Result<(), ChainValidationError> {
    if !is_correct(&block.hash, block)? {
        return Err(ChainValidationError::HashMismatch {
            position: block.position,
        });
    }

    if let Some(pow) = block.proof_of_work() {
        if !meets_difficulty(&block.hash, pow.difficulty) {
            return Err(ChainValidationError::InsufficientDifficulty {
                position: block.position,
                difficulty: pow.difficulty,
            });
        }
    }

    if block.transactions.is_empty() {
        return Err(ChainValidationError::EmptyTransactions {
            position: block.position,
        });
    }

    if merkle_root(&block.transactions)? != block.transaction_merkle_root {
        return Err(ChainValidationError::MerkleRootMismatch {
            position: block.position,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{sample_transactions, successor};
    use shared_crypto::hash;

    fn genesis() -> Block {
        Block::genesis().unwrap()
    }

    #[test]
    fn test_valid_successor() {
        let head = genesis();
        let next = successor(&head, sample_transactions(2, 0));
        assert!(validate_successor(&head, &next).is_ok());
    }

    #[test]
    fn test_wrong_position() {
        let head = genesis();
        let mut next = successor(&head, sample_transactions(2, 0));
        next.position = 5;
        assert!(matches!(
            validate_successor(&head, &next),
            Err(ChainValidationError::PositionMismatch {
                expected: 2,
                actual: 5
            })
        ));
    }

    #[test]
    fn test_wrong_last_hash() {
        let head = genesis();
        let mut next = successor(&head, sample_transactions(2, 0));
        next.last_hash = "ff".into();
        assert!(matches!(
            validate_successor(&head, &next),
            Err(ChainValidationError::LastHashMismatch { position: 2 })
        ));
    }

    #[test]
    fn test_tampered_transactions() {
        let head = genesis();
        let mut next = successor(&head, sample_transactions(3, 0));
        next.transactions.pop();
        next.hash = hash(&next).unwrap();
        assert!(matches!(
            validate_successor(&head, &next),
            Err(ChainValidationError::MerkleRootMismatch { position: 2 })
        ));
    }

    #[test]
    fn test_stale_hash() {
        let head = genesis();
        let mut next = successor(&head, sample_transactions(1, 0));
        next.timestamp += 1;
        assert!(matches!(
            validate_successor(&head, &next),
            Err(ChainValidationError::HashMismatch { position: 2 })
        ));
    }

    #[test]
    fn test_unmet_difficulty() {
        let head = genesis();
        let mut next = successor(&head, sample_transactions(1, 0));
        if let crate::Consent::ProofOfWork(pow) = &mut next.consent {
            pow.difficulty = 128;
        }
        next.hash = hash(&next).unwrap();
        assert!(matches!(
            validate_successor(&head, &next),
            Err(ChainValidationError::InsufficientDifficulty { .. })
        ));
    }
}

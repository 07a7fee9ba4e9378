//! Deterministic chain builders for tests.
//!
//! Blocks produced here carry difficulty 0, so they pass validation without
//! a nonce search.

use crate::entities::{
    Block, Consent, ProofOfWorkConsent, Transaction, TransactionInput, TransactionOutput,
    PROTOCOL_VERSION,
};
use shared_crypto::{hash, merkle_root};

/// `count` transfers; different `salt`s yield disjoint hashes.
pub fn sample_transactions(count: u64, salt: u64) -> Vec<Transaction> {
    (0..count)
        .map(|i| {
            let timestamp = 1_000 + salt * 1_000_000 + i;
            Transaction::new(
                format!("sender-{salt}-{i}"),
                timestamp,
                vec![TransactionInput {
                    previous_output_hash: format!("{salt:0>64}{i:0>64}"),
                    amount: 100 + i,
                }],
                vec![TransactionOutput {
                    receiver: format!("receiver-{salt}-{i}"),
                    amount: 100 + i,
                    timestamp,
                }],
            )
            .expect("fixture transaction hashes")
        })
        .collect()
}

/// A sealed difficulty-0 block extending `head`.
pub fn successor(head: &Block, transactions: Vec<Transaction>) -> Block {
    let timestamp = head.timestamp + 1_000;
    let mut block = Block {
        position: head.position + 1,
        hash: String::new(),
        last_hash: head.hash.clone(),
        transaction_merkle_root: merkle_root(&transactions).expect("fixture merkle root"),
        timestamp,
        version: PROTOCOL_VERSION,
        consent: Consent::ProofOfWork(ProofOfWorkConsent {
            difficulty: 0,
            nonce: 1,
            timestamp,
            milli_seconds_spent_mining: 1_000,
        }),
        transactions,
    };
    block.hash = hash(&block).expect("fixture block hash");
    block
}

/// A chain of `length` blocks, genesis included.
pub fn build_chain(length: u64, salt: u64) -> Vec<Block> {
    let mut chain = vec![Block::genesis().expect("genesis hashes")];
    extend_chain(&mut chain, length, salt);
    chain
}

/// Copy `base` up to and including `keep_through`, then grow it to
/// `length` blocks with transactions derived from `salt`.
pub fn fork_chain(base: &[Block], keep_through: u64, length: u64, salt: u64) -> Vec<Block> {
    let mut chain: Vec<Block> = base
        .iter()
        .take_while(|b| b.position <= keep_through)
        .cloned()
        .collect();
    extend_chain(&mut chain, length, salt);
    chain
}

fn extend_chain(chain: &mut Vec<Block>, length: u64, salt: u64) {
    while (chain.len() as u64) < length {
        let head = chain.last().expect("chain starts at genesis");
        let next = successor(head, sample_transactions(2, salt * 10_000 + head.position));
        chain.push(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_successor;

    #[test]
    fn test_build_chain_is_valid() {
        let chain = build_chain(10, 1);
        assert_eq!(chain.len(), 10);
        for pair in chain.windows(2) {
            validate_successor(&pair[0], &pair[1]).unwrap();
        }
    }

    #[test]
    fn test_fork_shares_prefix_only() {
        let main = build_chain(20, 1);
        let fork = fork_chain(&main, 14, 20, 2);
        assert_eq!(fork.len(), 20);
        assert_eq!(main[13], fork[13]);
        assert_ne!(main[14].hash, fork[14].hash);
    }
}

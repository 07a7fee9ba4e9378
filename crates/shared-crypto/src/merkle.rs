//! # Merkle Root
//!
//! Order-independent Merkle root over a set of hashable entities.
//!
//! ## Algorithm
//!
//! 1. Hash every leaf and sort by `(sequence, leaf hash)`
//! 2. Pair adjacent hashes left to right; an odd tail pairs with itself
//! 3. Hash each pair as a two-field node
//! 4. Repeat until a single hash remains
//!
//! A single leaf is its own root.

use crate::hashing::{canonical_bytes, hash, Hashable, Sequential};
use crate::HashingError;
use serde::Serialize;

/// Interior node of the tree.
#[derive(Serialize)]
struct MerkleNode<'a> {
    left: &'a str,
    right: &'a str,
}

impl Hashable for MerkleNode<'_> {
    fn canonical_bytes(&self) -> Result<Vec<u8>, HashingError> {
        canonical_bytes(self)
    }
}

/// Compute the Merkle root of `entities`.
///
/// # Errors
///
/// `HashingError::EmptyMerkleInput` when `entities` is empty, or any
/// hashing failure of a leaf.
pub fn merkle_root<T: Hashable + Sequential>(entities: &[T]) -> Result<String, HashingError> {
    if entities.is_empty() {
        return Err(HashingError::EmptyMerkleInput);
    }

    let mut leaves = entities
        .iter()
        .map(|entity| Ok((entity.sequence(), hash(entity)?)))
        .collect::<Result<Vec<_>, HashingError>>()?;
    leaves.sort();

    let level = leaves.into_iter().map(|(_, leaf)| leaf).collect();
    fold_levels(level)
}

fn fold_levels(mut level: Vec<String>) -> Result<String, HashingError> {
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let left = &pair[0];
                let right = pair.get(1).unwrap_or(left);
                hash(&MerkleNode { left, right })
            })
            .collect::<Result<Vec<_>, HashingError>>()?;
    }

    level.pop().ok_or(HashingError::EmptyMerkleInput)
}

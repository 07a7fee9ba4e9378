//! # Double-Digest Hashing
//!
//! Every fingerprint in the chain is `SHA3-512(SHA-512(canonical_bytes))`,
//! rendered as 128 lowercase hex characters.
//!
//! ## Canonical form
//!
//! Entities are encoded with `bincode`, which writes fields in declaration
//! order. Two values with equal fields therefore encode identically no matter
//! how they were populated.
//!
//! ## Concurrency
//!
//! Each call builds its own digest instances, so forging and validation
//! threads can hash in parallel without sharing state.

use crate::HashingError;
use serde::Serialize;
use sha2::{Digest, Sha512};
use sha3::Sha3_512;

/// Raw double-digest output (512-bit).
pub type Digest512 = [u8; 64];

/// An entity with a canonical byte form that can be fingerprinted.
pub trait Hashable {
    /// Canonical bytes fed to the digest.
    ///
    /// Implementations must exclude any field that stores the entity's own
    /// hash.
    fn canonical_bytes(&self) -> Result<Vec<u8>, HashingError>;
}

/// An entity with a natural sequence order.
///
/// Used to sort inputs before list hashing and Merkle construction so that
/// arrival order never affects the result.
pub trait Sequential {
    /// Position of this entity in its natural order.
    fn sequence(&self) -> u64;
}

/// Encode a value into its canonical byte form.
pub fn canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, HashingError> {
    bincode::serialize(value).map_err(|e| HashingError::Serialization(e.to_string()))
}

/// Apply SHA-512 followed by SHA3-512.
pub fn double_digest(data: &[u8]) -> Digest512 {
    let first = Sha512::digest(data);
    let second = Sha3_512::digest(first.as_slice());
    let mut output = [0u8; 64];
    output.copy_from_slice(&second);
    output
}

/// Hex fingerprint of a single entity.
pub fn hash<T: Hashable + ?Sized>(entity: &T) -> Result<String, HashingError> {
    let bytes = non_empty(entity.canonical_bytes()?)?;
    Ok(hex::encode(double_digest(&bytes)))
}

/// Raw fingerprint of an entity list, independent of input order.
///
/// Entities are sorted by [`Sequential::sequence`], ties broken by their
/// canonical bytes, and the whole sorted sequence is encoded and hashed.
pub fn hash_list<T: Hashable + Sequential>(entities: &[T]) -> Result<Vec<u8>, HashingError> {
    let mut encoded = entities
        .iter()
        .map(|entity| Ok((entity.sequence(), non_empty(entity.canonical_bytes()?)?)))
        .collect::<Result<Vec<_>, HashingError>>()?;
    encoded.sort();

    let sequence: Vec<Vec<u8>> = encoded.into_iter().map(|(_, bytes)| bytes).collect();
    let bytes = canonical_bytes(&sequence)?;
    Ok(double_digest(&bytes).to_vec())
}

/// Recompute an entity's fingerprint and compare it case-insensitively.
pub fn is_correct<T: Hashable + ?Sized>(expected: &str, entity: &T) -> Result<bool, HashingError> {
    Ok(hash(entity)?.eq_ignore_ascii_case(expected))
}

/// Count of leading `'0'` hex digits.
#[inline]
pub fn leading_hex_zeros(hash: &str) -> u32 {
    hash.bytes().take_while(|b| *b == b'0').count() as u32
}

/// Whether a hex fingerprint satisfies a difficulty (required leading zeros).
#[inline]
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    leading_hex_zeros(hash) >= difficulty
}

fn non_empty(bytes: Vec<u8>) -> Result<Vec<u8>, HashingError> {
    if bytes.is_empty() {
        return Err(HashingError::EmptySerialization);
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Clone, Debug)]
    struct Record {
        id: u64,
        label: String,
    }

    impl Hashable for Record {
        fn canonical_bytes(&self) -> Result<Vec<u8>, HashingError> {
            canonical_bytes(self)
        }
    }

    impl Sequential for Record {
        fn sequence(&self) -> u64 {
            self.id
        }
    }

    struct Hollow;

    impl Hashable for Hollow {
        fn canonical_bytes(&self) -> Result<Vec<u8>, HashingError> {
            Ok(Vec::new())
        }
    }

    fn record(id: u64, label: &str) -> Record {
        Record {
            id,
            label: label.to_string(),
        }
    }

    #[test]
    fn test_double_digest_is_sha512_then_sha3() {
        let first = Sha512::digest(b"meridian");
        let expected = Sha3_512::digest(first.as_slice());
        assert_eq!(double_digest(b"meridian").as_slice(), expected.as_slice());
    }

    #[test]
    fn test_hash_is_lowercase_hex() {
        let h = hash(&record(1, "a")).unwrap();
        assert_eq!(h.len(), 128);
        assert!(h.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_hash_ignores_population_order() {
        let mut first = Record {
            id: 0,
            label: String::new(),
        };
        first.label = "payload".into();
        first.id = 7;

        let mut second = Record {
            id: 7,
            label: String::new(),
        };
        second.label = "payload".into();

        assert_eq!(hash(&first).unwrap(), hash(&second).unwrap());
    }

    #[test]
    fn test_empty_serialization_is_rejected() {
        assert_eq!(hash(&Hollow), Err(HashingError::EmptySerialization));
    }

    #[test]
    fn test_is_correct_case_insensitive() {
        let r = record(3, "c");
        let h = hash(&r).unwrap();
        assert!(is_correct(&h, &r).unwrap());
        assert!(is_correct(&h.to_uppercase(), &r).unwrap());
        assert!(!is_correct(&h, &record(3, "d")).unwrap());
    }

    #[test]
    fn test_hash_list_order_invariant() {
        let a = vec![record(1, "a"), record(2, "b"), record(3, "c")];
        let b = vec![record(3, "c"), record(1, "a"), record(2, "b")];
        assert_eq!(hash_list(&a).unwrap(), hash_list(&b).unwrap());
    }

    #[test]
    fn test_hash_list_ties_do_not_depend_on_order() {
        let a = vec![record(1, "x"), record(1, "y")];
        let b = vec![record(1, "y"), record(1, "x")];
        assert_eq!(hash_list(&a).unwrap(), hash_list(&b).unwrap());
    }

    #[test]
    fn test_hash_list_detects_membership_change() {
        let full = vec![record(1, "a"), record(2, "b")];
        let partial = vec![record(1, "a")];
        assert_ne!(hash_list(&full).unwrap(), hash_list(&partial).unwrap());
    }

    #[test]
    fn test_leading_zeros() {
        assert_eq!(leading_hex_zeros("000abc"), 3);
        assert_eq!(leading_hex_zeros("abc"), 0);
        assert!(meets_difficulty("00f1", 2));
        assert!(!meets_difficulty("00f1", 3));
        assert!(meets_difficulty("f1", 0));
    }

    #[test]
    fn test_concurrent_hashing_is_stable() {
        let r = record(42, "shared");
        let expected = hash(&r).unwrap();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| (0..50).map(|_| hash(&r).unwrap()).collect::<Vec<_>>()))
                .collect();
            for handle in handles {
                for h in handle.join().unwrap() {
                    assert_eq!(h, expected);
                }
            }
        });
    }
}

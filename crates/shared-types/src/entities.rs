//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Chain**: `Block`, `Consent`, `Transaction`
//! - **Sync identity**: `BlockInfo` (lossy projection of a block)
//!
//! Blocks are immutable once accepted into storage. `Consent` is only
//! mutated while a single block is being forged.

use serde::{Deserialize, Serialize};
use shared_crypto::{canonical_bytes, hash, Hashable, HashingError, Sequential};
use std::time::{SystemTime, UNIX_EPOCH};

/// Identifier of a node in the cluster.
pub type NodeId = String;

/// Protocol version stamped on forged blocks.
pub const PROTOCOL_VERSION: u32 = 1;

/// Timestamp of the genesis block (Unix epoch milliseconds).
pub const GENESIS_TIMESTAMP: u64 = 1_700_000_000_000;

/// Position of the genesis block.
pub const GENESIS_POSITION: u64 = 1;

/// Current Unix time in milliseconds.
pub fn current_time_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

// =============================================================================
// CONSENT
// =============================================================================

/// Consensus algorithm that sealed a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsentType {
    /// Hash puzzle with leading-zero difficulty.
    ProofOfWork,
    /// Majority voting among active members.
    ProofOfMajority,
}

/// Proof-of-work seal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofOfWorkConsent {
    /// Required leading hex zeros in the block hash.
    pub difficulty: u32,
    /// Nonce that satisfied the difficulty.
    pub nonce: u64,
    /// When the (last restart of the) nonce search began, epoch millis.
    pub timestamp: u64,
    /// Wall-clock time spent searching.
    pub milli_seconds_spent_mining: u64,
}

/// Seal attached to a block by the algorithm that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Consent {
    /// Proof-of-work seal.
    ProofOfWork(ProofOfWorkConsent),
    /// Majority-voting seal (no payload yet).
    ProofOfMajority,
}

impl Consent {
    /// Discriminant of this seal.
    pub fn consent_type(&self) -> ConsentType {
        match self {
            Consent::ProofOfWork(_) => ConsentType::ProofOfWork,
            Consent::ProofOfMajority => ConsentType::ProofOfMajority,
        }
    }

    /// Proof-of-work payload, if any.
    pub fn as_proof_of_work(&self) -> Option<&ProofOfWorkConsent> {
        match self {
            Consent::ProofOfWork(pow) => Some(pow),
            Consent::ProofOfMajority => None,
        }
    }
}

// =============================================================================
// TRANSACTIONS
// =============================================================================

/// Reference to a previously created output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    /// Hash of the transaction that created the spent output.
    pub previous_output_hash: String,
    /// Amount consumed.
    pub amount: u64,
}

/// Value assigned to a receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    /// Receiving address.
    pub receiver: String,
    /// Amount assigned.
    pub amount: u64,
    /// Creation time, epoch millis.
    pub timestamp: u64,
}

/// A transfer carried by a block.
///
/// The consensus core treats transactions opaquely: it only hashes them and
/// orders them by timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Double-digest of the transaction body.
    pub hash: String,
    /// Sending address.
    pub sender: String,
    /// Creation time, epoch millis.
    pub timestamp: u64,
    /// Spent outputs.
    pub inputs: Vec<TransactionInput>,
    /// Created outputs.
    pub outputs: Vec<TransactionOutput>,
}

#[derive(Serialize)]
struct TransactionBody<'a> {
    sender: &'a str,
    timestamp: u64,
    inputs: &'a [TransactionInput],
    outputs: &'a [TransactionOutput],
}

impl Transaction {
    /// Build a transaction and compute its hash.
    pub fn new(
        sender: impl Into<String>,
        timestamp: u64,
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
    ) -> Result<Self, HashingError> {
        let mut tx = Self {
            hash: String::new(),
            sender: sender.into(),
            timestamp,
            inputs,
            outputs,
        };
        tx.hash = hash(&tx)?;
        Ok(tx)
    }
}

impl Hashable for Transaction {
    fn canonical_bytes(&self) -> Result<Vec<u8>, HashingError> {
        canonical_bytes(&TransactionBody {
            sender: &self.sender,
            timestamp: self.timestamp,
            inputs: &self.inputs,
            outputs: &self.outputs,
        })
    }
}

impl Sequential for Transaction {
    fn sequence(&self) -> u64 {
        self.timestamp
    }
}

// =============================================================================
// BLOCKS
// =============================================================================

/// A block of the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Height, strictly increasing by one along the chain.
    pub position: u64,
    /// Double-digest of the block seal (all fields except this one).
    pub hash: String,
    /// Hash of the block at `position - 1`.
    pub last_hash: String,
    /// Merkle root of `transactions`.
    pub transaction_merkle_root: String,
    /// Creation time, epoch millis.
    pub timestamp: u64,
    /// Protocol version.
    pub version: u32,
    /// Seal of the producing algorithm.
    pub consent: Consent,
    /// Carried transactions.
    pub transactions: Vec<Transaction>,
}

#[derive(Serialize)]
struct BlockSeal<'a> {
    position: u64,
    last_hash: &'a str,
    transaction_merkle_root: &'a str,
    timestamp: u64,
    version: u32,
    consent: &'a Consent,
    transactions: &'a [Transaction],
}

impl Block {
    /// The fixed first block every node starts from.
    pub fn genesis() -> Result<Self, HashingError> {
        let mut block = Self {
            position: GENESIS_POSITION,
            hash: String::new(),
            last_hash: String::new(),
            transaction_merkle_root: String::new(),
            timestamp: GENESIS_TIMESTAMP,
            version: PROTOCOL_VERSION,
            consent: Consent::ProofOfWork(ProofOfWorkConsent {
                timestamp: GENESIS_TIMESTAMP,
                ..Default::default()
            }),
            transactions: Vec::new(),
        };
        block.hash = hash(&block)?;
        Ok(block)
    }

    /// Whether this is the genesis position.
    pub fn is_genesis(&self) -> bool {
        self.position == GENESIS_POSITION
    }

    /// Sync fingerprint of this block.
    pub fn info(&self) -> BlockInfo {
        BlockInfo::new(self.position, self.hash.clone())
    }

    /// Proof-of-work seal, if the block was mined.
    pub fn proof_of_work(&self) -> Option<&ProofOfWorkConsent> {
        self.consent.as_proof_of_work()
    }
}

impl Hashable for Block {
    fn canonical_bytes(&self) -> Result<Vec<u8>, HashingError> {
        canonical_bytes(&BlockSeal {
            position: self.position,
            last_hash: &self.last_hash,
            transaction_merkle_root: &self.transaction_merkle_root,
            timestamp: self.timestamp,
            version: self.version,
            consent: &self.consent,
            transactions: &self.transactions,
        })
    }
}

impl Sequential for Block {
    fn sequence(&self) -> u64 {
        self.position
    }
}

/// Cheap identity of a block used during sync.
///
/// Ordered by position, then hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockInfo {
    /// Block height.
    pub position: u64,
    /// Block hash.
    pub hash: String,
}

impl BlockInfo {
    /// Create a block info.
    pub fn new(position: u64, hash: impl Into<String>) -> Self {
        Self {
            position,
            hash: hash.into(),
        }
    }
}

impl From<&Block> for BlockInfo {
    fn from(block: &Block) -> Self {
        block.info()
    }
}

impl Hashable for BlockInfo {
    fn canonical_bytes(&self) -> Result<Vec<u8>, HashingError> {
        canonical_bytes(self)
    }
}

impl Sequential for BlockInfo {
    fn sequence(&self) -> u64 {
        self.position
    }
}

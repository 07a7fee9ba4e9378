//! # In-Memory Chain Store
//!
//! Reference `ChainStore` backed by a vector of accepted blocks. Every
//! write goes through boundary validation, so a stale forge or a
//! malformed peer block is rejected here.

use crate::entities::{Block, ConsentType};
use crate::errors::{ChainValidationError, StoreError};
use crate::ports::ChainStore;
use crate::validation::validate_successor;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashSet;
use tracing::debug;

struct ChainState {
    blocks: Vec<Block>,
    hashes: HashSet<String>,
}

impl ChainState {
    fn head(&self) -> Result<&Block, StoreError> {
        self.blocks
            .last()
            .ok_or_else(|| StoreError::Backend("chain has no genesis block".into()))
    }

    fn index_of(&self, position: u64) -> Option<usize> {
        let first = self.blocks.first()?.position;
        position
            .checked_sub(first)
            .map(|offset| offset as usize)
            .filter(|&idx| idx < self.blocks.len())
    }
}

/// Chain held in memory, seeded with the genesis block.
pub struct InMemoryChainStore {
    state: RwLock<ChainState>,
}

impl InMemoryChainStore {
    /// Create a store holding only genesis.
    pub fn new() -> Result<Self, StoreError> {
        let genesis = Block::genesis()?;
        Ok(Self::from_genesis(genesis))
    }

    /// Create a store holding `chain`, which must start at genesis and be
    /// internally linked.
    pub fn with_chain(chain: Vec<Block>) -> Result<Self, StoreError> {
        let mut blocks = chain.into_iter();
        let genesis = blocks
            .next()
            .ok_or_else(|| StoreError::Backend("empty chain".into()))?;
        let store = Self::from_genesis(genesis);
        for block in blocks {
            store.append(block)?;
        }
        Ok(store)
    }

    fn from_genesis(genesis: Block) -> Self {
        let hashes = HashSet::from([genesis.hash.clone()]);
        Self {
            state: RwLock::new(ChainState {
                blocks: vec![genesis],
                hashes,
            }),
        }
    }

    fn append(&self, block: Block) -> Result<(), StoreError> {
        let mut state = self.state.write();
        if state.hashes.contains(&block.hash) {
            return Err(ChainValidationError::AlreadyKnown { hash: block.hash }.into());
        }
        validate_successor(state.head()?, &block)?;

        debug!(
            "[mc-store] Block {} accepted ({})",
            block.position, block.hash
        );
        state.hashes.insert(block.hash.clone());
        state.blocks.push(block);
        Ok(())
    }
}

#[async_trait]
impl ChainStore for InMemoryChainStore {
    async fn latest_block(&self) -> Result<Block, StoreError> {
        self.state.read().head().cloned()
    }

    async fn latest_of_type(&self, consent_type: ConsentType) -> Result<Option<Block>, StoreError> {
        Ok(self
            .state
            .read()
            .blocks
            .iter()
            .rev()
            .find(|b| b.consent.consent_type() == consent_type)
            .cloned())
    }

    async fn blocks_in_range(
        &self,
        from_position: u64,
        count: u64,
    ) -> Result<Vec<Block>, StoreError> {
        let state = self.state.read();
        let Some(start) = state.index_of(from_position) else {
            return Ok(Vec::new());
        };
        Ok(state
            .blocks
            .iter()
            .skip(start)
            .take(count as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.state.read().blocks.len() as u64)
    }

    async fn count_of_type(&self, consent_type: ConsentType) -> Result<u64, StoreError> {
        Ok(self
            .state
            .read()
            .blocks
            .iter()
            .filter(|b| !b.is_genesis() && b.consent.consent_type() == consent_type)
            .count() as u64)
    }

    async fn save(&self, block: Block) -> Result<(), StoreError> {
        self.append(block)
    }

    async fn remove_after(&self, position: u64) -> Result<u64, StoreError> {
        let mut state = self.state.write();
        let Some(idx) = state.index_of(position) else {
            return match state.blocks.first() {
                Some(genesis) if position < genesis.position => Err(StoreError::GenesisImmutable),
                _ => Ok(0),
            };
        };

        let removed: Vec<Block> = state.blocks.drain(idx + 1..).collect();
        for block in &removed {
            state.hashes.remove(&block.hash);
        }
        if !removed.is_empty() {
            debug!(
                "[mc-store] Removed {} blocks above position {}",
                removed.len(),
                position
            );
        }
        Ok(removed.len() as u64)
    }
}

//! # Chain Sync Engine
//!
//! Reconciles the local chain with the majority view of the network.
//!
//! ## Strategies
//!
//! - **Scanning**: the divergence point is unknown. Walk back window by
//!   window until local and majority hashes agree; everything after that
//!   position is missing.
//! - **Confident**: the local head is believed correct. Fetch forward and
//!   accept the batch only if its first info matches the stored block at
//!   that position.
//!
//! Both share one information-gathering round (random peer subset, quorum
//! fan-out, whole-round retries) and one majority-selection step. Full
//! blocks are only downloaded for infos the majority agreed on, and only
//! from the peers that agreed.

use crate::algorithms::{choose, find_fork_point, FanoutMessenger};
use crate::config::SyncConfig;
use crate::domain::{PeerMessage, ReconcileReport, ScanOutcome, SyncError};
use crate::ports::{ChainSyncApi, PeerTransport, TransactionPoolSync};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use shared_crypto::is_correct;
use shared_types::{
    validate_successor, Block, BlockInfo, BlockInfoResponse, BlockInfoResult, ChainStore,
    NetworkStatistics, NodeId, SyncBatchRequest, SyncResponse, Topic, GENESIS_POSITION,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Chain reconciliation engine.
pub struct ChainSyncEngine {
    node_id: NodeId,
    config: SyncConfig,
    store: Arc<dyn ChainStore>,
    network: Arc<dyn NetworkStatistics>,
    transport: Arc<dyn PeerTransport>,
    pool_sync: Arc<dyn TransactionPoolSync>,
    fanout: FanoutMessenger,
}

/// Dependencies for ChainSyncEngine
pub struct SyncDependencies {
    /// This node's id (never asked)
    pub node_id: NodeId,
    /// Fan-out and scanning parameters
    pub config: SyncConfig,
    /// Local chain
    pub store: Arc<dyn ChainStore>,
    /// Active peers
    pub network: Arc<dyn NetworkStatistics>,
    /// Cluster transport
    pub transport: Arc<dyn PeerTransport>,
    /// Pool to resync after reconciliation
    pub pool_sync: Arc<dyn TransactionPoolSync>,
}

impl ChainSyncEngine {
    /// Create an engine from its dependencies.
    pub fn new(deps: SyncDependencies) -> Self {
        let fanout = FanoutMessenger::new(deps.config.request_timeout());
        Self {
            node_id: deps.node_id,
            config: deps.config,
            store: deps.store,
            network: deps.network,
            transport: deps.transport,
            pool_sync: deps.pool_sync,
            fanout,
        }
    }

    // =========================================================================
    // Information gathering
    // =========================================================================

    async fn select_targets(&self, request: &SyncBatchRequest) -> Vec<NodeId> {
        let mut candidates = match &request.selected_node_ids {
            Some(ids) => ids.clone(),
            None => self.network.active_node_ids().await,
        };
        candidates.retain(|id| *id != self.node_id);
        candidates.shuffle(&mut rand::thread_rng());
        candidates.truncate(request.ideal_receive_node_count as usize);
        candidates
    }

    async fn request_infos(
        &self,
        node_id: NodeId,
        request: SyncBatchRequest,
    ) -> Result<BlockInfoResponse, SyncError> {
        let reply = self
            .transport
            .request(&node_id, Topic::BlockInfoSync, PeerMessage::BlockInfoRequest(request))
            .await?;
        match reply {
            // Attribute the view to the peer we asked, not the one it claims.
            PeerMessage::BlockInfos(response) => {
                Ok(BlockInfoResponse::new(node_id, response.entities))
            }
            _ => Err(SyncError::UnexpectedResponse {
                node_id,
                topic: Topic::BlockInfoSync,
            }),
        }
    }

    async fn request_blocks(
        &self,
        node_id: NodeId,
        request: SyncBatchRequest,
    ) -> Result<SyncResponse<Block>, SyncError> {
        let reply = self
            .transport
            .request(&node_id, Topic::BlockSync, PeerMessage::BlockRequest(request))
            .await?;
        match reply {
            PeerMessage::Blocks(response) => Ok(response),
            _ => Err(SyncError::UnexpectedResponse {
                node_id,
                topic: Topic::BlockSync,
            }),
        }
    }

    /// Ask a random subset of active peers for the infos of a range.
    ///
    /// The whole round is retried with a fresh request id while fewer than
    /// `min_informative_responses` non-empty answers come back.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_block_infos(
        &self,
        from_position: u64,
        batch_size: u32,
    ) -> Result<Vec<BlockInfoResponse>, SyncError> {
        let mut request = SyncBatchRequest::new(from_position, batch_size, Topic::BlockInfoSync)
            .with_receivers(self.config.fanout_width)
            .with_retries(self.config.max_fetch_retries);
        let mut attempt = 0;

        loop {
            let targets = self.select_targets(&request).await;
            if targets.is_empty() {
                return Err(SyncError::NoActivePeers);
            }

            let round = &request;
            let responses = self
                .fanout
                .fetch(targets, |node_id| self.request_infos(node_id, round.clone()))
                .await;

            let informative = responses.iter().filter(|r| !r.infos.is_empty()).count();
            if informative >= self.config.min_informative_responses
                || attempt >= request.max_fetch_retries
            {
                debug!(
                    "[mc-sync] {} responses ({} informative) for {}..={}",
                    responses.len(),
                    informative,
                    request.from_position,
                    request.to_position()
                );
                return Ok(responses);
            }

            attempt += 1;
            debug!(
                "[mc-sync] Only {} informative responses, retry {}/{}",
                informative, attempt, request.max_fetch_retries
            );
            request = request.retried();
        }
    }

    // =========================================================================
    // Strategies
    // =========================================================================

    /// Scanning strategy: locate the fork point walking back from
    /// `from_position`, one window at a time.
    #[tracing::instrument(skip(self))]
    pub async fn scan_for_missing(&self, from_position: u64) -> Result<ScanOutcome, SyncError> {
        let window = self.config.scan_window_size.max(1);
        let mut cursor = from_position.max(GENESIS_POSITION);
        let mut accumulated = BlockInfoResult::default();
        let mut saw_view = false;

        loop {
            let start = cursor.saturating_sub(window - 1).max(GENESIS_POSITION);
            let window_len = cursor - start + 1;
            // Ask past the window too, so a match already carries the missing range.
            let batch = u32::try_from(window_len + u64::from(self.config.batch_size))
                .unwrap_or(u32::MAX);

            let responses = self.fetch_block_infos(start, batch).await?;
            if let Some(view) = choose(responses) {
                saw_view = true;
                let local = self.store.block_infos_in_range(start, window_len).await?;
                if let Some(fork_position) = find_fork_point(&local, &view.infos) {
                    let mut missing = view;
                    missing.absorb(accumulated);
                    missing.retain_from(fork_position + 1);
                    info!(
                        "[mc-sync] Fork point at {}, {} blocks missing",
                        fork_position,
                        missing.infos.len()
                    );
                    return Ok(ScanOutcome {
                        fork_position,
                        missing,
                    });
                }
                accumulated.absorb(view);
            }

            if start == GENESIS_POSITION {
                return Err(if saw_view {
                    warn!("[mc-sync] No common ancestor down to genesis, full resync required");
                    SyncError::SyncDivergence
                } else {
                    SyncError::NoPeerView { from_position }
                });
            }

            debug!(
                "[mc-sync] No match in {}..={}, sliding window back",
                start, cursor
            );
            cursor = start - 1;
        }
    }

    /// Confident strategy: fetch forward from `from_position` and trust the
    /// batch only if its first info matches the local block there.
    ///
    /// A mismatch yields `Ok(None)`; there is no fallback to scanning.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_confident(
        &self,
        from_position: u64,
        batch_size: u32,
    ) -> Result<Option<BlockInfoResult>, SyncError> {
        let responses = self.fetch_block_infos(from_position, batch_size).await?;
        let Some(view) = choose(responses) else {
            return Ok(None);
        };
        let Some(first) = view.infos.first() else {
            return Ok(None);
        };
        if first.position != from_position {
            warn!(
                "[mc-sync] Batch starts at {} instead of {}, rejecting",
                first.position, from_position
            );
            return Ok(None);
        }

        match self.store.block_at(from_position).await? {
            Some(local) if local.hash.eq_ignore_ascii_case(&first.hash) => Ok(Some(view)),
            Some(_) => {
                warn!(
                    "[mc-sync] Overlap mismatch at {}, rejecting batch",
                    from_position
                );
                Ok(None)
            }
            None => {
                warn!(
                    "[mc-sync] No local block at {}, rejecting batch",
                    from_position
                );
                Ok(None)
            }
        }
    }

    // =========================================================================
    // Applying
    // =========================================================================

    async fn fetch_blocks(
        &self,
        infos: &[BlockInfo],
        node_ids: &[NodeId],
    ) -> Result<Vec<Block>, SyncError> {
        let Some(first) = infos.first() else {
            return Ok(Vec::new());
        };
        let count = u32::try_from(infos.len()).unwrap_or(u32::MAX);
        let request = SyncBatchRequest::new(first.position, count, Topic::BlockSync)
            .with_receivers(u32::try_from(node_ids.len()).unwrap_or(u32::MAX))
            .with_selected_nodes(node_ids.to_vec());

        let targets = self.select_targets(&request).await;
        if targets.is_empty() {
            return Err(SyncError::NoActivePeers);
        }
        let round = &request;
        let responses = self
            .fanout
            .fetch(targets, |node_id| self.request_blocks(node_id, round.clone()))
            .await;

        let mut by_hash: HashMap<String, Block> = HashMap::new();
        for block in responses.into_iter().flat_map(|r| r.entities) {
            if matches!(is_correct(&block.hash, &block), Ok(true)) {
                by_hash.entry(block.hash.clone()).or_insert(block);
            }
        }

        let mut blocks = Vec::with_capacity(infos.len());
        for info in infos {
            match by_hash.remove(&info.hash) {
                Some(block) if block.position == info.position => blocks.push(block),
                _ => break,
            }
        }
        Ok(blocks)
    }

    /// Download the blocks `result` describes from its agreeing peers and
    /// make them the local chain from the first differing position on.
    ///
    /// Infos identical to local storage are skipped. Blocks are checked
    /// against the agreed hashes and against each other before the diverged
    /// local suffix is removed.
    #[tracing::instrument(skip(self, result), fields(from = ?result.first_position(), to = ?result.last_position()))]
    pub async fn apply_missing(&self, result: &BlockInfoResult) -> Result<u64, SyncError> {
        let Some(first_position) = result.first_position() else {
            return Ok(0);
        };
        let local: HashMap<u64, String> = self
            .store
            .block_infos_in_range(first_position, result.infos.len() as u64)
            .await?
            .into_iter()
            .map(|i| (i.position, i.hash))
            .collect();
        let pending: Vec<BlockInfo> = result
            .infos
            .iter()
            .skip_while(|i| local.get(&i.position) == Some(&i.hash))
            .cloned()
            .collect();

        let Some(first) = pending.first() else {
            return Ok(0);
        };
        let from_position = first.position;
        if from_position <= GENESIS_POSITION {
            return Err(SyncError::SyncDivergence);
        }
        let Some(parent) = self.store.block_at(from_position - 1).await? else {
            return Err(SyncError::BlocksUnavailable {
                from_position: from_position - 1,
            });
        };

        let fetched = self.fetch_blocks(&pending, &result.node_ids).await?;
        let mut chain: Vec<Block> = Vec::with_capacity(fetched.len());
        for block in fetched {
            if let Err(e) = validate_successor(chain.last().unwrap_or(&parent), &block) {
                warn!(
                    "[mc-sync] Agreed block {} failed validation: {}",
                    block.position, e
                );
                break;
            }
            chain.push(block);
        }
        if chain.is_empty() {
            return Err(SyncError::BlocksUnavailable { from_position });
        }

        let removed = self.store.remove_after(from_position - 1).await?;
        if removed > 0 {
            info!(
                "[mc-sync] Rolled back {} diverged blocks after {}",
                removed,
                from_position - 1
            );
        }

        let mut applied = 0;
        for block in chain {
            self.store.save(block).await?;
            applied += 1;
        }
        info!(
            "[mc-sync] Applied {} blocks from position {}",
            applied, from_position
        );
        Ok(applied)
    }

    /// Repeat confident rounds from the local head until peers report
    /// nothing new.
    pub async fn catch_up(&self) -> Result<u64, SyncError> {
        let mut total = 0;
        loop {
            let head = self.store.latest_block().await?;
            let Some(view) = self
                .fetch_confident(head.position, self.config.batch_size)
                .await?
            else {
                break;
            };
            if view.last_position().map_or(true, |last| last <= head.position) {
                break;
            }
            let applied = self.apply_missing(&view).await?;
            if applied == 0 {
                break;
            }
            total += applied;
        }
        Ok(total)
    }

    async fn reconcile_chain(
        &self,
        head_position: u64,
        report: &mut ReconcileReport,
    ) -> Result<(), SyncError> {
        let outcome = self.scan_for_missing(head_position).await?;
        report.fork_position = Some(outcome.fork_position);
        report.blocks_applied += self.apply_missing(&outcome.missing).await?;
        report.blocks_applied += self.catch_up().await?;
        Ok(())
    }

    /// Startup reconciliation: scan from the local head, apply what is
    /// missing, catch up, then resync the transaction pool.
    pub async fn reconcile_on_startup(&self) -> Result<ReconcileReport, SyncError> {
        let head = self.store.latest_block().await?;
        info!(
            "[mc-sync] Reconciling local chain from position {}",
            head.position
        );

        let mut report = ReconcileReport::default();
        match self.reconcile_chain(head.position, &mut report).await {
            Ok(()) => {}
            Err(SyncError::NoActivePeers) => {
                info!("[mc-sync] No active peers, keeping local chain");
            }
            Err(e) if e.is_network_unavailable() => {
                warn!("[mc-sync] Reconciliation incomplete, keeping local chain: {}", e);
            }
            Err(e) => return Err(e),
        }

        report.transactions_resynced = self.pool_sync.resync_all().await?;
        info!(
            "[mc-sync] Reconciliation done: fork {:?}, {} blocks applied",
            report.fork_position, report.blocks_applied
        );
        Ok(report)
    }
}

#[async_trait]
impl ChainSyncApi for ChainSyncEngine {
    async fn reconcile_on_startup(&self) -> Result<ReconcileReport, SyncError> {
        ChainSyncEngine::reconcile_on_startup(self).await
    }

    async fn catch_up(&self) -> Result<u64, SyncError> {
        ChainSyncEngine::catch_up(self).await
    }

    async fn scan_for_missing(&self, from_position: u64) -> Result<ScanOutcome, SyncError> {
        ChainSyncEngine::scan_for_missing(self, from_position).await
    }

    async fn fetch_confident(
        &self,
        from_position: u64,
        batch_size: u32,
    ) -> Result<Option<BlockInfoResult>, SyncError> {
        ChainSyncEngine::fetch_confident(self, from_position, batch_size).await
    }

    async fn apply_missing(&self, result: &BlockInfoResult) -> Result<u64, SyncError> {
        ChainSyncEngine::apply_missing(self, result).await
    }
}

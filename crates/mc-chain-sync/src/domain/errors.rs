//! # Domain Errors
//!
//! Error types for chain sync. Failures of a single peer are absorbed by the
//! fan-out; only divergence and storage failures reach the caller.

use shared_types::{NodeId, StoreError, Topic};
use thiserror::Error;
use uuid::Uuid;

/// Chain sync error types.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A peer call failed in transport.
    #[error("Request to {node_id} failed: {reason}")]
    PeerRequest {
        /// Peer that was asked
        node_id: NodeId,
        /// Transport reason
        reason: String,
    },

    /// A peer answered with the wrong message kind.
    #[error("Unexpected response from {node_id} on {topic}")]
    UnexpectedResponse {
        /// Peer that answered
        node_id: NodeId,
        /// Topic of the request
        topic: Topic,
    },

    /// A request arrived on a topic that does not accept it.
    #[error("Unsupported message on {0}")]
    UnsupportedMessage(Topic),

    /// The same request id was already answered.
    #[error("Duplicate request {0}")]
    DuplicateRequest(Uuid),

    /// No active peers to ask.
    #[error("No active peers")]
    NoActivePeers,

    /// Peers were asked but none returned a usable view.
    #[error("No peer view available from position {from_position}")]
    NoPeerView {
        /// First requested position
        from_position: u64,
    },

    /// Scanning reached position 1 without a common ancestor.
    #[error("Chain diverges from the network down to position 1: full resync required")]
    SyncDivergence,

    /// Agreed blocks could not be fetched from any agreeing peer.
    #[error("Blocks from position {from_position} unavailable")]
    BlocksUnavailable {
        /// First missing position
        from_position: u64,
    },

    /// Local storage rejected or failed an operation.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Transaction-pool resynchronisation failed.
    #[error("Transaction pool resync failed: {0}")]
    PoolResync(String),
}

impl SyncError {
    /// Errors confined to one peer; the fan-out swallows these.
    pub fn is_peer_local(&self) -> bool {
        matches!(
            self,
            Self::PeerRequest { .. }
                | Self::UnexpectedResponse { .. }
                | Self::UnsupportedMessage(_)
                | Self::DuplicateRequest(_)
        )
    }

    /// The network could not supply a usable view right now; the local
    /// chain stays as it is.
    pub fn is_network_unavailable(&self) -> bool {
        matches!(
            self,
            Self::NoActivePeers | Self::NoPeerView { .. } | Self::BlocksUnavailable { .. }
        )
    }

    /// Errors that mean the local chain cannot be reconciled incrementally.
    pub fn requires_full_resync(&self) -> bool {
        matches!(self, Self::SyncDivergence)
    }
}

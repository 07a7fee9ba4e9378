//! # Peer Messages
//!
//! Payloads carried by `PeerTransport`. Encoding and delivery are the
//! transport's concern.

use serde::{Deserialize, Serialize};
use shared_types::{Block, BlockInfo, SyncBatchRequest, SyncResponse};

/// Message exchanged between nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeerMessage {
    /// Ask for `BlockInfo`s of a range.
    BlockInfoRequest(SyncBatchRequest),
    /// `BlockInfo`s of a range.
    BlockInfos(SyncResponse<BlockInfo>),
    /// Ask for full blocks of a range.
    BlockRequest(SyncBatchRequest),
    /// Full blocks of a range.
    Blocks(SyncResponse<Block>),
    /// A freshly forged or accepted block.
    FreshBlock(Block),
}

impl PeerMessage {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PeerMessage::BlockInfoRequest(_) => "block-info-request",
            PeerMessage::BlockInfos(_) => "block-infos",
            PeerMessage::BlockRequest(_) => "block-request",
            PeerMessage::Blocks(_) => "blocks",
            PeerMessage::FreshBlock(_) => "fresh-block",
        }
    }
}

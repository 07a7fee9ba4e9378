//! # Fork-Point Matching
//!
//! Compare a local and a peer view of the same range position by position.

use shared_types::BlockInfo;
use std::collections::HashMap;

/// Highest position where `local` and `peer` agree before their first
/// disagreement.
///
/// Both inputs are sorted first. Positions only one side reports are not
/// compared. Returns `None` when the lowest shared position already differs
/// or no position is shared.
pub fn find_fork_point(local: &[BlockInfo], peer: &[BlockInfo]) -> Option<u64> {
    let local: HashMap<u64, &str> = local
        .iter()
        .map(|i| (i.position, i.hash.as_str()))
        .collect();
    let mut peer: Vec<&BlockInfo> = peer.iter().collect();
    peer.sort();

    let mut fork_point = None;
    for info in peer {
        match local.get(&info.position) {
            Some(hash) if *hash == info.hash => fork_point = Some(info.position),
            Some(_) => break,
            None => continue,
        }
    }
    fork_point
}

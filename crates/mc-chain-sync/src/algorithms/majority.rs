//! # Majority Selection
//!
//! Pick the view of a block range that most peers agree on.
//!
//! 1. Drop responses whose positions are not one contiguous run.
//! 2. Cluster responses that never report different hashes for the same
//!    position.
//! 3. The cluster with the most members wins; ties go to the cluster whose
//!    weakest member reports the most infos.

use shared_types::{BlockInfo, BlockInfoResponse, BlockInfoResult};
use std::collections::HashMap;
use tracing::debug;

/// Whether `infos` cover one contiguous run of positions with no repeats.
pub fn is_contiguous(infos: &[BlockInfo]) -> bool {
    let mut positions: Vec<u64> = infos.iter().map(|i| i.position).collect();
    positions.sort_unstable();
    positions.windows(2).all(|w| w[1] == w[0] + 1)
}

/// Two responses conflict if they report different hashes at a shared position.
pub fn is_peaceful(a: &BlockInfoResponse, b: &BlockInfoResponse) -> bool {
    let hashes: HashMap<u64, &str> = a
        .infos
        .iter()
        .map(|i| (i.position, i.hash.as_str()))
        .collect();
    b.infos.iter().all(|info| {
        hashes
            .get(&info.position)
            .map_or(true, |hash| *hash == info.hash)
    })
}

struct Cluster {
    members: Vec<BlockInfoResponse>,
}

impl Cluster {
    fn accepts(&self, response: &BlockInfoResponse) -> bool {
        self.members.iter().all(|m| is_peaceful(m, response))
    }

    fn strength(&self) -> usize {
        self.members.iter().map(|m| m.infos.len()).min().unwrap_or(0)
    }

    fn into_result(self) -> BlockInfoResult {
        let node_ids = self.members.iter().map(|m| m.node_id.clone()).collect();
        let infos = self
            .members
            .into_iter()
            .max_by_key(|m| m.infos.len())
            .map(|m| m.infos)
            .unwrap_or_default();
        BlockInfoResult::new(node_ids, infos)
    }
}

/// Select the majority view among `responses`.
///
/// Empty and gapped responses take no part. Returns `None` when nothing is
/// left to choose from.
pub fn choose(responses: Vec<BlockInfoResponse>) -> Option<BlockInfoResult> {
    let mut clusters: Vec<Cluster> = Vec::new();

    for response in responses {
        if response.infos.is_empty() {
            continue;
        }
        if !is_contiguous(&response.infos) {
            debug!(
                "[mc-sync] Dropping gapped response from {}",
                response.node_id
            );
            continue;
        }
        match clusters.iter_mut().find(|c| c.accepts(&response)) {
            Some(cluster) => cluster.members.push(response),
            None => clusters.push(Cluster {
                members: vec![response],
            }),
        }
    }

    let mut winner: Option<Cluster> = None;
    for cluster in clusters {
        let better = match &winner {
            None => true,
            Some(best) => {
                (cluster.members.len(), cluster.strength())
                    > (best.members.len(), best.strength())
            }
        };
        if better {
            winner = Some(cluster);
        }
    }

    winner.map(Cluster::into_result)
}

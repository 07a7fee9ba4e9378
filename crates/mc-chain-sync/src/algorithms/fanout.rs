//! # Quorum Fan-Out
//!
//! Send a batch of requests concurrently and return once enough of them
//! succeed. Failed or timed-out calls are logged and dropped; calls still in
//! flight when the quorum is met are abandoned, not awaited.

use futures::stream::{FuturesUnordered, StreamExt};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Minimum successes a fan-out over `request_count` requests waits for.
pub fn minimum_desired(request_count: usize) -> usize {
    std::cmp::max(3, request_count / 2)
}

/// Concurrent request/collect primitive.
#[derive(Clone, Debug)]
pub struct FanoutMessenger {
    request_timeout: Duration,
}

impl FanoutMessenger {
    /// Create a messenger bounding each call by `request_timeout`.
    pub fn new(request_timeout: Duration) -> Self {
        Self { request_timeout }
    }

    /// Issue every request and collect successes until
    /// `minimum_desired(requests.len())` of them arrived.
    pub async fn fetch<Req, Resp, E, F, Fut>(&self, requests: Vec<Req>, call: F) -> Vec<Resp>
    where
        F: Fn(Req) -> Fut,
        Fut: Future<Output = Result<Resp, E>>,
        E: Display,
    {
        let minimum = minimum_desired(requests.len());
        self.fetch_with_minimum(requests, minimum, call).await
    }

    /// Like `fetch` with an explicit quorum.
    ///
    /// Returns fewer than `minimum` results only once every call has settled.
    pub async fn fetch_with_minimum<Req, Resp, E, F, Fut>(
        &self,
        requests: Vec<Req>,
        minimum: usize,
        call: F,
    ) -> Vec<Resp>
    where
        F: Fn(Req) -> Fut,
        Fut: Future<Output = Result<Resp, E>>,
        E: Display,
    {
        if requests.is_empty() {
            return Vec::new();
        }

        let total = requests.len();
        let mut pending: FuturesUnordered<_> = requests
            .into_iter()
            .map(|request| tokio::time::timeout(self.request_timeout, call(request)))
            .collect();

        let mut results = Vec::with_capacity(minimum.min(total));
        while let Some(outcome) = pending.next().await {
            match outcome {
                Ok(Ok(response)) => {
                    results.push(response);
                    if results.len() >= minimum {
                        break;
                    }
                }
                Ok(Err(e)) => debug!("[mc-sync] Peer request failed: {}", e),
                Err(_) => debug!(
                    "[mc-sync] Peer request timed out after {:?}",
                    self.request_timeout
                ),
            }
        }

        if !pending.is_empty() {
            debug!(
                "[mc-sync] Quorum of {} reached, abandoning {} of {} requests",
                minimum,
                pending.len(),
                total
            );
        }
        results
    }
}

//! Paced, cancellable, fail-soft dispatch of remote calls
//!
//! Every call the crawl makes goes through the [`Dispatcher`]: it waits on the
//! shared rate limiter, races the call against the cancellation token, and
//! turns remote errors into empty results after logging them.

use crate::crawler::client::{RemoteGraphClient, RemoteResult};
use crate::crawler::rate_limit::RateLimiter;
use crate::state::{NodeId, NodeRecord};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Result of a dispatched call
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch<T> {
    /// The call finished; failures are already folded into an empty value
    Completed(T),
    /// The crawl was cancelled before the call finished
    Cancelled,
}

/// Counters of remote calls issued during a crawl
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallStats {
    pub recommendation_calls: u64,
    pub detail_calls: u64,
    pub thumbnail_calls: u64,
    pub failed_calls: u64,
}

impl CallStats {
    /// Total number of calls that reached the remote service
    pub fn total(&self) -> u64 {
        self.recommendation_calls + self.detail_calls + self.thumbnail_calls
    }
}

/// Sends remote calls one at a time through the shared rate limiter
pub struct Dispatcher {
    client: Arc<dyn RemoteGraphClient>,
    limiter: Arc<RateLimiter>,
    cancel: CancellationToken,
    stats: CallStats,
}

impl Dispatcher {
    pub fn new(
        client: Arc<dyn RemoteGraphClient>,
        limiter: Arc<RateLimiter>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            client,
            limiter,
            cancel,
            stats: CallStats::default(),
        }
    }

    /// Returns whether the crawl has been asked to stop
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Counters of the calls issued so far
    pub fn stats(&self) -> CallStats {
        self.stats
    }

    /// Waits for the limiter, then runs `call`, unless cancellation wins first
    async fn paced<T>(&self, call: impl Future<Output = RemoteResult<T>>) -> Option<RemoteResult<T>> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            result = async {
                self.limiter.wait().await;
                call.await
            } => Some(result),
        }
    }

    /// Fetches the recommendations of one node
    ///
    /// A failed call yields an empty list: the node simply has no neighbours.
    pub async fn recommendations(&mut self, id: &str) -> Dispatch<Vec<NodeId>> {
        let result = self.paced(self.client.fetch_recommendations(id)).await;

        match result {
            None => Dispatch::Cancelled,
            Some(Ok(ids)) => {
                self.stats.recommendation_calls += 1;
                Dispatch::Completed(ids)
            }
            Some(Err(e)) => {
                self.stats.recommendation_calls += 1;
                self.stats.failed_calls += 1;
                tracing::warn!("Recommendations for {} unavailable: {}", id, e);
                Dispatch::Completed(Vec::new())
            }
        }
    }

    /// Fetches details for one batch
    ///
    /// A failed call yields an empty map: every id of the batch will fail.
    pub async fn details(&mut self, ids: &[NodeId]) -> Dispatch<HashMap<NodeId, NodeRecord>> {
        let result = self.paced(self.client.fetch_details_batch(ids)).await;

        match result {
            None => Dispatch::Cancelled,
            Some(Ok(details)) => {
                self.stats.detail_calls += 1;
                Dispatch::Completed(details)
            }
            Some(Err(e)) => {
                self.stats.detail_calls += 1;
                self.stats.failed_calls += 1;
                tracing::warn!("Details for a batch of {} unavailable: {}", ids.len(), e);
                Dispatch::Completed(HashMap::new())
            }
        }
    }

    /// Fetches thumbnail URLs for one batch
    ///
    /// A failed call yields an empty map: records are kept without images.
    pub async fn thumbnails(&mut self, ids: &[NodeId]) -> Dispatch<HashMap<NodeId, String>> {
        let result = self.paced(self.client.fetch_thumbnails_batch(ids)).await;

        match result {
            None => Dispatch::Cancelled,
            Some(Ok(thumbnails)) => {
                self.stats.thumbnail_calls += 1;
                Dispatch::Completed(thumbnails)
            }
            Some(Err(e)) => {
                self.stats.thumbnail_calls += 1;
                self.stats.failed_calls += 1;
                tracing::warn!("Thumbnails for a batch of {} unavailable: {}", ids.len(), e);
                Dispatch::Completed(HashMap::new())
            }
        }
    }
}

//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the breadth-first loop that coordinates all aspects of
//! a crawl:
//! - Seeding the frontier, collection, and enrichment batch
//! - Expanding nodes in frontier order through paced remote calls
//! - Registering newly discovered ids and flushing full batches
//! - Stopping at the target size, graph exhaustion, or cancellation
//! - Draining the last partial batch and building the final output

use crate::config::{Config, CrawlerConfig};
use crate::crawler::batcher::{EnrichmentBatcher, FlushOutcome};
use crate::crawler::client::{HttpGraphClient, RemoteGraphClient};
use crate::crawler::dispatch::{Dispatch, Dispatcher};
use crate::crawler::rate_limit::RateLimiter;
use crate::output::{average_visits, CrawlReport};
use crate::state::{CollectionStore, Frontier, NodeId, NodeRecord, VisitedTracker};
use crate::CrawlError;
use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Lifecycle of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    /// Expanding the frontier
    Running,
    /// Frontier exhausted or target reached; enriching the remaining batch
    Draining,
    /// Output is ready
    Done,
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// Final product of a crawl
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Enriched records in discovery order, ids pairwise distinct
    pub records: Vec<NodeRecord>,
    pub report: CrawlReport,
}

/// Main crawler coordinator structure
///
/// Owns every piece of mutable crawl state; remote calls go through the
/// dispatcher, which is the only part shared with other tasks.
pub struct Coordinator {
    seed_id: NodeId,
    frontier: Frontier,
    visited: VisitedTracker,
    store: CollectionStore,
    batcher: EnrichmentBatcher,
    dispatcher: Dispatcher,
    phase: CrawlPhase,
    cancelled: bool,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - Traversal settings (seed, target, delay, batch size)
    /// * `client` - The remote catalogue
    /// * `cancel` - Token that stops the crawl early when triggered
    pub fn new(
        config: &CrawlerConfig,
        client: Arc<dyn RemoteGraphClient>,
        cancel: CancellationToken,
    ) -> Self {
        let limiter = Arc::new(RateLimiter::from_millis(config.request_delay_ms));

        Self {
            seed_id: config.seed_id.trim().to_string(),
            frontier: Frontier::new(),
            visited: VisitedTracker::new(),
            store: CollectionStore::new(config.target_count),
            batcher: EnrichmentBatcher::new(config.batch_size),
            dispatcher: Dispatcher::new(client, limiter, cancel),
            phase: CrawlPhase::Running,
            cancelled: false,
        }
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    fn enter(&mut self, phase: CrawlPhase) {
        tracing::info!("Crawl phase: {} -> {}", self.phase, phase);
        self.phase = phase;
    }

    /// Runs the crawl to completion
    ///
    /// Remote failures never abort the run; they only cost the nodes involved.
    pub async fn run(mut self) -> CrawlOutcome {
        let started_at = Utc::now();
        let clock = Instant::now();

        tracing::info!(
            "Starting crawl from {} (target {} games, batch size {})",
            self.seed_id,
            self.store.capacity(),
            self.batcher.batch_size()
        );

        self.seed().await;
        self.expand_frontier().await;

        if self.cancelled {
            tracing::warn!("Crawl cancelled; skipping final enrichment");
        } else {
            self.enter(CrawlPhase::Draining);
            tracing::info!("Enriching {} remaining games", self.batcher.len());
            if let FlushOutcome::Cancelled(_) = self
                .batcher
                .flush_remaining(&mut self.dispatcher, &mut self.store)
                .await
            {
                self.cancelled = true;
            }
        }

        self.enter(CrawlPhase::Done);

        let calls = self.dispatcher.stats();
        let expanded = self.visited.len();
        let target_count = self.store.capacity();
        let discovered = self.store.len();
        let resolved = self.store.resolved_count();
        let failed = self.store.failed_count();
        let pending = self.store.pending_count();
        let records = self.store.into_records();

        let report = CrawlReport {
            seed_id: self.seed_id,
            target_count,
            started_at,
            finished_at: Utc::now(),
            duration: clock.elapsed(),
            cancelled: self.cancelled,
            discovered,
            expanded,
            resolved,
            failed,
            pending,
            calls,
            average_visits: average_visits(&records),
        };

        tracing::info!(
            "Crawl finished: {} valid games collected from {} ids in {:.2?}",
            report.resolved,
            report.discovered,
            report.duration
        );

        if report.is_empty() {
            tracing::warn!("No records collected; the remote service may be unreachable");
        }

        CrawlOutcome { records, report }
    }

    /// Registers the seed as the first discovered node
    async fn seed(&mut self) {
        let seed = self.seed_id.clone();
        self.store.insert_pending(&seed);
        self.frontier.enqueue(&seed, &self.visited);

        if self.batcher.add(&seed) {
            self.flush_batch().await;
        }
    }

    /// Expands nodes in breadth-first order until a stop condition holds
    async fn expand_frontier(&mut self) {
        while !self.store.is_full() && !self.cancelled {
            if self.dispatcher.is_cancelled() {
                self.cancelled = true;
                break;
            }

            let Some(id) = self.frontier.dequeue() else {
                tracing::info!("Frontier is empty, graph exhausted");
                break;
            };

            if !self.visited.mark_visited(&id) {
                continue;
            }

            tracing::debug!(
                "Expanding game {} ({}/{})",
                id,
                self.store.resolved_count(),
                self.store.capacity()
            );

            let recommendations = match self.dispatcher.recommendations(&id).await {
                Dispatch::Completed(ids) => ids,
                Dispatch::Cancelled => {
                    self.cancelled = true;
                    break;
                }
            };

            self.admit(recommendations).await;

            let expanded = self.visited.len();
            if expanded % 10 == 0 {
                tracing::info!(
                    "Progress: {} expanded, {} in frontier, {}/{} collected, {} pending details",
                    expanded,
                    self.frontier.len(),
                    self.store.resolved_count(),
                    self.store.capacity(),
                    self.batcher.len()
                );
            }
        }

        if self.store.is_full() {
            tracing::info!("Target of {} games reached", self.store.capacity());
        }
    }

    /// Registers newly recommended ids, flushing each batch as it fills up
    ///
    /// Admission stops as soon as the collection is full. Ids already known
    /// are ignored: first discovery wins.
    async fn admit(&mut self, recommendations: Vec<NodeId>) {
        for id in recommendations {
            if self.store.is_full() {
                tracing::debug!("Collection full, no longer admitting new games");
                break;
            }

            if !self.store.insert_pending(&id) {
                continue;
            }

            self.frontier.enqueue(&id, &self.visited);

            if self.batcher.add(&id) {
                self.flush_batch().await;
                if self.cancelled {
                    break;
                }
            }
        }
    }

    async fn flush_batch(&mut self) {
        match self
            .batcher
            .flush(&mut self.dispatcher, &mut self.store)
            .await
        {
            FlushOutcome::Completed(summary) => tracing::debug!(
                "Batch of {} enriched: {} stored, {} failed, {} truncated",
                summary.requested,
                summary.stored,
                summary.failed,
                summary.truncated
            ),
            FlushOutcome::Cancelled(_) => self.cancelled = true,
        }
    }
}

/// Runs a complete crawl against the configured remote service
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `cancel` - Token that stops the crawl early when triggered
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - The collected records and run statistics
/// * `Err(CrawlError)` - The HTTP client could not be built
///
/// # Example
///
/// ```no_run
/// use universe_crawler::config::Config;
/// use universe_crawler::crawler::run_crawl;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let outcome = run_crawl(&Config::default(), CancellationToken::new()).await?;
/// println!("Collected {} games", outcome.records.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: &Config,
    cancel: CancellationToken,
) -> Result<CrawlOutcome, CrawlError> {
    let client = HttpGraphClient::new(&config.remote)?;
    let coordinator = Coordinator::new(&config.crawler, Arc::new(client), cancel);
    Ok(coordinator.run().await)
}

//! Crawler module for recommendation-graph traversal
//!
//! This module contains the core crawling logic, including:
//! - The remote catalogue client and its HTTP implementation
//! - Request pacing and cancellable dispatch
//! - Batched enrichment of discovered games
//! - Overall crawl coordination

mod batcher;
mod client;
mod coordinator;
mod dispatch;
mod rate_limit;

pub use batcher::{
    EnrichmentBatcher, FlushOutcome, FlushSummary, IMAGE_URL_FIELD, UNIVERSE_ID_FIELD,
};
pub use client::{build_http_client, HttpGraphClient, RemoteError, RemoteGraphClient, RemoteResult};
pub use coordinator::{run_crawl, Coordinator, CrawlOutcome, CrawlPhase};
pub use dispatch::{CallStats, Dispatch, Dispatcher};
pub use rate_limit::RateLimiter;

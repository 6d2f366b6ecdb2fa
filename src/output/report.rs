//! Run statistics
//!
//! This module summarizes a finished crawl: how many nodes were discovered,
//! enriched, or lost, how many remote calls were spent, and a few aggregate
//! figures over the collected records.

use crate::crawler::CallStats;
use crate::state::NodeRecord;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Summary of a crawl run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Seed node the traversal started from
    pub seed_id: String,

    /// Configured collection size
    pub target_count: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration: Duration,

    /// Whether the run was interrupted before draining
    pub cancelled: bool,

    /// Distinct ids seen in any recommendation response (seed included)
    pub discovered: usize,

    /// Nodes whose recommendations were requested
    pub expanded: usize,

    /// Enriched records collected
    pub resolved: usize,

    /// Nodes whose enrichment failed or was cut off by the target
    pub failed: usize,

    /// Nodes still waiting for enrichment when the run ended
    pub pending: usize,

    /// Remote calls issued
    pub calls: CallStats,

    /// Mean `visits` over records that carry it
    pub average_visits: Option<u64>,
}

impl CrawlReport {
    /// Returns whether the run collected nothing
    pub fn is_empty(&self) -> bool {
        self.resolved == 0
    }

    /// Returns whether the target size was reached
    pub fn reached_target(&self) -> bool {
        self.resolved >= self.target_count
    }
}

/// Computes the mean `visits` attribute over records that have one
pub fn average_visits(records: &[NodeRecord]) -> Option<u64> {
    let visits: Vec<u64> = records
        .iter()
        .filter_map(|record| record.get("visits").and_then(|v| v.as_u64()))
        .collect();

    if visits.is_empty() {
        return None;
    }

    let total: u128 = visits.iter().map(|v| *v as u128).sum();
    let mean = (total as f64 / visits.len() as f64).round();
    Some(mean as u64)
}

/// Prints a report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    println!("Run:");
    println!("  Seed: {}", report.seed_id);
    println!("  Started: {}", report.started_at.to_rfc3339());
    println!("  Finished: {}", report.finished_at.to_rfc3339());
    println!("  Duration: {:.2}s", report.duration.as_secs_f64());
    if report.cancelled {
        println!("  Status: cancelled");
    } else if report.reached_target() {
        println!("  Status: target reached");
    } else {
        println!("  Status: graph exhausted");
    }
    println!();

    println!("Nodes:");
    println!(
        "  Collected: {} / {}",
        report.resolved, report.target_count
    );
    println!("  Discovered: {}", report.discovered);
    println!("  Expanded: {}", report.expanded);
    println!("  Failed: {}", report.failed);
    println!("  Pending: {}", report.pending);
    println!();

    println!("Remote calls:");
    println!("  Recommendations: {}", report.calls.recommendation_calls);
    println!("  Detail batches: {}", report.calls.detail_calls);
    println!("  Thumbnail batches: {}", report.calls.thumbnail_calls);
    println!("  Failed: {}", report.calls.failed_calls);

    if let Some(average) = report.average_visits {
        println!();
        println!("Average visits per game: {}", average);
    }
}

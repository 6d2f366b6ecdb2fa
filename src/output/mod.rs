//! Output module for crawl results
//!
//! This module handles:
//! - Writing the collected records as a JSON array
//! - Merging records into an existing corpus file
//! - Summarizing a run and printing its statistics

mod json;
pub mod report;

pub use json::{merge_into_corpus, read_records, write_records, MergeSummary};
pub use report::{average_visits, print_report, CrawlReport};

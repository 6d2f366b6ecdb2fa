//! Universe-Crawler: a bounded breadth-first crawler for game recommendation graphs
//!
//! This crate walks the recommendation graph exposed by a remote game catalogue,
//! enriching every discovered game with batched detail and thumbnail lookups,
//! and stops once a target number of enriched records has been collected.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;

use thiserror::Error;

/// Main error type for Universe-Crawler operations
///
/// Only local failures live here. Remote failures are absorbed by the
/// client layer and never abort a crawl.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write output to {path}: {source}")]
    Output {
        path: String,
        source: std::io::Error,
    },

    #[error("Corpus file {path} is not a JSON array of objects")]
    InvalidCorpus { path: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Universe-Crawler operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Coordinator, CrawlOutcome};
pub use state::{NodeId, NodeRecord, NodeState};

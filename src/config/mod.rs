//! Configuration module for Universe-Crawler
//!
//! This module handles loading, parsing, and validating TOML configuration files
//! and merging them with command-line overrides.
//!
//! # Example
//!
//! ```no_run
//! use universe_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Crawler will collect up to {} games", config.crawler.target_count);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, ConfigOverrides, CrawlerConfig, OutputConfig, RemoteConfig};
pub use validation::MAX_BATCH_SIZE;

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, resolve_config};

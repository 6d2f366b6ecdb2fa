//! Universe-Crawler main entry point
//!
//! This is the command-line interface for the Universe-Crawler game catalogue crawler.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use universe_crawler::config::{resolve_config, Config, ConfigOverrides};
use universe_crawler::crawler::run_crawl;
use universe_crawler::output::{merge_into_corpus, print_report, write_records};

/// Universe-Crawler: a bounded crawler for game recommendation graphs
///
/// Universe-Crawler starts from a seed game, follows recommendations breadth
/// first, and enriches every discovered game with its details and thumbnail
/// until the target number of games has been collected.
#[derive(Parser, Debug)]
#[command(name = "universe-crawler")]
#[command(version = "1.0.0")]
#[command(about = "A bounded game recommendation crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Game id the crawl starts from
    #[arg(long, value_name = "ID")]
    seed: Option<String>,

    /// Number of games to collect
    #[arg(long, value_name = "COUNT")]
    target: Option<usize>,

    /// Minimum delay between remote calls, in milliseconds
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// Number of games per detail lookup
    #[arg(long, value_name = "SIZE")]
    batch_size: Option<usize>,

    /// Path of the JSON output file
    #[arg(long, value_name = "PATH")]
    output: Option<String>,

    /// Also merge the collected games into an existing corpus file
    #[arg(long, value_name = "PATH")]
    merge_into: Option<PathBuf>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            seed_id: self.seed.clone(),
            target_count: self.target,
            request_delay_ms: self.delay_ms,
            batch_size: self.batch_size,
            output_path: self.output.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    match &cli.config {
        Some(path) => tracing::info!("Loading configuration from: {}", path.display()),
        None => tracing::info!("No configuration file given, using defaults"),
    }

    let (config, config_hash) = match resolve_config(cli.config.as_deref(), &cli.overrides()) {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Some(hash) = config_hash {
        tracing::info!("Configuration loaded successfully (hash: {})", hash);
    }

    if cli.dry_run {
        handle_dry_run(&config, cli.merge_into.as_deref());
        return Ok(());
    }

    handle_crawl(config, cli.merge_into.as_deref()).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("universe_crawler=info,warn"),
            1 => EnvFilter::new("universe_crawler=debug,info"),
            2 => EnvFilter::new("universe_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config, merge_into: Option<&Path>) {
    println!("=== Universe-Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Seed game: {}", config.crawler.seed_id);
    println!("  Target count: {}", config.crawler.target_count);
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);
    println!("  Batch size: {}", config.crawler.batch_size);

    println!("\nRemote Service:");
    println!("  Games: {}", config.remote.games_base_url);
    println!("  Thumbnails: {}", config.remote.thumbnails_base_url);
    println!("  Thumbnail size: {}", config.remote.thumbnail_size);
    println!("  Timeout: {}s", config.remote.timeout_secs);
    println!("  User agent: {}", config.remote.user_agent);

    println!("\nOutput:");
    println!("  File: {}", config.output.path);
    if let Some(corpus) = merge_into {
        println!("  Merge into: {}", corpus.display());
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would collect up to {} games starting from {}",
        config.crawler.target_count, config.crawler.seed_id
    );
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, merge_into: Option<&Path>) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();

    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping crawl");
            interrupt.cancel();
        }
    });

    let outcome = match run_crawl(&config, cancel).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    let output_path = Path::new(&config.output.path);
    write_records(output_path, &outcome.records)
        .with_context(|| format!("writing {}", output_path.display()))?;
    tracing::info!(
        "Saved {} games to {}",
        outcome.records.len(),
        output_path.display()
    );

    if let Some(corpus) = merge_into {
        let summary = merge_into_corpus(corpus, &outcome.records)
            .with_context(|| format!("merging into {}", corpus.display()))?;
        tracing::info!(
            "Merged into {}: {} updated, {} added, {} duplicates collapsed, {} total",
            corpus.display(),
            summary.updated,
            summary.added,
            summary.collapsed,
            summary.total
        );
    }

    print_report(&outcome.report);

    Ok(())
}

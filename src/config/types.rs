use serde::Deserialize;

/// Main configuration structure for Universe-Crawler
///
/// Every section is optional in the TOML file; missing keys fall back to
/// the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Traversal behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrawlerConfig {
    /// Node id the breadth-first traversal starts from
    pub seed_id: String,

    /// Number of enriched records after which the crawl stops
    pub target_count: usize,

    /// Minimum time between two remote calls (milliseconds)
    pub request_delay_ms: u64,

    /// Number of ids per detail/thumbnail lookup
    pub batch_size: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed_id: "7018190066".to_string(),
            target_count: 10_000,
            request_delay_ms: 100,
            batch_size: 32,
        }
    }
}

/// Remote catalogue service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RemoteConfig {
    /// Base URL serving recommendations and game details
    pub games_base_url: String,

    /// Base URL serving game thumbnails
    pub thumbnails_base_url: String,

    /// Requested thumbnail size, `WIDTHxHEIGHT`
    pub thumbnail_size: String,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Per-request timeout (seconds)
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            games_base_url: "https://games.roblox.com".to_string(),
            thumbnails_base_url: "https://thumbnails.roblox.com".to_string(),
            thumbnail_size: "768x432".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36"
                .to_string(),
            timeout_secs: 30,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct OutputConfig {
    /// Path of the JSON array written at the end of the crawl
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "./data/roblox_games.json".to_string(),
        }
    }
}

/// Command-line values that take precedence over the configuration file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub seed_id: Option<String>,
    pub target_count: Option<usize>,
    pub request_delay_ms: Option<u64>,
    pub batch_size: Option<usize>,
    pub output_path: Option<String>,
}

impl Config {
    /// Applies command-line overrides on top of the loaded values
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(seed) = &overrides.seed_id {
            self.crawler.seed_id = seed.clone();
        }
        if let Some(target) = overrides.target_count {
            self.crawler.target_count = target;
        }
        if let Some(delay) = overrides.request_delay_ms {
            self.crawler.request_delay_ms = delay;
        }
        if let Some(batch) = overrides.batch_size {
            self.crawler.batch_size = batch;
        }
        if let Some(path) = &overrides.output_path {
            self.output.path = path.clone();
        }
    }
}

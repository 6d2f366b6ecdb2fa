use crate::config::types::{Config, CrawlerConfig, OutputConfig, RemoteConfig};
use crate::ConfigError;
use url::Url;

/// Largest batch the remote detail endpoint accepts
pub const MAX_BATCH_SIZE: usize = 100;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_remote_config(&config.remote)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates traversal configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let seed = config.seed_id.trim();
    if seed.is_empty() {
        return Err(ConfigError::Validation(
            "seed_id cannot be empty".to_string(),
        ));
    }

    if seed.contains(',') || seed.contains('/') || seed.chars().any(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "seed_id must not contain separators or whitespace, got '{}'",
            config.seed_id
        )));
    }

    if config.target_count < 1 {
        return Err(ConfigError::Validation(format!(
            "target_count must be >= 1, got {}",
            config.target_count
        )));
    }

    if config.batch_size < 1 || config.batch_size > MAX_BATCH_SIZE {
        return Err(ConfigError::Validation(format!(
            "batch_size must be between 1 and {}, got {}",
            MAX_BATCH_SIZE, config.batch_size
        )));
    }

    Ok(())
}

/// Validates remote service configuration
fn validate_remote_config(config: &RemoteConfig) -> Result<(), ConfigError> {
    validate_base_url("games_base_url", &config.games_base_url)?;
    validate_base_url("thumbnails_base_url", &config.thumbnails_base_url)?;
    validate_thumbnail_size(&config.thumbnail_size)?;

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_base_url(name: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", name, value, e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            name, value
        )));
    }

    if url.query().is_some() {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must not carry a query string",
            name, value
        )));
    }

    Ok(())
}

/// Thumbnail sizes look like `768x432`
fn validate_thumbnail_size(size: &str) -> Result<(), ConfigError> {
    let valid = match size.split_once('x') {
        Some((w, h)) => {
            !w.is_empty()
                && !h.is_empty()
                && w.chars().all(|c| c.is_ascii_digit())
                && h.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    };

    if !valid {
        return Err(ConfigError::Validation(format!(
            "thumbnail_size must look like WIDTHxHEIGHT, got '{}'",
            size
        )));
    }

    Ok(())
}

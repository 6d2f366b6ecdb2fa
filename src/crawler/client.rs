//! Remote catalogue client
//!
//! This module is the I/O boundary of the crawler. It knows how to:
//! - Build an HTTP client with the configured user agent and timeouts
//! - Fetch the recommendations of one game
//! - Fetch details for a batch of games
//! - Fetch thumbnail URLs for a batch of games
//!
//! It holds no traversal state. Every operation returns a `RemoteResult`;
//! the caller decides how a failure degrades the crawl.

use crate::config::RemoteConfig;
use crate::state::{NodeId, NodeRecord};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a single remote call
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: StatusCode },

    #[error("Malformed JSON from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    /// Failure reported by a [`RemoteGraphClient`] that is not backed by HTTP
    #[error("{0}")]
    Other(String),
}

/// Result type for remote operations
pub type RemoteResult<T> = Result<T, RemoteError>;

/// The three lookups the crawler needs from the recommendation service
///
/// Implementations must be shareable across tasks. Ids that the service
/// does not return are simply absent from the batch results.
#[async_trait]
pub trait RemoteGraphClient: Send + Sync {
    /// Fetches the ids recommended from one game
    async fn fetch_recommendations(&self, id: &str) -> RemoteResult<Vec<NodeId>>;

    /// Fetches detail records for a batch of games in one call
    async fn fetch_details_batch(
        &self,
        ids: &[NodeId],
    ) -> RemoteResult<HashMap<NodeId, NodeRecord>>;

    /// Fetches thumbnail URLs for a batch of games in one call
    async fn fetch_thumbnails_batch(&self, ids: &[NodeId]) -> RemoteResult<HashMap<NodeId, String>>;
}

/// Universe ids arrive as JSON numbers, but some endpoints quote them
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
enum WireId {
    Number(u64),
    Text(String),
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Reads one entry's id, ignoring values that are not a usable id
///
/// Entries are decoded one at a time so an odd id only drops its own entry.
fn parse_wire_id(value: Option<Value>) -> Option<WireId> {
    serde_json::from_value::<WireId>(value?).ok()
}

#[derive(Debug, Deserialize)]
struct RecommendationsResponse {
    #[serde(default)]
    games: Vec<RecommendedGame>,
}

#[derive(Debug, Deserialize)]
struct RecommendedGame {
    #[serde(rename = "universeId")]
    universe_id: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    #[serde(default)]
    data: Vec<NodeRecord>,
}

#[derive(Debug, Deserialize)]
struct ThumbnailsResponse {
    #[serde(default)]
    data: Vec<ThumbnailEntry>,
}

#[derive(Debug, Deserialize)]
struct ThumbnailEntry {
    #[serde(rename = "universeId")]
    universe_id: Option<Value>,
    #[serde(default)]
    thumbnails: Vec<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    #[serde(rename = "imageUrl")]
    image_url: Option<String>,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The remote service configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &RemoteConfig) -> Result<Client, reqwest::Error> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/json"),
    );

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// HTTP implementation of [`RemoteGraphClient`]
#[derive(Debug, Clone)]
pub struct HttpGraphClient {
    client: Client,
    games_base: String,
    thumbnails_base: String,
    thumbnail_size: String,
}

impl HttpGraphClient {
    /// Creates a client for the service described by `config`
    pub fn new(config: &RemoteConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config)?;
        Ok(Self::with_client(client, config))
    }

    /// Creates a client around an existing `reqwest::Client`
    pub fn with_client(client: Client, config: &RemoteConfig) -> Self {
        Self {
            client,
            games_base: config.games_base_url.trim_end_matches('/').to_string(),
            thumbnails_base: config.thumbnails_base_url.trim_end_matches('/').to_string(),
            thumbnail_size: config.thumbnail_size.clone(),
        }
    }

    /// Sends a GET and decodes a JSON body
    ///
    /// Non-2xx statuses and undecodable bodies are errors.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> RemoteResult<T> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| classify_transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_transport_error(url, e))?;

        serde_json::from_slice(&body).map_err(|source| RemoteError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

fn classify_transport_error(url: &str, error: reqwest::Error) -> RemoteError {
    if error.is_timeout() {
        RemoteError::Timeout {
            url: url.to_string(),
        }
    } else {
        RemoteError::Transport {
            url: url.to_string(),
            source: error,
        }
    }
}

#[async_trait]
impl RemoteGraphClient for HttpGraphClient {
    async fn fetch_recommendations(&self, id: &str) -> RemoteResult<Vec<NodeId>> {
        let url = format!("{}/v1/games/recommendations/game/{}", self.games_base, id);
        let response: RecommendationsResponse = self.get_json(&url, &[]).await?;

        let ids = response
            .games
            .into_iter()
            .filter_map(|game| {
                let id = parse_wire_id(game.universe_id);
                if id.is_none() {
                    tracing::debug!("Skipping recommendation without a usable id");
                }
                id
            })
            .map(|wire| wire.to_string())
            .collect();

        Ok(ids)
    }

    async fn fetch_details_batch(
        &self,
        ids: &[NodeId],
    ) -> RemoteResult<HashMap<NodeId, NodeRecord>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let url = format!("{}/v1/games", self.games_base);
        let joined = ids.join(",");
        let response: DetailsResponse = self
            .get_json(&url, &[("universeIds", joined.as_str())])
            .await?;

        let mut results = HashMap::with_capacity(response.data.len());
        for record in response.data {
            let id = parse_wire_id(record.get("id").cloned());

            match id {
                Some(id) => {
                    results.insert(id.to_string(), record);
                }
                None => tracing::debug!("Skipping detail entry without an id"),
            }
        }

        Ok(results)
    }

    async fn fetch_thumbnails_batch(&self, ids: &[NodeId]) -> RemoteResult<HashMap<NodeId, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let url = format!("{}/v1/games/multiget/thumbnails", self.thumbnails_base);
        let joined = ids.join(",");
        let response: ThumbnailsResponse = self
            .get_json(
                &url,
                &[
                    ("universeIds", joined.as_str()),
                    ("format", "png"),
                    ("size", self.thumbnail_size.as_str()),
                ],
            )
            .await?;

        let results = response
            .data
            .into_iter()
            .filter_map(|entry| {
                let id = parse_wire_id(entry.universe_id)?;
                let image_url = entry.thumbnails.into_iter().next()?.image_url?;
                Some((id.to_string(), image_url))
            })
            .collect();

        Ok(results)
    }
}

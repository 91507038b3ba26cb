//! GBFS feed HTTP client.
//!
//! One client per feed URL. Each `fetch` is a fresh GET of the feed's
//! current snapshot: no retry, no caching.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use super::error::FetchError;
use super::types::FeedKind;

/// HELLO CYCLING station information, published through ODPT.
pub const DEFAULT_INFORMATION_URL: &str =
    "https://api-public.odpt.org/api/v4/gbfs/hellocycling/station_information.json";

/// HELLO CYCLING station status, published through ODPT.
pub const DEFAULT_STATUS_URL: &str =
    "https://api-public.odpt.org/api/v4/gbfs/hellocycling/station_status.json";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Something that can produce the raw body of one feed.
///
/// This abstraction allows the sync pipeline to be tested with mock data.
pub trait FeedSource: Send + Sync {
    /// Which feed this source serves.
    fn kind(&self) -> FeedKind;

    /// Retrieve the feed's current snapshot.
    fn fetch(&self) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

/// Configuration for a feed client.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Which feed the URL points at
    pub kind: FeedKind,
    /// Absolute URL of the feed document
    pub url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl FeedConfig {
    /// Create a config for the given feed and URL.
    pub fn new(kind: FeedKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// The default station information feed.
    pub fn information() -> Self {
        Self::new(FeedKind::Information, DEFAULT_INFORMATION_URL)
    }

    /// The default station status feed.
    pub fn status() -> Self {
        Self::new(FeedKind::Status, DEFAULT_STATUS_URL)
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP client for a single GBFS feed.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    kind: FeedKind,
    url: String,
}

impl FeedClient {
    /// Create a new feed client.
    pub fn new(config: FeedConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("station-map/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::InvalidConfig {
                kind: config.kind,
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            kind: config.kind,
            url: config.url,
        })
    }

    /// The feed URL this client fetches.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn transport(&self, err: reqwest::Error) -> FetchError {
        FetchError::Transport {
            kind: self.kind,
            message: err.to_string(),
        }
    }
}

impl FeedSource for FeedClient {
    fn kind(&self) -> FeedKind {
        self.kind
    }

    async fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        debug!(feed = %self.kind, url = %self.url, "fetching feed");

        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.transport(e))?;

        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                kind: self.kind,
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.transport(e))?;

        debug!(feed = %self.kind, bytes = body.len(), "fetched feed");

        Ok(body.to_vec())
    }
}

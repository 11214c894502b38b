//! Feed sources.
//!
//! [`FeedSource`] uses enum dispatch over the concrete sources so that the
//! async `fetch` method needs no trait objects. The HTTP source is the
//! normal production path; the file source serves a saved copy of the
//! feed for offline runs.

use std::path::PathBuf;
use std::time::Duration;

use iss_types::Dataset;

use crate::error::FeedError;
use crate::oem::parse_oem;

/// NASA's public ISS ephemeris (J2000 frame, XML).
pub const DEFAULT_FEED_URL: &str =
    "https://nasa-public-data.s3.amazonaws.com/iss-coords/current/ISS_OEM/ISS.OEM_J2K_EPH.xml";

/// Where the trajectory feed is read from.
#[derive(Debug, Clone)]
pub enum FeedSource {
    /// Fetch over HTTP(S).
    Http(HttpFeed),
    /// Read from a local file.
    File(FileFeed),
}

impl FeedSource {
    /// Retrieve and parse the feed.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError`] if retrieval fails or the document cannot be
    /// parsed.
    pub async fn fetch(&self) -> Result<Dataset, FeedError> {
        match self {
            Self::Http(feed) => feed.fetch().await,
            Self::File(feed) => feed.fetch().await,
        }
    }

    /// Human-readable location for logging.
    pub fn describe(&self) -> String {
        match self {
            Self::Http(feed) => feed.url.clone(),
            Self::File(feed) => format!("file://{}", feed.path.display()),
        }
    }
}

/// Fetches the OEM document over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFeed {
    client: reqwest::Client,
    url: String,
}

impl HttpFeed {
    /// Create an HTTP feed for `url` with a whole-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Request`] if the HTTP client cannot be built.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("iss-tracker/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            url: url.to_owned(),
        })
    }

    /// The URL this feed fetches.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<Dataset, FeedError> {
        tracing::debug!(url = %self.url, "fetching ISS feed");

        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let body = response.text().await?;
        let dataset = parse_oem(&body)?;

        tracing::debug!(
            url = %self.url,
            bytes = body.len(),
            state_vectors = dataset.len(),
            "ISS feed parsed"
        );
        Ok(dataset)
    }
}

/// Reads the OEM document from a local file.
#[derive(Debug, Clone)]
pub struct FileFeed {
    path: PathBuf,
}

impl FileFeed {
    /// Create a file feed.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn fetch(&self) -> Result<Dataset, FeedError> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| FeedError::Io {
                path: self.path.display().to_string(),
                source,
            })?;
        parse_oem(&body)
    }
}

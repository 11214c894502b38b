//! Configuration loading and typed config structures for the ISS tracker.
//!
//! The configuration lives in `iss-config.yaml`. This module defines
//! strongly-typed structs that mirror the YAML structure; every field has
//! a default, so an empty file (or no file) yields a working setup that
//! fetches NASA's feed and caches it in a local Redis.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but is unusable.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level tracker configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TrackerConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerSettings,

    /// Upstream feed settings.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Epoch cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Reverse geocoding settings.
    #[serde(default)]
    pub geocoder: GeocoderConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TrackerConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment overrides are not applied; see
    /// [`apply_env_overrides`](Self::apply_env_overrides).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if the values are inconsistent.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from a YAML string, ignoring the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if the values are inconsistent.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml rejects an empty document; treat it as "all defaults".
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Override values with environment variables when set:
    /// - `REDIS_URL` overrides `cache.redis_url`
    /// - `ISS_FEED_URL` overrides `feed.url`
    /// - `ISS_PORT` overrides `server.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `ISS_PORT` is not a port number.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = lookup("REDIS_URL") {
            self.cache.redis_url = val;
        }
        if let Some(val) = lookup("ISS_FEED_URL") {
            self.feed.url = val;
        }
        if let Some(val) = lookup("ISS_PORT") {
            self.server.port = val
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("ISS_PORT={val:?}: {e}")))?;
        }
        Ok(())
    }

    /// Check cross-field consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feed.source == FeedKind::File && self.feed.path.is_none() {
            return Err(ConfigError::Invalid(String::from(
                "feed.source is `file` but feed.path is not set",
            )));
        }
        if self.feed.timeout_ms == 0 {
            return Err(ConfigError::Invalid(String::from(
                "feed.timeout_ms must be positive",
            )));
        }
        if self.geocoder.enabled && self.geocoder.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid(String::from(
                "geocoder.user_agent is required by the Nominatim usage policy",
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// server
// ---------------------------------------------------------------------------

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// feed
// ---------------------------------------------------------------------------

/// Where the feed is read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    /// Fetch `feed.url` over HTTP.
    #[default]
    Http,
    /// Read `feed.path` from disk.
    File,
}

/// Upstream feed settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedConfig {
    /// Source kind.
    #[serde(default)]
    pub source: FeedKind,

    /// Feed URL for the HTTP source.
    #[serde(default = "default_feed_url")]
    pub url: String,

    /// Feed file for the file source.
    #[serde(default)]
    pub path: Option<String>,

    /// Whole-request timeout for the HTTP source.
    #[serde(default = "default_feed_timeout_ms")]
    pub timeout_ms: u64,

    /// Re-fetch when the cached copy is older than this. `null` disables
    /// time-based refresh (the feed is then fetched only into an empty cache).
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: Option<u64>,

    /// Populate the cache at startup instead of on the first request.
    #[serde(default = "default_true")]
    pub prefetch_on_start: bool,
}

impl FeedConfig {
    /// HTTP timeout as a [`Duration`].
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Refresh interval as a [`Duration`], if time-based refresh is enabled.
    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh_interval_secs.map(Duration::from_secs)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            source: FeedKind::Http,
            url: default_feed_url(),
            path: None,
            timeout_ms: default_feed_timeout_ms(),
            refresh_interval_secs: default_refresh_interval_secs(),
            prefetch_on_start: true,
        }
    }
}

// ---------------------------------------------------------------------------
// cache
// ---------------------------------------------------------------------------

/// Cache backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Redis at `cache.redis_url`.
    #[default]
    Redis,
    /// Process memory.
    Memory,
}

/// Epoch cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// Backend selection.
    #[serde(default)]
    pub backend: CacheBackend,

    /// Redis URL (`redis://host:port/db`).
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Prefix for every Redis key.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Redis,
            redis_url: default_redis_url(),
            key_prefix: default_key_prefix(),
        }
    }
}

// ---------------------------------------------------------------------------
// geocoder
// ---------------------------------------------------------------------------

/// Reverse geocoding settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeocoderConfig {
    /// Whether to look up place names at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Nominatim base URL.
    #[serde(default = "default_nominatim_url")]
    pub base_url: String,

    /// User-Agent sent to Nominatim.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout.
    #[serde(default = "default_geocoder_timeout_ms")]
    pub timeout_ms: u64,
}

impl GeocoderConfig {
    /// Request timeout as a [`Duration`].
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_nominatim_url(),
            user_agent: default_user_agent(),
            timeout_ms: default_geocoder_timeout_ms(),
        }
    }
}

// ---------------------------------------------------------------------------
// logging
// ---------------------------------------------------------------------------

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive (overridden by `RUST_LOG`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Pretty,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    5000
}

fn default_feed_url() -> String {
    String::from(iss_feed::DEFAULT_FEED_URL)
}

const fn default_feed_timeout_ms() -> u64 {
    30_000
}

#[allow(clippy::unnecessary_wraps)]
const fn default_refresh_interval_secs() -> Option<u64> {
    Some(3600)
}

const fn default_true() -> bool {
    true
}

fn default_redis_url() -> String {
    String::from("redis://127.0.0.1:6379/7")
}

fn default_key_prefix() -> String {
    String::from("iss")
}

fn default_nominatim_url() -> String {
    String::from("https://nominatim.openstreetmap.org")
}

fn default_user_agent() -> String {
    String::from("iss_tracker")
}

const fn default_geocoder_timeout_ms() -> u64 {
    5_000
}

fn default_log_level() -> String {
    String::from("info")
}

//! ISS tracker binary.
//!
//! Loads configuration, initializes logging, connects the epoch cache,
//! and serves the tracker API until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `ISS_CONFIG` or `iss-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the tracker (feed source, cache, geocoder)
//! 4. Prefetch the feed if configured
//! 5. Serve the API

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use iss_api::{AppState, ServerConfig};
use iss_core::config::{LogFormat, LoggingConfig};
use iss_core::{Tracker, TrackerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Config file read when `ISS_CONFIG` is not set.
const DEFAULT_CONFIG_PATH: &str = "iss-config.yaml";

/// Application entry point for the tracker.
///
/// # Errors
///
/// Returns an error if configuration, cache connection, or the server
/// fails.
#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Load configuration. Logging is not up yet, so the source is
    //    reported once it is.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!(config = %source, "iss-tracker starting");
    info!(
        host = config.server.host,
        port = config.server.port,
        feed = config.feed.url,
        cache_backend = ?config.cache.backend,
        geocoder_enabled = config.geocoder.enabled,
        "Configuration loaded"
    );

    // 3. Build the tracker.
    let tracker = Arc::new(Tracker::from_config(&config).await?);

    // 4. Prefetch. A failure here is not fatal: the first request retries.
    if config.feed.prefetch_on_start {
        match tracker.refresh().await {
            Ok(summary) => info!(
                added = summary.added,
                updated = summary.updated,
                removed = summary.removed,
                "Startup prefetch complete"
            ),
            Err(e) => tracing::warn!(error = %e, "Startup prefetch failed, will retry on demand"),
        }
    }

    // 5. Serve.
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    iss_api::start_server(&server_config, Arc::new(AppState::from_shared(tracker))).await?;

    info!("iss-tracker stopped");
    Ok(())
}

/// Load configuration and report where it came from.
///
/// `ISS_CONFIG` names a file that must exist. Otherwise
/// `iss-config.yaml` in the working directory is used if present, and
/// built-in defaults if not. Environment overrides apply in every case.
fn load_config() -> Result<(TrackerConfig, String), AppError> {
    let (mut config, source) = if let Ok(path) = std::env::var("ISS_CONFIG") {
        let path = PathBuf::from(path);
        (TrackerConfig::from_file(&path)?, path.display().to_string())
    } else {
        let path = PathBuf::from(DEFAULT_CONFIG_PATH);
        if path.exists() {
            (TrackerConfig::from_file(&path)?, path.display().to_string())
        } else {
            (TrackerConfig::default(), String::from("defaults"))
        }
    };
    config.apply_env_overrides()?;
    config.validate()?;
    Ok((config, source))
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

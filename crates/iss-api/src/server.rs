//! Tracker HTTP server lifecycle.
//!
//! [`start_server`] binds the configured host and port, serves the router,
//! and drains in-flight requests once `Ctrl-C` arrives.

use std::io;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::router::build_router;
use crate::state::AppState;

/// Listen address for the tracker server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host name or IP address (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 5000,
        }
    }
}

/// Serve the tracker API until `Ctrl-C`.
///
/// The host may be a name; it is resolved by the listener.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address cannot be resolved or
/// bound, and [`ServerError::Serve`] if accepting connections fails.
pub async fn start_server(config: &ServerConfig, state: Arc<AppState>) -> Result<(), ServerError> {
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|source| ServerError::Bind {
            host: config.host.clone(),
            port: config.port,
            source,
        })?;
    let local = listener.local_addr().map_err(ServerError::Serve)?;
    info!(addr = %local, "Tracker server listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    info!("Tracker server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // No handler: keep serving until the process is killed.
        tracing::error!(error = %e, "Failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Failures while starting or running the tracker server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The listen address could not be resolved or bound.
    #[error("cannot bind {host}:{port}: {source}")]
    Bind {
        /// Configured host.
        host: String,
        /// Configured port.
        port: u16,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The accept loop failed.
    #[error("serve failed: {0}")]
    Serve(#[source] io::Error),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use iss_core::{Geocoder, Tracker};

    use super::*;

    #[tokio::test]
    async fn occupied_port_is_a_bind_error() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = taken.local_addr().unwrap().port();
        let config = ServerConfig {
            host: String::from("127.0.0.1"),
            port,
        };
        let tracker = Tracker::new(
            iss_feed::FeedSource::File(iss_feed::FileFeed::new("/unused.xml")),
            iss_db::EpochCache::Memory(iss_db::MemoryCache::new()),
            Geocoder::Disabled,
            None,
        );

        let result = start_server(&config, Arc::new(AppState::new(tracker))).await;

        assert!(matches!(result, Err(ServerError::Bind { port: p, .. }) if p == port));
    }
}

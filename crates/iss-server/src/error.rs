//! Error types for the tracker binary.
//!
//! [`AppError`] is the top-level error type that wraps all possible
//! failure modes during startup and serving.

/// Top-level error for the tracker binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: iss_core::ConfigError,
    },

    /// Tracker construction failed (feed client, cache connection, geocoder).
    #[error("tracker error: {source}")]
    Tracker {
        /// The underlying tracker error.
        #[from]
        source: iss_core::TrackerError,
    },

    /// The HTTP server failed to bind or serve.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: iss_api::ServerError,
    },
}

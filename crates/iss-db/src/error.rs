//! Error types for the cache layer.
//!
//! All errors are propagated via [`CacheError`], which wraps the
//! underlying [`fred`] and [`serde_json`] errors.

/// Errors that can occur in the cache layer.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// A Redis operation failed.
    #[error("Redis error: {0}")]
    Redis(#[from] fred::error::Error),

    /// A serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored value is present but unreadable.
    #[error("Corrupt cache entry {key}: {message}")]
    Corrupt {
        /// The offending key.
        key: String,
        /// What was wrong with it.
        message: String,
    },

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

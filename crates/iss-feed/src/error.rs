//! Error types for feed retrieval and parsing.

use iss_types::EpochParseError;

/// Errors that can occur while fetching or parsing the trajectory feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The HTTP request could not be built, sent, or read.
    #[error("feed request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The upstream server answered with a non-success status.
    #[error("feed returned HTTP {status} for {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// The requested URL.
        url: String,
    },

    /// A local feed file could not be read.
    #[error("failed to read feed file {path}: {source}")]
    Io {
        /// Path of the file.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The document is not well-formed OEM XML.
    #[error("error parsing OEM XML: {0}")]
    Xml(#[from] quick_xml::DeError),

    /// A state vector component is not a number.
    #[error("state vector {epoch}: {field} is not a number: {value:?} ({source})")]
    InvalidNumber {
        /// Raw epoch text of the offending state vector.
        epoch: String,
        /// Element name of the component.
        field: &'static str,
        /// The rejected text.
        value: String,
        /// The underlying float parse error.
        source: core::num::ParseFloatError,
    },

    /// A state vector epoch is malformed.
    #[error(transparent)]
    InvalidEpoch(#[from] EpochParseError),

    /// The feed parsed but contains no state vectors.
    #[error("no state vectors found in feed")]
    Empty,
}

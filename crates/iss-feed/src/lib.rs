//! Upstream feed access for the ISS tracker.
//!
//! NASA publishes the ISS trajectory as a CCSDS Orbit Ephemeris Message
//! (OEM) in XML. This crate fetches that document and turns it into a
//! [`Dataset`](iss_types::Dataset).
//!
//! # Modules
//!
//! - [`oem`] -- OEM XML parsing
//! - [`source`] -- Where the XML comes from (HTTP or a local file)
//! - [`error`] -- Shared error type

pub mod error;
pub mod oem;
pub mod source;

// Re-export primary types for convenience.
pub use error::FeedError;
pub use oem::parse_oem;
pub use source::{DEFAULT_FEED_URL, FeedSource, FileFeed, HttpFeed};

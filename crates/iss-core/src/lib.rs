//! Core logic for the ISS tracker.
//!
//! The [`Tracker`] is the single entry point used by the HTTP layer. It
//! keeps the epoch cache populated from the feed and answers queries
//! against it:
//!
//! ```text
//! request
//!     |
//!     +-- ensure_loaded --> cache empty or stale? --> FeedSource::fetch
//!     |                                               EpochCache::store_dataset
//!     +-- lookup       --> page / exact epoch / nearest epoch
//!     |
//!     +-- derivations  --> speed, geodetic position, nearest place
//! ```
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration with environment overrides
//! - [`lookup`] -- Pagination and nearest-epoch search
//! - [`physics`] -- Speed and J2000 to geodetic conversion
//! - [`geocode`] -- Reverse geocoding via Nominatim
//! - [`tracker`] -- The tracker service

pub mod config;
pub mod geocode;
pub mod lookup;
pub mod physics;
pub mod tracker;

// Re-export primary types for convenience.
pub use config::{ConfigError, TrackerConfig};
pub use geocode::{GeocodeError, Geocoder, NominatimClient};
pub use lookup::{LookupError, Page, PageRequest};
pub use tracker::{Tracker, TrackerError};

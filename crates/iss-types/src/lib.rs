//! Shared type definitions for the ISS tracker.
//!
//! This crate is the single source of truth for the data model used across
//! the workspace: the feed parser produces these types, the cache stores
//! them as JSON, and the API serves them.
//!
//! # Modules
//!
//! - [`epoch`] -- OEM timestamps (`YYYY-DDDTHH:MM:SS.sssZ`)
//! - [`state_vector`] -- Position/velocity samples and 3-vectors
//! - [`feed`] -- Feed header, metadata, comments, and parsed datasets
//! - [`reports`] -- Derived payloads (speed, location, now)

pub mod epoch;
pub mod feed;
pub mod reports;
pub mod state_vector;

// Re-export all public types at crate root for convenience.
pub use epoch::{Epoch, EpochParseError, OEM_EPOCH_FORMAT};
pub use feed::{Dataset, FeedHeader, FeedInfo, FeedMetadata};
pub use reports::{GeodeticPosition, LocationReport, NowReport, SpeedReport};
pub use state_vector::{Measurement, StateVector, Vector3};

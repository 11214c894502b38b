//! Epoch cache for the ISS tracker.
//!
//! The cache holds the most recently fetched feed: every state vector
//! keyed by its canonical epoch string, the epoch order, the feed's
//! header/metadata/comments, and the time of the last successful store.
//!
//! # Backends
//!
//! ```text
//! EpochCache
//!     |
//!     +-- Redis  --> RedisCache  (shared, survives restarts)
//!     |
//!     +-- Memory --> MemoryCache (single process, tests and offline runs)
//! ```
//!
//! # Modules
//!
//! - [`cache`] -- Backend dispatch and the store summary
//! - [`redis`] -- Redis operations and key layout
//! - [`memory`] -- In-process implementation
//! - [`error`] -- Shared error types

pub mod cache;
pub mod error;
pub mod memory;
pub mod redis;

// Re-export primary types for convenience.
pub use cache::{EpochCache, StoreSummary};
pub use error::CacheError;
pub use memory::MemoryCache;
pub use redis::RedisCache;

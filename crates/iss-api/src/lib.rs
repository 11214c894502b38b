//! HTTP API for the ISS tracker.
//!
//! This crate provides an Axum HTTP server that exposes the cached ISS
//! trajectory:
//!
//! - **Epoch endpoints** (`/epochs`, `/epochs/{epoch}`) for paging through
//!   state vectors and exact lookups
//! - **Derived endpoints** (`/epochs/{epoch}/speed`,
//!   `/epochs/{epoch}/location`, `/now`) for speed, ground position, and
//!   the nearest named place
//! - **Feed endpoints** (`/header`, `/metadata`, `/comment`) for the OEM
//!   document's descriptive parts
//! - **HTML status page** (`GET /`) listing the routes
//!
//! # Architecture
//!
//! Handlers hold no data of their own. Each request goes through the
//! shared [`Tracker`](iss_core::Tracker), which fills the cache from the
//! feed on first use and whenever the cached copy is stale.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;

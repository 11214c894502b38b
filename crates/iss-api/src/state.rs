//! Shared application state for the tracker API.

use std::sync::Arc;
use std::time::Instant;

use iss_core::Tracker;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// The tracker every handler queries.
    pub tracker: Arc<Tracker>,
    /// When the server state was created, for the status page.
    pub started_at: Instant,
}

impl AppState {
    /// Wrap a tracker for serving.
    pub fn new(tracker: Tracker) -> Self {
        Self::from_shared(Arc::new(tracker))
    }

    /// Serve a tracker that is also held elsewhere.
    pub fn from_shared(tracker: Arc<Tracker>) -> Self {
        Self {
            tracker,
            started_at: Instant::now(),
        }
    }
}

//! Axum router construction for the tracker API.
//!
//! Assembles all routes into a single [`Router`] with CORS middleware
//! enabled for cross-origin access from browser maps and dashboards.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router for the tracker.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /epochs` -- paged state vectors
/// - `GET /epochs/{epoch}` -- single state vector
/// - `GET /epochs/{epoch}/speed` -- instantaneous speed
/// - `GET /epochs/{epoch}/location` -- ground position and nearest place
/// - `GET /now` -- sample closest to the current time
/// - `GET /header`, `/metadata`, `/comment` -- feed descriptors
///
/// Anything else gets a JSON 404. The API is read-only and public, so
/// CORS allows any origin.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // Epochs
        .route("/epochs", get(handlers::list_epochs))
        .route("/epochs/{epoch}", get(handlers::get_epoch))
        .route("/epochs/{epoch}/speed", get(handlers::get_speed))
        .route("/epochs/{epoch}/location", get(handlers::get_location))
        .route("/now", get(handlers::get_now))
        // Feed info
        .route("/header", get(handlers::get_header))
        .route("/metadata", get(handlers::get_metadata))
        .route("/comment", get(handlers::get_comments))
        .fallback(handlers::not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

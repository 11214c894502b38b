//! REST API endpoint handlers for the tracker.
//!
//! All handlers go through the shared [`Tracker`](iss_core::Tracker) in
//! [`AppState`], so the first request after startup (or after the cached
//! copy goes stale) may wait on a feed fetch.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/epochs` | Page through state vectors (`?limit=&offset=`) |
//! | `GET` | `/epochs/{epoch}` | One state vector |
//! | `GET` | `/epochs/{epoch}/speed` | Instantaneous speed |
//! | `GET` | `/epochs/{epoch}/location` | Ground position and nearest place |
//! | `GET` | `/now` | Everything about the sample closest to now |
//! | `GET` | `/header` | OEM header |
//! | `GET` | `/metadata` | OEM segment metadata |
//! | `GET` | `/comment` | OEM comments |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::Uri;
use axum::response::{Html, IntoResponse};
use iss_core::PageRequest;
use iss_types::{
    Epoch, FeedHeader, FeedMetadata, LocationReport, NowReport, SpeedReport, StateVector,
};

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for the `GET /epochs` endpoint.
///
/// Kept as strings so a malformed value produces the API's own error
/// body instead of the extractor's plain-text rejection.
#[derive(Debug, serde::Deserialize)]
pub struct EpochsQuery {
    /// Maximum number of state vectors to return.
    pub limit: Option<String>,
    /// Number of state vectors to skip.
    pub offset: Option<String>,
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing cache status and the routes.
///
/// Reads the cache directly so that loading the page never triggers a
/// feed fetch.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let cache = state.tracker.cache();
    let epoch_count = cache
        .epoch_count()
        .await
        .map_or_else(|_| String::from("unavailable"), |n| n.to_string());
    let fetched_at = match cache.fetched_at().await {
        Ok(Some(at)) => at.to_rfc3339(),
        Ok(None) => String::from("never"),
        Err(_) => String::from("unavailable"),
    };
    let backend = cache.name();
    let uptime = state.started_at.elapsed().as_secs();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>ISS Tracker</title>
    <style>
        body {{ font-family: monospace; max-width: 720px; margin: 2rem auto; }}
        th {{ text-align: left; padding-right: 2rem; }}
    </style>
</head>
<body>
    <h1>ISS Tracker</h1>
    <table>
        <tr><th>Cached epochs</th><td>{epoch_count}</td></tr>
        <tr><th>Last fetch</th><td>{fetched_at}</td></tr>
        <tr><th>Cache</th><td>{backend}</td></tr>
        <tr><th>Uptime (s)</th><td>{uptime}</td></tr>
    </table>
    <h2>Routes</h2>
    <pre>
GET <a href="/epochs">/epochs</a>?limit=N&amp;offset=M
GET /epochs/{{epoch}}
GET /epochs/{{epoch}}/speed
GET /epochs/{{epoch}}/location
GET <a href="/now">/now</a>
GET <a href="/header">/header</a>
GET <a href="/metadata">/metadata</a>
GET <a href="/comment">/comment</a>
    </pre>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// Epochs
// ---------------------------------------------------------------------------

/// Page through the cached state vectors in feed order.
///
/// # Query Parameters
///
/// - `limit`: Maximum number to return (default: all remaining).
/// - `offset`: Number to skip (default 0). Must be below the epoch count.
pub async fn list_epochs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EpochsQuery>,
) -> Result<Json<Vec<StateVector>>, ApiError> {
    let request = PageRequest::parse(params.limit.as_deref(), params.offset.as_deref())?;
    let vectors = state.tracker.list(&request).await?;
    Ok(Json(vectors))
}

/// Return the state vector at an exact epoch.
pub async fn get_epoch(
    State(state): State<Arc<AppState>>,
    Path(epoch): Path<String>,
) -> Result<Json<StateVector>, ApiError> {
    let epoch = Epoch::parse(&epoch)?;
    Ok(Json(state.tracker.epoch(epoch).await?))
}

/// Return the instantaneous speed at an exact epoch.
pub async fn get_speed(
    State(state): State<Arc<AppState>>,
    Path(epoch): Path<String>,
) -> Result<Json<SpeedReport>, ApiError> {
    let epoch = Epoch::parse(&epoch)?;
    Ok(Json(state.tracker.speed(epoch).await?))
}

/// Return the ground position and nearest named place at an exact epoch.
pub async fn get_location(
    State(state): State<Arc<AppState>>,
    Path(epoch): Path<String>,
) -> Result<Json<LocationReport>, ApiError> {
    let epoch = Epoch::parse(&epoch)?;
    Ok(Json(state.tracker.location(epoch).await?))
}

/// Return everything about the sample closest to the current time.
pub async fn get_now(State(state): State<Arc<AppState>>) -> Result<Json<NowReport>, ApiError> {
    Ok(Json(state.tracker.now().await?))
}

// ---------------------------------------------------------------------------
// Feed info
// ---------------------------------------------------------------------------

/// Return the OEM header.
pub async fn get_header(State(state): State<Arc<AppState>>) -> Result<Json<FeedHeader>, ApiError> {
    Ok(Json(state.tracker.feed_info().await?.header))
}

/// Return the OEM segment metadata.
pub async fn get_metadata(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FeedMetadata>, ApiError> {
    Ok(Json(state.tracker.feed_info().await?.metadata))
}

/// Return the OEM comments, empty lines dropped.
pub async fn get_comments(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.tracker.feed_info().await?.comments))
}

// ---------------------------------------------------------------------------
// Fallback
// ---------------------------------------------------------------------------

/// JSON 404 for unknown routes.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("no route for {}", uri.path()))
}

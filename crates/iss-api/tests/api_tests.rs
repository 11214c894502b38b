//! Integration tests for the tracker API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. The tracker reads the sample OEM file from disk
//! into an in-memory cache with geocoding disabled, so no network is
//! needed.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use iss_api::router::build_router;
use iss_api::state::AppState;
use iss_core::geocode::NO_PLACE_MESSAGE;
use iss_core::{Geocoder, Tracker};
use iss_db::{EpochCache, MemoryCache};
use iss_feed::{FeedSource, FileFeed};
use serde_json::Value;
use tower::ServiceExt;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("iss-feed")
        .join("tests")
        .join("fixtures")
        .join("iss_sample.xml")
}

fn make_test_state_with_feed(feed: FeedSource) -> Arc<AppState> {
    let tracker = Tracker::new(
        feed,
        EpochCache::Memory(MemoryCache::new()),
        Geocoder::Disabled,
        None,
    );
    Arc::new(AppState::new(tracker))
}

fn make_test_state() -> Arc<AppState> {
    make_test_state_with_feed(FeedSource::File(FileFeed::new(fixture_path())))
}

async fn get(state: Arc<AppState>, uri: &str) -> Response {
    build_router(state)
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn assert_error(response: Response, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], status.as_u16());
    assert!(json["error"].is_string());
    json
}

// =========================================================================
// Status page
// =========================================================================

#[tokio::test]
async fn test_index_returns_html() {
    let response = get(make_test_state(), "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.contains("text/html"));
}

#[tokio::test]
async fn test_index_does_not_fetch_feed() {
    let state = make_test_state();
    get(Arc::clone(&state), "/").await;
    assert_eq!(state.tracker.cache().epoch_count().await.unwrap(), 0);
}

// =========================================================================
// Epochs
// =========================================================================

#[tokio::test]
async fn test_list_epochs() {
    let response = get(make_test_state(), "/epochs").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    let epochs = json.as_array().unwrap();
    assert_eq!(epochs.len(), 6);
    assert_eq!(epochs[0]["EPOCH"], "2025-063T12:00:00.000Z");
    assert_eq!(epochs[0]["X"]["units"], "km");
    assert_eq!(epochs[5]["EPOCH"], "2025-063T12:20:00.000Z");
}

#[tokio::test]
async fn test_list_epochs_with_limit_and_offset() {
    let response = get(make_test_state(), "/epochs?limit=2&offset=3").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    let epochs = json.as_array().unwrap();
    assert_eq!(epochs.len(), 2);
    assert_eq!(epochs[0]["EPOCH"], "2025-063T12:12:00.000Z");
    assert_eq!(epochs[1]["EPOCH"], "2025-063T12:16:00.000Z");
}

#[tokio::test]
async fn test_list_epochs_limit_zero_is_empty() {
    let response = get(make_test_state(), "/epochs?limit=0").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert!(json.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_epochs_rejects_bad_limit() {
    let response = get(make_test_state(), "/epochs?limit=abc").await;
    let json = assert_error(response, StatusCode::BAD_REQUEST).await;
    assert!(json["error"].as_str().unwrap().contains("limit"));
}

#[tokio::test]
async fn test_list_epochs_rejects_negative_offset() {
    let response = get(make_test_state(), "/epochs?offset=-1").await;
    assert_error(response, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn test_list_epochs_rejects_offset_out_of_range() {
    let response = get(make_test_state(), "/epochs?offset=6").await;
    let json = assert_error(response, StatusCode::BAD_REQUEST).await;
    assert!(json["error"].as_str().unwrap().contains("out of range"));
}

#[tokio::test]
async fn test_get_epoch() {
    let response = get(make_test_state(), "/epochs/2025-063T12:04:00.000Z").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["EPOCH"], "2025-063T12:04:00.000Z");
    assert_eq!(json["X_DOT"]["units"], "km/s");
}

#[tokio::test]
async fn test_get_epoch_unknown_is_not_found() {
    let response = get(make_test_state(), "/epochs/2025-063T12:05:00.000Z").await;
    assert_error(response, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
async fn test_get_epoch_malformed_is_bad_request() {
    let response = get(make_test_state(), "/epochs/INVALID_EPOCH").await;
    assert_error(response, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn test_get_speed() {
    let response = get(make_test_state(), "/epochs/2025-063T12:00:00.000Z/speed").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["EPOCH"], "2025-063T12:00:00.000Z");
    assert_eq!(json["units"], "km/s");
    let speed = json["instantaneous_speed"].as_f64().unwrap();
    assert!((speed - 7.6686).abs() < 1e-3, "speed {speed}");
}

#[tokio::test]
async fn test_get_speed_unknown_epoch() {
    let response = get(make_test_state(), "/epochs/2030-001T00:00:00.000Z/speed").await;
    assert_error(response, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
async fn test_get_location() {
    let response = get(make_test_state(), "/epochs/2025-063T12:08:00.000Z/location").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["EPOCH"], "2025-063T12:08:00.000Z");
    let latitude = json["latitude"].as_f64().unwrap();
    let longitude = json["longitude"].as_f64().unwrap();
    let altitude = json["altitude"].as_f64().unwrap();
    assert!(latitude.abs() <= 52.0);
    assert!((-180.0..=180.0).contains(&longitude));
    assert!((395.0..=430.0).contains(&altitude), "altitude {altitude}");
    assert_eq!(json["nearest_geolocation"], NO_PLACE_MESSAGE);
}

#[tokio::test]
async fn test_get_now() {
    let response = get(make_test_state(), "/now").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    // The sample feed ends in the past, so the closest sample is the last.
    assert_eq!(json["EPOCH"], "2025-063T12:20:00.000Z");
    assert!(json["seconds_from_now"].as_f64().unwrap() < 0.0);
    assert!(json["instantaneous_speed"].as_f64().unwrap() > 7.0);
    for key in ["latitude", "longitude", "altitude", "nearest_geolocation"] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
}

// =========================================================================
// Feed info
// =========================================================================

#[tokio::test]
async fn test_get_header() {
    let response = get(make_test_state(), "/header").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["ORIGINATOR"], "JSC");
    assert_eq!(json["CREATION_DATE"], "2025-063T11:30:00.000Z");
}

#[tokio::test]
async fn test_get_metadata() {
    let response = get(make_test_state(), "/metadata").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["OBJECT_NAME"], "ISS");
    assert_eq!(json["REF_FRAME"], "EME2000");
    assert_eq!(json["START_TIME"], "2025-063T12:00:00.000Z");
}

#[tokio::test]
async fn test_get_comments() {
    let response = get(make_test_state(), "/comment").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    let comments = json.as_array().unwrap();
    assert_eq!(comments.len(), 3);
    assert_eq!(comments[2], "MASS=459325.00");
}

// =========================================================================
// Failures
// =========================================================================

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let response = get(make_test_state(), "/nope").await;
    assert_error(response, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
async fn test_feed_failure_is_bad_gateway() {
    let state =
        make_test_state_with_feed(FeedSource::File(FileFeed::new("/definitely/not/here.xml")));
    let response = get(state, "/epochs").await;
    assert_error(response, StatusCode::BAD_GATEWAY).await;
}

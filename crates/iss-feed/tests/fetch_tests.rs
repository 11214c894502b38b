//! Integration tests for the feed sources.
//!
//! A throwaway Axum server on an ephemeral port stands in for the NASA
//! endpoint so the HTTP path is exercised without leaving the machine.

#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use iss_feed::{FeedError, FeedSource, FileFeed, HttpFeed};
use tokio::net::TcpListener;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("iss_sample.xml")
}

/// Serve `router` on an ephemeral local port and return its address.
async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn http_source(addr: SocketAddr, path: &str) -> FeedSource {
    let url = format!("http://{addr}{path}");
    FeedSource::Http(HttpFeed::new(&url, Duration::from_secs(5)).unwrap())
}

#[tokio::test]
async fn http_feed_parses_served_document() {
    let xml = std::fs::read_to_string(fixture_path()).unwrap();
    let router = Router::new().route(
        "/ISS.OEM_J2K_EPH.xml",
        get(move || {
            let xml = xml.clone();
            async move { xml }
        }),
    );
    let addr = serve(router).await;

    let dataset = http_source(addr, "/ISS.OEM_J2K_EPH.xml").fetch().await.unwrap();

    assert_eq!(dataset.len(), 6);
    assert_eq!(
        dataset.state_vectors[0].epoch.to_string(),
        "2025-063T12:00:00.000Z"
    );
    assert_eq!(dataset.info.metadata.object_name.as_deref(), Some("ISS"));
    assert_eq!(dataset.info.comments.len(), 3);
}

#[tokio::test]
async fn http_feed_reports_upstream_status() {
    let router = Router::new().route(
        "/broken",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
    );
    let addr = serve(router).await;

    match http_source(addr, "/broken").fetch().await {
        Err(FeedError::Status { status, url }) => {
            assert_eq!(status, 503);
            assert!(url.ends_with("/broken"));
        }
        other => panic!("expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn http_feed_reports_unparseable_body() {
    let router = Router::new().route("/html", get(|| async { "<html><body>oops</body></html>" }));
    let addr = serve(router).await;

    let result = http_source(addr, "/html").fetch().await;
    assert!(matches!(result, Err(FeedError::Xml(_))));
}

#[tokio::test]
async fn http_feed_reports_connection_failure() {
    // Bind then drop to get a port with nothing listening.
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let result = http_source(addr, "/feed.xml").fetch().await;
    assert!(matches!(result, Err(FeedError::Request(_))));
}

#[tokio::test]
async fn file_feed_reads_local_copy() {
    let source = FeedSource::File(FileFeed::new(fixture_path()));
    let dataset = source.fetch().await.unwrap();
    assert_eq!(dataset.len(), 6);
    assert!(source.describe().starts_with("file://"));
}

#[tokio::test]
async fn file_feed_missing_file() {
    let source = FeedSource::File(FileFeed::new("/definitely/not/here.xml"));
    assert!(matches!(source.fetch().await, Err(FeedError::Io { .. })));
}

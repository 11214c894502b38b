//! Error types for the tracker API.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use iss_core::{LookupError, TrackerError};
use iss_types::EpochParseError;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A query or path parameter is malformed.
    #[error("{0}")]
    BadRequest(String),

    /// The requested resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The upstream feed could not be fetched or parsed.
    #[error("upstream feed unavailable: {0}")]
    Upstream(String),

    /// Anything else, including cache failures.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TrackerError> for ApiError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::Lookup(e) => Self::from(e),
            TrackerError::EpochNotFound(epoch) => Self::NotFound(format!("epoch {epoch} not found")),
            TrackerError::NoData => Self::NotFound(err.to_string()),
            TrackerError::Feed(e) => Self::Upstream(e.to_string()),
            TrackerError::Cache(_)
            | TrackerError::Geocode(_)
            | TrackerError::Config(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<EpochParseError> for ApiError {
    fn from(err: EpochParseError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        }

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

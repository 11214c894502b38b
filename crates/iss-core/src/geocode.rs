//! Reverse geocoding of the sub-satellite point.
//!
//! Nominatim only names a place when there is one near the coordinates at
//! the requested zoom. Over open water most zooms come back empty, so the
//! search walks a fixed zoom order and stops at the first hit.

use std::time::Duration;

use serde::Deserialize;

/// Reported when no zoom level names a place.
pub const NO_PLACE_MESSAGE: &str = "No nearest geolocation found. ISS might be over an ocean.";

/// Reported when the geocoder could not be reached.
pub const UNAVAILABLE_MESSAGE: &str = "Nearest geolocation unavailable.";

/// Zoom levels tried in order: street level first, then closer, then
/// progressively wider down to city level.
pub const ZOOM_SEARCH_ORDER: [u8; 9] = [15, 16, 17, 18, 14, 13, 12, 11, 10];

/// Errors from the reverse geocoder.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// Transport failure or undecodable body.
    #[error("geocoder request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The geocoder answered with a non-success status.
    #[error("geocoder returned HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },
}

/// Reverse geocoder selection.
#[derive(Debug, Clone)]
pub enum Geocoder {
    /// Query a Nominatim instance.
    Nominatim(NominatimClient),
    /// Never look anything up.
    Disabled,
}

impl Geocoder {
    /// Display name of the place nearest `(latitude, longitude)`.
    ///
    /// Returns `Ok(None)` when nothing is named at any zoom level or the
    /// geocoder is disabled.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the geocoder cannot be queried.
    pub async fn nearest_place(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<String>, GeocodeError> {
        match self {
            Self::Nominatim(client) => client.nearest_place(latitude, longitude).await,
            Self::Disabled => Ok(None),
        }
    }

    /// Backend name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Nominatim(_) => "nominatim",
            Self::Disabled => "disabled",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the Nominatim `/reverse` endpoint.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimClient {
    /// Create a client for the instance at `base_url`.
    ///
    /// Nominatim's usage policy requires an identifying `user_agent`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Request`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Walk [`ZOOM_SEARCH_ORDER`] and return the first named place.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] on the first failed request.
    pub async fn nearest_place(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<String>, GeocodeError> {
        for zoom in ZOOM_SEARCH_ORDER {
            if let Some(name) = self.reverse(latitude, longitude, zoom).await? {
                tracing::debug!(latitude, longitude, zoom, place = %name, "reverse geocode hit");
                return Ok(Some(name));
            }
        }
        tracing::debug!(latitude, longitude, "no place at any zoom level");
        Ok(None)
    }

    async fn reverse(
        &self,
        latitude: f64,
        longitude: f64,
        zoom: u8,
    ) -> Result<Option<String>, GeocodeError> {
        let url = format!("{}/reverse", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("format", String::from("jsonv2")),
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("zoom", zoom.to_string()),
                ("accept-language", String::from("en")),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status {
                status: status.as_u16(),
            });
        }

        let body: ReverseResponse = response.json().await?;
        if let Some(reason) = body.error {
            tracing::trace!(zoom, reason = %reason, "nothing at this zoom");
            return Ok(None);
        }
        Ok(body.display_name.filter(|name| !name.is_empty()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_geocoder_finds_nothing() {
        let place = Geocoder::Disabled.nearest_place(10.0, 20.0).await.unwrap();
        assert!(place.is_none());
        assert_eq!(Geocoder::Disabled.name(), "disabled");
    }

    #[test]
    fn zoom_order_covers_city_to_building() {
        assert_eq!(ZOOM_SEARCH_ORDER[0], 15);
        let mut sorted = ZOOM_SEARCH_ORDER.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, (10..=18).collect::<Vec<u8>>());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client =
            NominatimClient::new("http://localhost:1/", "test", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url, "http://localhost:1");
    }

    #[test]
    fn response_with_error_field_decodes() {
        let body: ReverseResponse =
            serde_json::from_str(r#"{"error":"Unable to geocode"}"#).unwrap();
        assert!(body.display_name.is_none());
        assert_eq!(body.error.as_deref(), Some("Unable to geocode"));
    }
}

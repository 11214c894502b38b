//! Derived payloads returned by the tracker API.

use serde::{Deserialize, Serialize};

use crate::epoch::Epoch;

/// Geodetic position on the WGS-84 ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodeticPosition {
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Longitude in degrees in `[-180, 180]`, positive east.
    pub longitude: f64,
    /// Height above the ellipsoid in kilometres.
    pub altitude: f64,
}

/// Instantaneous speed at one epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedReport {
    /// Epoch of the sample.
    #[serde(rename = "EPOCH")]
    pub epoch: Epoch,
    /// Magnitude of the velocity vector.
    pub instantaneous_speed: f64,
    /// Unit of `instantaneous_speed` (`km/s`).
    pub units: String,
}

/// Ground position and nearest named place at one epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationReport {
    /// Epoch of the sample.
    #[serde(rename = "EPOCH")]
    pub epoch: Epoch,
    /// Sub-satellite point and altitude.
    #[serde(flatten)]
    pub position: GeodeticPosition,
    /// Display name of the closest named place, or an explanation.
    pub nearest_geolocation: String,
}

/// Everything known about the sample closest to the current time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NowReport {
    /// Epoch of the closest sample.
    #[serde(rename = "EPOCH")]
    pub epoch: Epoch,
    /// Signed offset of the sample from the query time (negative: in the past).
    pub seconds_from_now: f64,
    /// Speed at the sample (km/s).
    pub instantaneous_speed: f64,
    /// Sub-satellite point and altitude.
    #[serde(flatten)]
    pub position: GeodeticPosition,
    /// Display name of the closest named place, or an explanation.
    pub nearest_geolocation: String,
}

//! State vectors: one position/velocity sample of the ISS.
//!
//! Positions are J2000 (EME2000) inertial coordinates in kilometres and
//! velocities are in kilometres per second, exactly as published in the
//! feed. JSON field names follow the OEM element names (`EPOCH`, `X`,
//! `X_DOT`, ...).

use serde::{Deserialize, Serialize};

use crate::epoch::Epoch;

/// A scalar value with its unit label from the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Numeric value.
    pub value: f64,
    /// Unit label (e.g. `km`, `km/s`) if the feed supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

impl Measurement {
    /// Create a measurement with a unit label.
    pub fn new(value: f64, units: &str) -> Self {
        Self {
            value,
            units: Some(units.to_owned()),
        }
    }

    /// A position component in kilometres.
    pub fn km(value: f64) -> Self {
        Self::new(value, "km")
    }

    /// A velocity component in kilometres per second.
    pub fn km_per_s(value: f64) -> Self {
        Self::new(value, "km/s")
    }
}

/// A plain Cartesian 3-vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vector3 {
    /// Create a vector from its components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length.
    pub fn norm(&self) -> f64 {
        self.z.mul_add(self.z, self.x.mul_add(self.x, self.y * self.y)).sqrt()
    }
}

/// One ISS trajectory sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateVector {
    /// Sample time.
    #[serde(rename = "EPOCH")]
    pub epoch: Epoch,
    /// Position X (km).
    #[serde(rename = "X")]
    pub x: Measurement,
    /// Position Y (km).
    #[serde(rename = "Y")]
    pub y: Measurement,
    /// Position Z (km).
    #[serde(rename = "Z")]
    pub z: Measurement,
    /// Velocity X (km/s).
    #[serde(rename = "X_DOT")]
    pub x_dot: Measurement,
    /// Velocity Y (km/s).
    #[serde(rename = "Y_DOT")]
    pub y_dot: Measurement,
    /// Velocity Z (km/s).
    #[serde(rename = "Z_DOT")]
    pub z_dot: Measurement,
}

impl StateVector {
    /// Build a state vector from raw position (km) and velocity (km/s).
    pub fn from_components(epoch: Epoch, position: Vector3, velocity: Vector3) -> Self {
        Self {
            epoch,
            x: Measurement::km(position.x),
            y: Measurement::km(position.y),
            z: Measurement::km(position.z),
            x_dot: Measurement::km_per_s(velocity.x),
            y_dot: Measurement::km_per_s(velocity.y),
            z_dot: Measurement::km_per_s(velocity.z),
        }
    }

    /// Position in kilometres.
    pub const fn position(&self) -> Vector3 {
        Vector3::new(self.x.value, self.y.value, self.z.value)
    }

    /// Velocity in kilometres per second.
    pub const fn velocity(&self) -> Vector3 {
        Vector3::new(self.x_dot.value, self.y_dot.value, self.z_dot.value)
    }
}

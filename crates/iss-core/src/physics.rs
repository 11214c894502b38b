//! Orbital derivations: speed and ground position.
//!
//! The feed gives positions in the J2000 (EME2000) inertial frame. To get
//! a latitude and longitude the position is carried into the Earth-fixed
//! frame:
//!
//! ```text
//! J2000 --(IAU 1976 precession)--> mean equator of date
//!       --(rotation by GMST, IAU 1982)--> Earth-fixed
//!       --(WGS-84)--> latitude / longitude / altitude
//! ```
//!
//! Nutation, polar motion, and UT1-UTC are ignored. At ISS altitude that
//! leaves an error well under a kilometre on the ground track.

use core::f64::consts::TAU;

use iss_types::{Epoch, GeodeticPosition, Vector3};

/// Julian date of the J2000 epoch (2000-01-01 12:00 TT).
const J2000_JD: f64 = 2_451_545.0;

/// Julian date of the Unix epoch.
const UNIX_EPOCH_JD: f64 = 2_440_587.5;

const MILLIS_PER_DAY: f64 = 86_400_000.0;
const DAYS_PER_CENTURY: f64 = 36_525.0;
const ARCSEC_PER_DEGREE: f64 = 3600.0;

/// WGS-84 equatorial radius in kilometres.
const WGS84_A: f64 = 6378.137;
/// WGS-84 flattening.
const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// Magnitude of a velocity vector.
pub fn speed(velocity: Vector3) -> f64 {
    velocity.norm()
}

/// Julian date of an epoch.
#[allow(clippy::cast_precision_loss)]
pub fn julian_date(epoch: Epoch) -> f64 {
    let millis = epoch.as_datetime().timestamp_millis() as f64;
    millis / MILLIS_PER_DAY + UNIX_EPOCH_JD
}

fn julian_centuries(epoch: Epoch) -> f64 {
    (julian_date(epoch) - J2000_JD) / DAYS_PER_CENTURY
}

/// Greenwich mean sidereal time in radians, in `[0, 2π)`.
pub fn gmst(epoch: Epoch) -> f64 {
    let t = julian_centuries(epoch);
    let seconds = (-6.2e-6 * t)
        .mul_add(t * t, 0.093_104 * t * t)
        + (876_600.0 * 3600.0 + 8_640_184.812_866_f64).mul_add(t, 67_310.548_41);
    // 240 seconds of sidereal time per degree.
    (seconds / 240.0).to_radians().rem_euclid(TAU)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Mat3 {
    rows: [Vector3; 3],
}

impl Mat3 {
    const IDENTITY: Self = Self {
        rows: [
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        ],
    };

    /// Frame rotation about the z axis.
    fn rot_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            rows: [
                Vector3::new(c, s, 0.0),
                Vector3::new(-s, c, 0.0),
                Vector3::new(0.0, 0.0, 1.0),
            ],
        }
    }

    /// Frame rotation about the y axis.
    fn rot_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            rows: [
                Vector3::new(c, 0.0, -s),
                Vector3::new(0.0, 1.0, 0.0),
                Vector3::new(s, 0.0, c),
            ],
        }
    }

    fn apply(&self, v: Vector3) -> Vector3 {
        let [r0, r1, r2] = self.rows;
        Vector3::new(dot(r0, v), dot(r1, v), dot(r2, v))
    }

    fn then(&self, other: &Self) -> Self {
        // Row i of (self * other) is a combination of other's rows.
        let [b0, b1, b2] = other.rows;
        let combine = |a: Vector3| {
            Vector3::new(
                a.z.mul_add(b2.x, a.x.mul_add(b0.x, a.y * b1.x)),
                a.z.mul_add(b2.y, a.x.mul_add(b0.y, a.y * b1.y)),
                a.z.mul_add(b2.z, a.x.mul_add(b0.z, a.y * b1.z)),
            )
        };
        let [a0, a1, a2] = self.rows;
        Self {
            rows: [combine(a0), combine(a1), combine(a2)],
        }
    }
}

fn dot(a: Vector3, b: Vector3) -> f64 {
    a.z.mul_add(b.z, a.x.mul_add(b.x, a.y * b.y))
}

fn arcsec(value: f64) -> f64 {
    (value / ARCSEC_PER_DEGREE).to_radians()
}

/// IAU 1976 precession matrix from J2000 to the mean equator of date.
fn precession(epoch: Epoch) -> Mat3 {
    let t = julian_centuries(epoch);
    let t2 = t * t;
    let t3 = t2 * t;
    let zeta = arcsec(0.017_998_f64.mul_add(t3, 2306.2181_f64.mul_add(t, 0.30188 * t2)));
    let z = arcsec(0.018_203_f64.mul_add(t3, 2306.2181_f64.mul_add(t, 1.094_68 * t2)));
    let theta = arcsec((-0.041_833_f64).mul_add(t3, 2004.3109_f64.mul_add(t, -0.426_65 * t2)));
    Mat3::rot_z(-z).then(&Mat3::rot_y(theta)).then(&Mat3::rot_z(-zeta))
}

/// Carry a J2000 inertial position into the Earth-fixed frame at `epoch`.
pub fn eci_to_ecef(position: Vector3, epoch: Epoch) -> Vector3 {
    let mean_of_date = precession(epoch).apply(position);
    Mat3::rot_z(gmst(epoch)).apply(mean_of_date)
}

/// Convert an Earth-fixed position (km) to WGS-84 geodetic coordinates.
pub fn ecef_to_geodetic(position: Vector3) -> GeodeticPosition {
    let e2 = WGS84_F * (2.0 - WGS84_F);
    let b = WGS84_A * (1.0 - WGS84_F);
    let Vector3 { x, y, z } = position;
    let p = x.hypot(y);

    if p < 1e-9 {
        return GeodeticPosition {
            latitude: if z < 0.0 { -90.0 } else { 90.0 },
            longitude: 0.0,
            altitude: z.abs() - b,
        };
    }

    let prime_vertical = |lat: f64| WGS84_A / (e2 * lat.sin().powi(2)).mul_add(-1.0, 1.0).sqrt();

    let mut lat = z.atan2(p * (1.0 - e2));
    let mut alt = 0.0;
    for _ in 0..16 {
        let n = prime_vertical(lat);
        alt = p / lat.cos() - n;
        let next = z.atan2(p * (1.0 - e2 * n / (n + alt)));
        let converged = (next - lat).abs() < 1e-13;
        lat = next;
        if converged {
            break;
        }
    }
    alt = p / lat.cos() - prime_vertical(lat);

    GeodeticPosition {
        latitude: lat.to_degrees(),
        longitude: y.atan2(x).to_degrees(),
        altitude: alt,
    }
}

/// Ground position of a J2000 inertial position at `epoch`.
pub fn geodetic_position(position: Vector3, epoch: Epoch) -> GeodeticPosition {
    ecef_to_geodetic(eci_to_ecef(position, epoch))
}

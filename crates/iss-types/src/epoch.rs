//! OEM epoch timestamps.
//!
//! The NASA feed stamps every state vector with a UTC instant written as
//! year plus day-of-year, e.g. `2025-063T12:00:00.000Z`. [`Epoch`] parses
//! that form and always formats back to it with millisecond precision, so
//! the formatted string doubles as the cache key for a state vector.

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Canonical output format for epochs (always three fractional digits).
pub const OEM_EPOCH_FORMAT: &str = "%Y-%jT%H:%M:%S%.3fZ";

/// Accepted input format (any number of fractional digits).
const OEM_PARSE_FORMAT: &str = "%Y-%jT%H:%M:%S%.fZ";

/// Error returned when a string is not a valid OEM epoch.
#[derive(Debug, thiserror::Error)]
#[error("invalid epoch {input:?}: expected YYYY-DDDTHH:MM:SS.sssZ ({source})")]
pub struct EpochParseError {
    /// The rejected input.
    pub input: String,
    /// The underlying chrono parse failure.
    pub source: chrono::ParseError,
}

/// A UTC instant truncated to millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Epoch(DateTime<Utc>);

impl Epoch {
    /// Parse an OEM epoch string such as `2025-063T12:00:00.000Z`.
    ///
    /// # Errors
    ///
    /// Returns [`EpochParseError`] if the string does not match the OEM
    /// day-of-year format or names an impossible date.
    pub fn parse(input: &str) -> Result<Self, EpochParseError> {
        NaiveDateTime::parse_from_str(input.trim(), OEM_PARSE_FORMAT)
            .map(|naive| Self::from_datetime(naive.and_utc()))
            .map_err(|source| EpochParseError {
                input: input.to_owned(),
                source,
            })
    }

    /// Wrap a UTC instant, dropping anything finer than a millisecond.
    pub fn from_datetime(instant: DateTime<Utc>) -> Self {
        Self(instant.trunc_subsecs(3))
    }

    /// The epoch for the current wall-clock time.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Return the inner [`DateTime`].
    pub const fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Signed seconds from `self` to `other` (positive when `other` is later).
    #[allow(clippy::cast_precision_loss)]
    pub fn seconds_until(&self, other: Self) -> f64 {
        let millis = other
            .0
            .timestamp_millis()
            .saturating_sub(self.0.timestamp_millis());
        millis as f64 / 1000.0
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(OEM_EPOCH_FORMAT))
    }
}

impl FromStr for Epoch {
    type Err = EpochParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<DateTime<Utc>> for Epoch {
    fn from(instant: DateTime<Utc>) -> Self {
        Self::from_datetime(instant)
    }
}

impl Serialize for Epoch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Epoch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Datelike, TimeZone, Timelike};

    use super::*;

    #[test]
    fn parses_day_of_year() {
        let epoch = Epoch::parse("2025-063T12:00:00.000Z").unwrap();
        let dt = epoch.as_datetime();
        assert_eq!(dt.year(), 2025);
        assert_eq!(dt.month(), 3);
        assert_eq!(dt.day(), 4);
        assert_eq!(dt.hour(), 12);
    }

    #[test]
    fn display_is_canonical() {
        let epoch = Epoch::parse("2025-063T12:04:30.5Z").unwrap();
        assert_eq!(epoch.to_string(), "2025-063T12:04:30.500Z");

        let exact = Epoch::parse("2024-366T23:59:59.999Z").unwrap();
        assert_eq!(exact.to_string(), "2024-366T23:59:59.999Z");
    }

    #[test]
    fn rejects_garbage() {
        assert!(Epoch::parse("INVALID_EPOCH").is_err());
        assert!(Epoch::parse("9999-999T99:99:99.999Z").is_err());
        assert!(Epoch::parse("2025-03-04T12:00:00.000Z").is_err());
    }

    #[test]
    fn truncates_to_milliseconds() {
        let instant = Utc
            .with_ymd_and_hms(2025, 3, 4, 12, 0, 0)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();
        assert_eq!(Epoch::from_datetime(instant).to_string(), "2025-063T12:00:00.123Z");
    }

    #[test]
    fn seconds_until_is_signed() {
        let a = Epoch::parse("2025-063T12:00:00.000Z").unwrap();
        let b = Epoch::parse("2025-063T12:04:00.000Z").unwrap();
        assert!((a.seconds_until(b) - 240.0).abs() < 1e-9);
        assert!((b.seconds_until(a) + 240.0).abs() < 1e-9);
    }

    #[test]
    fn serde_uses_oem_string() {
        let epoch = Epoch::parse("2025-063T12:00:00.000Z").unwrap();
        let json = serde_json::to_string(&epoch).unwrap();
        assert_eq!(json, "\"2025-063T12:00:00.000Z\"");
        let back: Epoch = serde_json::from_str(&json).unwrap();
        assert_eq!(back, epoch);
    }
}

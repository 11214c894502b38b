//! Epoch lookup: pagination and nearest-epoch search.
//!
//! These are pure functions over the ordered epoch list; the tracker
//! feeds them from the cache.

use iss_types::Epoch;

/// Errors from query parameter handling and lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// A pagination parameter is not a non-negative integer.
    #[error("<{name}> parameter must be a non-negative integer, got {value:?}")]
    InvalidParameter {
        /// Parameter name (`limit` or `offset`).
        name: &'static str,
        /// The rejected text.
        value: String,
    },

    /// The offset points past the last epoch.
    #[error("<offset> parameter is out of range: {offset} >= {total} epochs")]
    OffsetOutOfRange {
        /// Requested offset.
        offset: usize,
        /// Number of cached epochs.
        total: usize,
    },
}

/// Raw pagination request from the query string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// Maximum number of epochs to return; `None` means all remaining.
    pub limit: Option<usize>,
    /// Number of epochs to skip; `None` means zero.
    pub offset: Option<usize>,
}

/// A resolved, in-range page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// First position returned.
    pub offset: usize,
    /// Number of epochs returned (already clamped to what remains).
    pub limit: usize,
}

impl PageRequest {
    /// Parse `limit` and `offset` query values.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::InvalidParameter`] naming the first value
    /// that is not a non-negative integer.
    pub fn parse(limit: Option<&str>, offset: Option<&str>) -> Result<Self, LookupError> {
        Ok(Self {
            limit: limit.map(|v| parse_count("limit", v)).transpose()?,
            offset: offset.map(|v| parse_count("offset", v)).transpose()?,
        })
    }

    /// Resolve against the number of available epochs.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::OffsetOutOfRange`] when the offset is not
    /// below `total`.
    pub fn resolve(&self, total: usize) -> Result<Page, LookupError> {
        let offset = self.offset.unwrap_or(0);
        if offset >= total {
            return Err(LookupError::OffsetOutOfRange { offset, total });
        }
        let remaining = total.saturating_sub(offset);
        let limit = self.limit.map_or(remaining, |l| l.min(remaining));
        Ok(Page { offset, limit })
    }
}

fn parse_count(name: &'static str, value: &str) -> Result<usize, LookupError> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_err| LookupError::InvalidParameter {
            name,
            value: value.to_owned(),
        })
}

/// Result of a nearest-epoch search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    /// Position of the match in the searched list.
    pub index: usize,
    /// The matching epoch.
    pub epoch: Epoch,
    /// Signed seconds from the target to the match (negative: match is earlier).
    pub offset_seconds: f64,
}

/// Find the epoch closest to `target`.
///
/// Distance is the absolute time difference. On a tie the earlier
/// position in `epochs` wins. Returns `None` for an empty list.
pub fn nearest(epochs: &[Epoch], target: Epoch) -> Option<Nearest> {
    let target_ms = target.as_datetime().timestamp_millis();
    epochs
        .iter()
        .enumerate()
        .min_by_key(|(index, epoch)| {
            (
                epoch.as_datetime().timestamp_millis().abs_diff(target_ms),
                *index,
            )
        })
        .map(|(index, epoch)| Nearest {
            index,
            epoch: *epoch,
            offset_seconds: target.seconds_until(*epoch),
        })
}

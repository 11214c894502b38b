//! Feed-level data: the OEM header, segment metadata, comments, and the
//! parsed dataset as a whole.

use serde::{Deserialize, Serialize};

use crate::epoch::Epoch;
use crate::state_vector::StateVector;

/// The OEM `<header>` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct FeedHeader {
    /// When the ephemeris was generated.
    pub creation_date: Option<String>,
    /// Producing organisation.
    pub originator: Option<String>,
}

/// The `<metadata>` block of the OEM data segment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct FeedMetadata {
    /// Spacecraft name (`ISS`).
    pub object_name: Option<String>,
    /// International designator.
    pub object_id: Option<String>,
    /// Central body (`EARTH`).
    pub center_name: Option<String>,
    /// Reference frame of the state vectors (`EME2000`).
    pub ref_frame: Option<String>,
    /// Time system of the epochs (`UTC`).
    pub time_system: Option<String>,
    /// First epoch covered by the segment.
    pub start_time: Option<String>,
    /// Last epoch covered by the segment.
    pub stop_time: Option<String>,
}

/// Everything in a feed except the state vectors themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedInfo {
    /// OEM header.
    pub header: FeedHeader,
    /// Segment metadata.
    pub metadata: FeedMetadata,
    /// Free-text `COMMENT` lines from the data block, in order.
    pub comments: Vec<String>,
}

/// One complete parsed feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Header, metadata, and comments.
    pub info: FeedInfo,
    /// State vectors in feed order.
    pub state_vectors: Vec<StateVector>,
}

impl Dataset {
    /// Epochs of all state vectors, in feed order.
    pub fn epochs(&self) -> Vec<Epoch> {
        self.state_vectors.iter().map(|sv| sv.epoch).collect()
    }

    /// Number of state vectors.
    pub fn len(&self) -> usize {
        self.state_vectors.len()
    }

    /// Whether the dataset has no state vectors.
    pub fn is_empty(&self) -> bool {
        self.state_vectors.is_empty()
    }
}

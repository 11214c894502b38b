//! CCSDS OEM XML parsing.
//!
//! Only the parts of the NDM/OEM schema that the tracker serves are
//! modelled. The document shape is:
//!
//! ```text
//! ndm
//! +-- oem
//!     +-- header   (CREATION_DATE, ORIGINATOR)
//!     +-- body
//!         +-- segment
//!             +-- metadata (OBJECT_NAME, REF_FRAME, ...)
//!             +-- data
//!                 +-- COMMENT*
//!                 +-- stateVector* (EPOCH, X, Y, Z, X_DOT, Y_DOT, Z_DOT)
//! ```
//!
//! Unknown elements and attributes are ignored.

use iss_types::{
    Dataset, Epoch, FeedHeader, FeedInfo, FeedMetadata, Measurement, StateVector,
};
use serde::Deserialize;

use crate::error::FeedError;

#[derive(Debug, Deserialize)]
struct RawNdm {
    oem: RawOem,
}

#[derive(Debug, Deserialize)]
struct RawOem {
    #[serde(default)]
    header: FeedHeader,
    body: RawBody,
}

#[derive(Debug, Deserialize)]
struct RawBody {
    segment: RawSegment,
}

#[derive(Debug, Deserialize)]
struct RawSegment {
    #[serde(default)]
    metadata: FeedMetadata,
    data: RawData,
}

#[derive(Debug, Deserialize)]
struct RawData {
    #[serde(rename = "COMMENT", default)]
    comments: Vec<RawText>,
    #[serde(rename = "stateVector", default)]
    state_vectors: Vec<RawStateVector>,
}

#[derive(Debug, Deserialize)]
struct RawText {
    #[serde(rename = "$text", default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct RawQuantity {
    #[serde(rename = "@units", default)]
    units: Option<String>,
    #[serde(rename = "$text", default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct RawStateVector {
    epoch: String,
    x: RawQuantity,
    y: RawQuantity,
    z: RawQuantity,
    x_dot: RawQuantity,
    y_dot: RawQuantity,
    z_dot: RawQuantity,
}

impl RawStateVector {
    fn into_state_vector(self) -> Result<StateVector, FeedError> {
        let epoch = Epoch::parse(&self.epoch)?;
        let raw_epoch = self.epoch;
        let measure = |field: &'static str, q: RawQuantity| -> Result<Measurement, FeedError> {
            let value = q.text.trim().parse::<f64>().map_err(|source| FeedError::InvalidNumber {
                epoch: raw_epoch.clone(),
                field,
                value: q.text.clone(),
                source,
            })?;
            Ok(Measurement {
                value,
                units: q.units,
            })
        };

        Ok(StateVector {
            epoch,
            x: measure("X", self.x)?,
            y: measure("Y", self.y)?,
            z: measure("Z", self.z)?,
            x_dot: measure("X_DOT", self.x_dot)?,
            y_dot: measure("Y_DOT", self.y_dot)?,
            z_dot: measure("Z_DOT", self.z_dot)?,
        })
    }
}

/// Parse an OEM XML document into a [`Dataset`].
///
/// State vectors keep their feed order. Empty `COMMENT` elements are
/// dropped; the remaining comment text is trimmed.
///
/// # Errors
///
/// Returns [`FeedError::Xml`] if the XML is malformed or lacks the
/// expected structure, [`FeedError::InvalidEpoch`] or
/// [`FeedError::InvalidNumber`] if a state vector cannot be read, and
/// [`FeedError::Empty`] if the feed holds no state vectors at all.
pub fn parse_oem(xml: &str) -> Result<Dataset, FeedError> {
    let raw: RawNdm = quick_xml::de::from_str(xml)?;
    let RawSegment { metadata, data } = raw.oem.body.segment;

    if data.state_vectors.is_empty() {
        return Err(FeedError::Empty);
    }

    let state_vectors = data
        .state_vectors
        .into_iter()
        .map(RawStateVector::into_state_vector)
        .collect::<Result<Vec<_>, _>>()?;

    let comments = data
        .comments
        .into_iter()
        .map(|c| c.text.trim().to_owned())
        .filter(|c| !c.is_empty())
        .collect();

    Ok(Dataset {
        info: FeedInfo {
            header: raw.oem.header,
            metadata,
            comments,
        },
        state_vectors,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const TWO_VECTORS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ndm>
  <oem id="CCSDS_OEM_VERS" version="2.0">
    <header>
      <CREATION_DATE>2025-062T20:00:00.000Z</CREATION_DATE>
      <ORIGINATOR>JSC</ORIGINATOR>
    </header>
    <body>
      <segment>
        <metadata>
          <OBJECT_NAME>ISS</OBJECT_NAME>
          <REF_FRAME>EME2000</REF_FRAME>
        </metadata>
        <data>
          <COMMENT>MASS=459325.00</COMMENT>
          <COMMENT></COMMENT>
          <stateVector>
            <EPOCH>2025-063T12:00:00.000Z</EPOCH>
            <X units="km">1000.0</X>
            <Y units="km">2000.0</Y>
            <Z units="km">3000.0</Z>
            <X_DOT units="km/s">2.0</X_DOT>
            <Y_DOT units="km/s">2.0</Y_DOT>
            <Z_DOT units="km/s">1.0</Z_DOT>
          </stateVector>
          <stateVector>
            <EPOCH>2025-063T12:01:00.000Z</EPOCH>
            <X units="km">1100.0</X>
            <Y units="km">2100.0</Y>
            <Z units="km">3100.0</Z>
            <X_DOT units="km/s">3.0</X_DOT>
            <Y_DOT units="km/s">1.0</Y_DOT>
            <Z_DOT units="km/s">4.0</Z_DOT>
          </stateVector>
        </data>
      </segment>
    </body>
  </oem>
</ndm>"#;

    #[test]
    fn parses_state_vectors_in_order() {
        let dataset = parse_oem(TWO_VECTORS).unwrap();
        assert_eq!(dataset.len(), 2);

        let first = &dataset.state_vectors[0];
        assert_eq!(first.epoch.to_string(), "2025-063T12:00:00.000Z");
        assert!((first.x.value - 1000.0).abs() < f64::EPSILON);
        assert_eq!(first.x.units.as_deref(), Some("km"));
        assert_eq!(first.z_dot.units.as_deref(), Some("km/s"));

        let second = &dataset.state_vectors[1];
        assert_eq!(second.epoch.to_string(), "2025-063T12:01:00.000Z");
        assert!((second.velocity().norm() - 26.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn parses_header_metadata_and_comments() {
        let dataset = parse_oem(TWO_VECTORS).unwrap();
        assert_eq!(dataset.info.header.originator.as_deref(), Some("JSC"));
        assert_eq!(dataset.info.metadata.object_name.as_deref(), Some("ISS"));
        assert_eq!(dataset.info.metadata.ref_frame.as_deref(), Some("EME2000"));
        assert!(dataset.info.metadata.stop_time.is_none());
        assert_eq!(dataset.info.comments, vec![String::from("MASS=459325.00")]);
    }

    #[test]
    fn empty_feed_is_an_error() {
        let xml = "<ndm><oem><body><segment><data></data></segment></body></oem></ndm>";
        assert!(matches!(parse_oem(xml), Err(FeedError::Empty)));
    }

    #[test]
    fn missing_structure_is_an_error() {
        let xml = "<ndm><oem><header/></oem></ndm>";
        assert!(matches!(parse_oem(xml), Err(FeedError::Xml(_))));
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(parse_oem("<ndm><oem>").is_err());
        assert!(parse_oem("not xml at all").is_err());
    }

    #[test]
    fn non_numeric_component_is_reported() {
        let xml = TWO_VECTORS.replace("<Y units=\"km\">2000.0</Y>", "<Y units=\"km\">abc</Y>");
        match parse_oem(&xml) {
            Err(FeedError::InvalidNumber { field, value, .. }) => {
                assert_eq!(field, "Y");
                assert_eq!(value, "abc");
            }
            other => panic!("expected InvalidNumber, got {other:?}"),
        }
    }

    #[test]
    fn bad_epoch_is_reported() {
        let xml = TWO_VECTORS.replace("2025-063T12:01:00.000Z", "yesterday");
        assert!(matches!(parse_oem(&xml), Err(FeedError::InvalidEpoch(_))));
    }
}

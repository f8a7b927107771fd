//! # Plan Requests
//!
//! A [`PlanRequest`] describes the survey to be planned: the area to cover, the altitude to fly
//! at, and how much adjacent images should overlap.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path};

use crate::GeoCoordinate;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A request to plan a coverage survey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    /// Vertices of the area to survey, in order. At least three are required.
    pub polygon: Vec<GeoCoordinate>,

    /// Flight altitude above the take off point.
    ///
    /// Units: meters
    pub altitude: f64,

    /// Overlap between adjacent images along each axis.
    ///
    /// Units: percent
    pub overlap_percent: f64,

    /// Minimum fraction of a grid cell which must lie inside the polygon for it to be flown.
    pub coverage_threshold: f64,

    /// Take off and landing position. When given the waypoint list starts and ends here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_point: Option<GeoCoordinate>,

    /// Live position of the drone, used to choose which grid cell is visited first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drone_start_point: Option<GeoCoordinate>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur while reading a request.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Cannot read the request file: {0}")]
    FileLoadError(io::Error),

    #[error("Cannot parse the request: {0}")]
    DeserialiseError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PlanRequest {
    /// Parse a request from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, RequestError> {
        serde_json::from_str(json).map_err(RequestError::DeserialiseError)
    }

    /// Load a request from the JSON file at the given path.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, RequestError> {
        let json = fs::read_to_string(path).map_err(RequestError::FileLoadError)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_json() {
        let req = PlanRequest::from_json(
            r#"{
                "polygon": [
                    {"lat": 57.0, "lon": 9.0},
                    {"lat": 57.0, "lon": 9.1},
                    {"lat": 57.1, "lon": 9.1}
                ],
                "altitude": 20,
                "overlapPercent": 30,
                "coverageThreshold": 0.8,
                "startPoint": {"lat": 57.05, "lon": 9.05}
            }"#,
        )
        .unwrap();

        assert_eq!(req.polygon.len(), 3);
        assert_eq!(req.altitude, 20.0);
        assert_eq!(req.overlap_percent, 30.0);
        assert_eq!(req.start_point, Some(GeoCoordinate::new(57.05, 9.05)));
        assert!(req.drone_start_point.is_none());
    }

    #[test]
    fn test_from_json_missing_field() {
        let res = PlanRequest::from_json(r#"{"polygon": [], "altitude": 20}"#);
        assert!(matches!(res, Err(RequestError::DeserialiseError(_))));
    }
}

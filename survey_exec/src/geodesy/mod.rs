//! # Geodesy
//!
//! Geographic helpers shared by the grid placement and tour modules.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use mission_if::GeoCoordinate;
use util::maths;

use crate::error::PlanError;

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod projection;

pub use projection::LocalTangentPlane;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Minimum number of vertices in a survey polygon.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Largest absolute latitude the local projection is used at. Beyond this the longitude scale
/// collapses towards zero.
///
/// Units: degrees
pub const MAX_REFERENCE_LATITUDE_DEG: f64 = 85.0;

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Great-circle distance between two coordinates in meters.
pub fn distance_m(from: &GeoCoordinate, to: &GeoCoordinate) -> f64 {
    maths::haversine_m(from.lat, from.lon, to.lat, to.lon)
}

/// Initial bearing from one coordinate to another, in degrees clockwise from north.
pub fn bearing_deg(from: &GeoCoordinate, to: &GeoCoordinate) -> f64 {
    maths::initial_bearing_deg(from.lat, from.lon, to.lat, to.lon)
}

/// Arithmetic mean of the given coordinates, or `None` if there are none.
pub fn centroid(coords: &[GeoCoordinate]) -> Option<GeoCoordinate> {
    if coords.is_empty() {
        return None;
    }

    let n = coords.len() as f64;
    let (lat_sum, lon_sum) = coords
        .iter()
        .fold((0.0, 0.0), |(lat, lon), c| (lat + c.lat, lon + c.lon));

    Some(GeoCoordinate::new(lat_sum / n, lon_sum / n))
}

/// Check that a polygon can be surveyed.
///
/// The polygon must have at least three vertices, all of which are valid coordinates, and must
/// not sit so close to a pole that the local projection degenerates. Self intersection is not
/// checked.
pub fn validate_polygon(polygon: &[GeoCoordinate]) -> Result<(), PlanError> {
    if polygon.len() < MIN_POLYGON_VERTICES {
        return Err(PlanError::InvalidPolygon(format!(
            "expected at least {} vertices, found {}",
            MIN_POLYGON_VERTICES,
            polygon.len()
        )));
    }

    if let Some((i, c)) = polygon.iter().enumerate().find(|(_, c)| !c.is_valid()) {
        return Err(PlanError::InvalidPolygon(format!(
            "vertex {} is not a valid coordinate {}",
            i, c
        )));
    }

    match centroid(polygon) {
        Some(c) if c.lat.abs() <= MAX_REFERENCE_LATITUDE_DEG => Ok(()),
        _ => Err(PlanError::InvalidPolygon(format!(
            "polygon centre must be within {} degrees of the equator",
            MAX_REFERENCE_LATITUDE_DEG
        ))),
    }
}

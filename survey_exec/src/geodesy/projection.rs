//! # Local Tangent Plane Projection
//!
//! Converts between geographic coordinates and a flat metric plane centred on a reference point,
//! using an equirectangular approximation. The approximation is good to well under a centimetre
//! within a few kilometres of the reference, which bounds the size of area that can be planned
//! in one go.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use mission_if::GeoCoordinate;
use nalgebra::Vector2;

use super::centroid;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Length of one degree of latitude.
///
/// Units: meters/degree
pub const METRES_PER_DEGREE: f64 = 111_320.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A local east/north plane centred on a reference coordinate.
///
/// Frame: x positive east, y positive north, units meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalTangentPlane {
    reference: GeoCoordinate,

    /// Length of one degree of longitude at the reference latitude.
    metres_per_deg_lon: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl LocalTangentPlane {
    pub fn new(reference: GeoCoordinate) -> Self {
        Self {
            reference,
            metres_per_deg_lon: METRES_PER_DEGREE * reference.lat.to_radians().cos(),
        }
    }

    /// Create a plane centred on the mean of the polygon's vertices.
    ///
    /// Returns `None` if the polygon is empty.
    pub fn centred_on(polygon: &[GeoCoordinate]) -> Option<Self> {
        centroid(polygon).map(Self::new)
    }

    pub fn reference(&self) -> &GeoCoordinate {
        &self.reference
    }

    /// Convert a longitude/latitude pair into local plane coordinates.
    pub fn to_local(&self, lon: f64, lat: f64) -> Vector2<f64> {
        Vector2::new(
            (lon - self.reference.lon) * self.metres_per_deg_lon,
            (lat - self.reference.lat) * METRES_PER_DEGREE,
        )
    }

    /// Convert local plane coordinates back into a `(lon, lat)` pair.
    pub fn to_local_inverse(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.reference.lon + x / self.metres_per_deg_lon,
            self.reference.lat + y / METRES_PER_DEGREE,
        )
    }

    pub fn project(&self, coord: &GeoCoordinate) -> Vector2<f64> {
        self.to_local(coord.lon, coord.lat)
    }

    pub fn unproject(&self, point_m: &Vector2<f64>) -> GeoCoordinate {
        let (lon, lat) = self.to_local_inverse(point_m.x, point_m.y);
        GeoCoordinate::new(lat, lon)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_round_trip() {
        let plane = LocalTangentPlane::new(GeoCoordinate::new(57.0128, 9.9905));

        // Points up to a few kilometres from the reference
        for &(d_lat, d_lon) in &[
            (0.0, 0.0),
            (0.001, -0.002),
            (-0.02, 0.03),
            (0.03, 0.05),
            (-0.045, -0.06),
        ] {
            let lat = 57.0128 + d_lat;
            let lon = 9.9905 + d_lon;
            let local = plane.to_local(lon, lat);
            let (lon_rt, lat_rt) = plane.to_local_inverse(local.x, local.y);

            assert!((lon_rt - lon).abs() < 1e-6);
            assert!((lat_rt - lat).abs() < 1e-6);
        }
    }

    #[test]
    fn test_scale() {
        let plane = LocalTangentPlane::new(GeoCoordinate::new(60.0, 10.0));

        // One degree north is METRES_PER_DEGREE, one degree east is half that at 60 degrees
        let north = plane.to_local(10.0, 61.0);
        assert!(north.x.abs() < 1e-9);
        assert!((north.y - METRES_PER_DEGREE).abs() < 1e-6);

        let east = plane.to_local(11.0, 60.0);
        assert!((east.x - METRES_PER_DEGREE * 0.5).abs() < 1e-6);
        assert!(east.y.abs() < 1e-9);

        // The reference maps to the origin
        assert_eq!(plane.project(plane.reference()), Vector2::new(0.0, 0.0));
    }

    #[test]
    fn test_centred_on() {
        assert!(LocalTangentPlane::centred_on(&[]).is_none());

        let plane = LocalTangentPlane::centred_on(&[
            GeoCoordinate::new(57.0, 9.0),
            GeoCoordinate::new(57.0, 9.2),
            GeoCoordinate::new(57.2, 9.2),
            GeoCoordinate::new(57.2, 9.0),
        ])
        .unwrap();

        let r = plane.reference();
        assert!((r.lat - 57.1).abs() < 1e-12);
        assert!((r.lon - 9.1).abs() < 1e-12);

        let c = plane.unproject(&Vector2::new(0.0, 0.0));
        assert!((c.lat - 57.1).abs() < 1e-12);
    }
}

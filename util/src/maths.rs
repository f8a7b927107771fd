//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Mean radius of the earth used for great-circle calculations.
///
/// Units: meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Great-circle distance between two positions using the haversine formula.
///
/// Inputs are in degrees, the result is in meters.
pub fn haversine_m(lat_0: f64, lon_0: f64, lat_1: f64, lon_1: f64) -> f64 {
    let phi_0 = lat_0.to_radians();
    let phi_1 = lat_1.to_radians();
    let d_phi = (lat_1 - lat_0).to_radians();
    let d_lambda = (lon_1 - lon_0).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi_0.cos() * phi_1.cos() * (d_lambda / 2.0).sin().powi(2);

    // Rounding can push `a` just above 1 for antipodal points
    2.0 * EARTH_RADIUS_M * a.min(1.0).sqrt().asin()
}

/// Initial great-circle bearing from the first position towards the second.
///
/// Inputs are in degrees, the result is in degrees clockwise from north in the range [0, 360).
pub fn initial_bearing_deg(lat_0: f64, lon_0: f64, lat_1: f64, lon_1: f64) -> f64 {
    let phi_0 = lat_0.to_radians();
    let phi_1 = lat_1.to_radians();
    let d_lambda = (lon_1 - lon_0).to_radians();

    let y = d_lambda.sin() * phi_1.cos();
    let x = phi_0.cos() * phi_1.sin() - phi_0.sin() * phi_1.cos() * d_lambda.cos();

    let bearing = rem_euclid(y.atan2(x).to_degrees(), 360.0);

    // rem_euclid can round up to the modulus itself
    if bearing >= 360.0 {
        0.0
    } else {
        bearing
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// The return value `r` satisfies `0.0 <= r < rhs.abs()` in most cases. Due to floating point
/// round-off it can result in `r == rhs.abs()` if `lhs` is much smaller than `rhs.abs()` in
/// magnitude and `lhs < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_haversine() {
        assert_eq!(haversine_m(57.0, 9.0, 57.0, 9.0), 0.0);

        // One degree of latitude is R * pi / 180
        let one_deg = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;
        assert!((haversine_m(0.0, 0.0, 1.0, 0.0) - one_deg).abs() < 1e-6);

        // Symmetric
        let ab = haversine_m(57.0128, 9.9905, 57.0145, 9.9940);
        let ba = haversine_m(57.0145, 9.9940, 57.0128, 9.9905);
        assert!((ab - ba).abs() < 1e-9);

        // Antipodal points are half the circumference apart
        let half = EARTH_RADIUS_M * std::f64::consts::PI;
        assert!((haversine_m(0.0, 0.0, 0.0, 180.0) - half).abs() < 1e-3);
    }

    #[test]
    fn test_initial_bearing() {
        assert!((initial_bearing_deg(0.0, 0.0, 1.0, 0.0) - 0.0).abs() < 1e-9);
        assert!((initial_bearing_deg(0.0, 0.0, 0.0, 1.0) - 90.0).abs() < 1e-9);
        assert!((initial_bearing_deg(1.0, 0.0, 0.0, 0.0) - 180.0).abs() < 1e-9);
        assert!((initial_bearing_deg(0.0, 1.0, 0.0, 0.0) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_rem_euclid() {
        assert_eq!(rem_euclid(-90.0f64, 360.0), 270.0);
        assert_eq!(rem_euclid(450.0f64, 360.0), 90.0);
        assert_eq!(rem_euclid(0.0f64, 360.0), 0.0);
    }
}

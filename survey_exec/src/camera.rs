//! # Camera Footprint
//!
//! Computes the patch of ground seen by the survey camera at a given altitude, and from that the
//! spacing between adjacent images for a given overlap.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::error::PlanError;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters describing the survey camera and the platform carrying it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraParams {
    /// Horizontal field of view.
    ///
    /// Units: degrees
    pub hfov_deg: f64,

    /// Image width divided by image height.
    pub aspect_ratio: f64,

    /// Highest altitude the platform is rated to survey from.
    ///
    /// Units: meters
    pub max_altitude_m: f64,
}

/// The ground rectangle visible in a single image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    /// Extent across the image's horizontal axis, aligned east-west.
    ///
    /// Units: meters
    pub width_m: f64,

    /// Extent across the image's vertical axis, aligned north-south.
    ///
    /// Units: meters
    pub height_m: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            hfov_deg: 82.6,
            aspect_ratio: 4.0 / 3.0,
            max_altitude_m: 120.0,
        }
    }
}

impl CameraParams {
    pub fn validate(&self) -> Result<(), PlanError> {
        if !(self.hfov_deg > 0.0 && self.hfov_deg < 180.0) {
            return Err(PlanError::InvalidParameter(format!(
                "camera horizontal field of view must be in (0, 180) degrees, found {}",
                self.hfov_deg
            )));
        }
        if !(self.aspect_ratio > 0.0 && self.aspect_ratio.is_finite()) {
            return Err(PlanError::InvalidParameter(format!(
                "camera aspect ratio must be positive, found {}",
                self.aspect_ratio
            )));
        }
        if !(self.max_altitude_m > 0.0 && self.max_altitude_m.is_finite()) {
            return Err(PlanError::InvalidParameter(format!(
                "camera maximum altitude must be positive, found {}",
                self.max_altitude_m
            )));
        }

        Ok(())
    }
}

impl Footprint {
    /// Compute the footprint of the camera at the given altitude.
    ///
    /// Fails if the altitude is not positive or is above the camera's rated ceiling.
    pub fn at_altitude(altitude_m: f64, camera: &CameraParams) -> Result<Self, PlanError> {
        if !(altitude_m > 0.0 && altitude_m <= camera.max_altitude_m) {
            return Err(PlanError::InvalidParameter(format!(
                "altitude must be in (0, {}] m, found {}",
                camera.max_altitude_m, altitude_m
            )));
        }

        let width_m = 2.0 * altitude_m * (camera.hfov_deg.to_radians() / 2.0).tan();

        Ok(Self {
            width_m,
            height_m: width_m / camera.aspect_ratio,
        })
    }

    pub fn area_m2(&self) -> f64 {
        self.width_m * self.height_m
    }

    /// Distance between adjacent image centres along each axis for the given overlap.
    ///
    /// The overlap must already have been validated, see [`validate_overlap`].
    pub fn step(&self, overlap_percent: f64) -> Vector2<f64> {
        let scale = 1.0 - overlap_percent / 100.0;
        Vector2::new(self.width_m * scale, self.height_m * scale)
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Check the image overlap is usable.
///
/// An overlap of 100 % would give a zero step between images, so the valid range is [0, 100).
pub fn validate_overlap(overlap_percent: f64) -> Result<(), PlanError> {
    if overlap_percent >= 0.0 && overlap_percent < 100.0 {
        Ok(())
    } else {
        Err(PlanError::InvalidParameter(format!(
            "overlap must be in [0, 100) percent, found {}",
            overlap_percent
        )))
    }
}

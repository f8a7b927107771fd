//! # Plan Responses
//!
//! A [`PlanResponse`] carries everything downstream systems need to fly and process a survey:
//! - the grid cells to photograph,
//! - the ordered waypoints to fly through,
//! - distance and time estimates for the flight.
//!
//! The `i`-th entry of [`PlanResponse::grids`] corresponds to the `i`-th
//! [`WaypointType::GridCenter`] waypoint, which is how captured images are matched to cells.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::GeoCoordinate;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The result of planning a survey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    /// Number of grid cells in the plan.
    pub grid_count: usize,

    /// Grid cells in visiting order.
    pub grids: Vec<GridOut>,

    /// Waypoints in flight order.
    pub waypoints: Vec<Waypoint>,

    /// Distance and time estimates, `None` only when there is nothing to fly.
    pub path_metrics: Option<PathMetrics>,

    /// Statistics about how the plan was built.
    pub metadata: PlanMetadata,
}

/// A single camera footprint on the ground.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridOut {
    pub center: GeoCoordinate,

    /// Corners of the footprint, counter-clockwise from the south-west corner.
    pub corners: [GeoCoordinate; 4],

    /// Fraction of the footprint inside the survey polygon.
    pub coverage_ratio: f64,
}

/// A single navigation instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub lat: f64,

    pub lon: f64,

    #[serde(rename = "type")]
    pub wp_type: WaypointType,

    /// Position of this waypoint in the flight, starting at 0.
    pub order: usize,

    /// Heading to face at the waypoint.
    ///
    /// Units: degrees clockwise from north, [0, 360)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

/// Distance and time estimates for a flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathMetrics {
    /// Units: meters
    pub total_distance: f64,

    pub grid_count: usize,

    /// Units: seconds
    pub estimated_flight_time: f64,
}

/// Statistics describing how a plan was built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanMetadata {
    pub altitude_m: f64,
    pub overlap_percent: f64,
    pub coverage_threshold: f64,

    /// Ground footprint of a single image.
    pub footprint_width_m: f64,
    pub footprint_height_m: f64,

    /// Separation between adjacent grid cell centres.
    pub step_x_m: f64,
    pub step_y_m: f64,

    /// Number of lattice cells tested against the polygon.
    pub candidate_count: usize,

    pub polygon_area_m2: f64,

    /// Area of the polygon not seen by any selected cell.
    pub not_searched_area_m2: f64,

    /// Area of selected cells lying outside the polygon.
    pub extra_area_m2: f64,

    /// Length of the nearest neighbour tour before local search.
    pub initial_tour_distance_m: f64,

    /// Length of the tour after local search.
    pub optimised_tour_distance_m: f64,

    /// Units: percent
    pub tour_improvement_percent: f64,

    pub optimisation_sweeps: usize,

    /// True if the local search reached a local optimum before its budget ran out.
    pub optimisation_converged: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The purpose of a waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaypointType {
    /// Take off or landing position
    StartEnd,

    /// Centre of a grid cell, where an image is captured
    GridCenter,
}

//! # Survey Planning Library
//!
//! Plans aerial coverage surveys: tiles a target polygon with camera footprints, orders them into
//! a short closed tour and produces the waypoints to fly.
//!
//! The main entry point is [`SurveyPlanner`].

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Camera footprint sizing
pub mod camera;

/// Planning errors
pub mod error;

/// Geographic helpers and the local tangent plane projection
pub mod geodesy;

/// Grid placement - tiles the survey polygon with camera footprints
pub mod grid;

/// Parameters for the whole planner
pub mod params;

/// Planner entry point
pub mod planner;

/// Tour optimisation - orders grid cells into a short closed tour
pub mod tour;

/// Waypoint synthesis - builds the flown waypoints and flight estimates
pub mod waypoint;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use error::PlanError;
pub use params::SurveyParams;
pub use planner::SurveyPlanner;

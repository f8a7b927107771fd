//! # Mission interface crate.
//!
//! Provides the common interface types exchanged between the survey planner and the systems which
//! consume its output (flight execution, telemetry, imagery correlation).

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Geographic coordinate types
pub mod coord;

/// Plan request definitions
pub mod request;

/// Plan response definitions
pub mod response;

// ------------------------------------------------------------------------------------------------
// REEXPORTS
// ------------------------------------------------------------------------------------------------

pub use coord::GeoCoordinate;
pub use request::{PlanRequest, RequestError};
pub use response::{GridOut, PathMetrics, PlanMetadata, PlanResponse, Waypoint, WaypointType};

//! # Survey Planner
//!
//! Entry point to the planning engine. A [`SurveyPlanner`] holds validated parameters and turns
//! each [`PlanRequest`] into a [`PlanResponse`] by running grid placement, tour optimisation and
//! waypoint synthesis in turn.
//!
//! Every input is checked before any geometry work starts, so a plan either fails outright or is
//! complete. Planning is synchronous, holds no mutable state and uses no randomness, so a planner
//! can be shared between threads and identical requests give identical responses.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, info};
use mission_if::{GeoCoordinate, GridOut, PlanMetadata, PlanRequest, PlanResponse};

use crate::{
    camera::{validate_overlap, Footprint},
    error::PlanError,
    geodesy::validate_polygon,
    grid::{place_grids, validate_coverage_threshold, GridCell},
    params::SurveyParams,
    tour::optimize_tour,
    waypoint::synthesize,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SurveyPlanner {
    params: SurveyParams,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SurveyPlanner {
    /// Create a new planner, failing if the parameters are invalid.
    pub fn new(params: SurveyParams) -> Result<Self, PlanError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &SurveyParams {
        &self.params
    }

    /// Plan a survey.
    ///
    /// The tour starts at the grid cell nearest the drone's live position, or the start point if
    /// no live position is given. The waypoints are bookended by the start point, or the live
    /// position if no start point is given.
    pub fn plan(&self, request: &PlanRequest) -> Result<PlanResponse, PlanError> {
        self.validate_request(request)?;

        let placement = place_grids(
            &request.polygon,
            request.altitude,
            request.overlap_percent,
            request.coverage_threshold,
            &self.params.camera,
            &self.params.grid,
        )?;

        let centres: Vec<GeoCoordinate> = placement.cells.iter().map(|c| c.center).collect();

        let tour_start = request
            .drone_start_point
            .as_ref()
            .or_else(|| request.start_point.as_ref());
        let tour = optimize_tour(&centres, tour_start, &self.params.tour);

        let ordered_cells: Vec<&GridCell> =
            tour.order.iter().map(|&i| &placement.cells[i]).collect();
        let ordered_centres: Vec<GeoCoordinate> = ordered_cells.iter().map(|c| c.center).collect();

        let bookend = request
            .start_point
            .as_ref()
            .or_else(|| request.drone_start_point.as_ref());
        let (waypoints, path_metrics) = synthesize(&ordered_centres, bookend, &self.params.flight);

        let initial = tour.stats.initial_distance_m;
        let tour_improvement_percent = if initial > 0.0 {
            (initial - tour.total_distance_m) / initial * 100.0
        } else {
            0.0
        };

        debug!(
            "Tour improved from {:.1} m to {:.1} m ({:.2} %)",
            initial, tour.total_distance_m, tour_improvement_percent
        );

        let metadata = PlanMetadata {
            altitude_m: request.altitude,
            overlap_percent: request.overlap_percent,
            coverage_threshold: request.coverage_threshold,
            footprint_width_m: placement.footprint.width_m,
            footprint_height_m: placement.footprint.height_m,
            step_x_m: placement.step_m.x,
            step_y_m: placement.step_m.y,
            candidate_count: placement.candidate_count,
            polygon_area_m2: placement.polygon_area_m2,
            not_searched_area_m2: placement.not_searched_area_m2,
            extra_area_m2: placement.extra_area_m2,
            initial_tour_distance_m: initial,
            optimised_tour_distance_m: tour.total_distance_m,
            tour_improvement_percent,
            optimisation_sweeps: tour.stats.sweeps,
            optimisation_converged: tour.stats.converged,
        };

        let grids: Vec<GridOut> = ordered_cells.into_iter().map(GridOut::from).collect();

        if let Some(m) = &path_metrics {
            info!(
                "Planned {} grids over {:.0} m2, {} waypoints, {:.1} m path, {:.0} s estimated \
                 flight time",
                grids.len(),
                placement.polygon_area_m2,
                waypoints.len(),
                m.total_distance,
                m.estimated_flight_time
            );
        }

        Ok(PlanResponse {
            grid_count: grids.len(),
            grids,
            waypoints,
            path_metrics,
            metadata,
        })
    }

    /// Check every request input before planning starts.
    fn validate_request(&self, request: &PlanRequest) -> Result<(), PlanError> {
        validate_polygon(&request.polygon)?;
        Footprint::at_altitude(request.altitude, &self.params.camera)?;
        validate_overlap(request.overlap_percent)?;
        validate_coverage_threshold(request.coverage_threshold)?;

        let points = [
            ("start point", &request.start_point),
            ("drone start point", &request.drone_start_point),
        ];
        for (name, point) in points.iter() {
            if let Some(p) = point {
                if !p.is_valid() {
                    return Err(PlanError::InvalidParameter(format!(
                        "{} is not a valid coordinate {}",
                        name, p
                    )));
                }
            }
        }

        Ok(())
    }
}

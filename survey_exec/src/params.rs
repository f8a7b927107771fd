//! # Survey Planner Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::{
    camera::CameraParams, error::PlanError, grid::GridParams, tour::TourParams,
    waypoint::FlightParams,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the whole planner, loaded from `survey_exec.toml`.
///
/// Any table or field missing from the file takes its default value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveyParams {
    pub camera: CameraParams,

    pub grid: GridParams,

    pub tour: TourParams,

    pub flight: FlightParams,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SurveyParams {
    pub fn validate(&self) -> Result<(), PlanError> {
        self.camera.validate()?;
        self.grid.validate()?;
        self.tour.validate()?;
        self.flight.validate()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_partial() {
        let params: SurveyParams = util::params::parse(
            r#"
            [camera]
            hfov_deg = 90.0

            [tour]
            max_sweeps = 50
            use_three_opt = true

            [flight]
            cruise_speed_ms = 8.0
            "#,
        )
        .unwrap();

        assert_eq!(params.camera.hfov_deg, 90.0);
        assert_eq!(params.camera.max_altitude_m, 120.0);
        assert_eq!(params.tour.max_sweeps, 50);
        assert!(params.tour.use_three_opt);
        assert_eq!(params.tour.time_limit_s, None);
        assert_eq!(params.flight.cruise_speed_ms, 8.0);
        assert_eq!(params.flight.dwell_time_s, 3.0);
        assert_eq!(params.grid, GridParams::default());
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_parse_empty() {
        let params: SurveyParams = util::params::parse("").unwrap();
        assert_eq!(params, SurveyParams::default());
    }

    #[test]
    fn test_validate() {
        let mut params = SurveyParams::default();
        params.camera.hfov_deg = 180.0;
        assert!(matches!(
            params.validate(),
            Err(PlanError::InvalidParameter(_))
        ));
    }
}

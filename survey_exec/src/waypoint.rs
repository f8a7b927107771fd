//! # Waypoint Synthesis
//!
//! Turns an ordered tour of grid centres into the waypoints flown by the drone, and estimates the
//! length and duration of the flight.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use mission_if::{GeoCoordinate, PathMetrics, Waypoint, WaypointType};
use serde::{Deserialize, Serialize};

use crate::{
    error::PlanError,
    geodesy::{bearing_deg, distance_m},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Flight model used for time estimates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightParams {
    /// Units: meters/second
    pub cruise_speed_ms: f64,

    /// Units: seconds
    pub takeoff_time_s: f64,

    /// Time to climb to survey altitude.
    ///
    /// Units: seconds
    pub ascend_time_s: f64,

    /// Units: seconds
    pub landing_time_s: f64,

    /// Time spent hovering at each grid centre to take the image.
    ///
    /// Units: seconds
    pub dwell_time_s: f64,

    /// Give each grid centre waypoint a heading towards the next waypoint.
    pub emit_heading: bool,
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build the waypoint sequence for a tour of grid centres.
///
/// With a start point the sequence is bookended by `start_end` waypoints at that point. Without
/// one the drone returns from the last grid centre to the first, and that closing edge is
/// included in the distance.
///
/// An empty tour produces no waypoints and no metrics.
pub fn synthesize(
    ordered_centres: &[GeoCoordinate],
    start_point: Option<&GeoCoordinate>,
    params: &FlightParams,
) -> (Vec<Waypoint>, Option<PathMetrics>) {
    if ordered_centres.is_empty() {
        return (Vec::new(), None);
    }

    // Every position flown through, in order
    let mut stops: Vec<(GeoCoordinate, WaypointType)> =
        Vec::with_capacity(ordered_centres.len() + 2);

    if let Some(start) = start_point {
        stops.push((*start, WaypointType::StartEnd));
    }
    stops.extend(
        ordered_centres
            .iter()
            .map(|c| (*c, WaypointType::GridCenter)),
    );
    if let Some(start) = start_point {
        stops.push((*start, WaypointType::StartEnd));
    }

    // Leg i runs from stop i to the next stop flown. Bookended sequences end where they started,
    // otherwise the last leg closes the loop back to the first centre.
    let next_of = |i: usize| -> Option<usize> {
        if i + 1 < stops.len() {
            Some(i + 1)
        } else if start_point.is_none() {
            Some(0)
        } else {
            None
        }
    };

    let total_distance: f64 = (0..stops.len())
        .filter_map(|i| next_of(i).map(|j| distance_m(&stops[i].0, &stops[j].0)))
        .sum();

    let waypoints = stops
        .iter()
        .enumerate()
        .map(|(order, (pos, wp_type))| {
            let rotation = match wp_type {
                WaypointType::GridCenter if params.emit_heading => next_of(order)
                    .map(|j| &stops[j].0)
                    .filter(|next| distance_m(pos, next) > 0.0)
                    .map(|next| bearing_deg(pos, next)),
                _ => None,
            };

            Waypoint {
                lat: pos.lat,
                lon: pos.lon,
                wp_type: *wp_type,
                order,
                rotation,
            }
        })
        .collect();

    let grid_count = ordered_centres.len();

    let metrics = PathMetrics {
        total_distance,
        grid_count,
        estimated_flight_time: params.flight_time_s(total_distance, grid_count),
    };

    (waypoints, Some(metrics))
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for FlightParams {
    fn default() -> Self {
        Self {
            cruise_speed_ms: 5.0,
            takeoff_time_s: 5.0,
            ascend_time_s: 10.0,
            landing_time_s: 5.0,
            dwell_time_s: 3.0,
            emit_heading: true,
        }
    }
}

impl FlightParams {
    pub fn validate(&self) -> Result<(), PlanError> {
        if !(self.cruise_speed_ms > 0.0 && self.cruise_speed_ms.is_finite()) {
            return Err(PlanError::InvalidParameter(format!(
                "cruise speed must be positive, found {} m/s",
                self.cruise_speed_ms
            )));
        }

        let fixed = [
            ("takeoff", self.takeoff_time_s),
            ("ascend", self.ascend_time_s),
            ("landing", self.landing_time_s),
            ("dwell", self.dwell_time_s),
        ];
        for (name, t) in fixed.iter() {
            if !(*t >= 0.0 && t.is_finite()) {
                return Err(PlanError::InvalidParameter(format!(
                    "{} time must be non-negative, found {} s",
                    name, t
                )));
            }
        }

        Ok(())
    }

    /// Estimated flight time for a path of the given length visiting the given number of grid
    /// centres.
    pub fn flight_time_s(&self, distance_m: f64, grid_count: usize) -> f64 {
        self.takeoff_time_s
            + self.ascend_time_s
            + self.landing_time_s
            + self.dwell_time_s * grid_count as f64
            + distance_m / self.cruise_speed_ms
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn centres() -> Vec<GeoCoordinate> {
        vec![
            GeoCoordinate::new(57.0120, 9.9900),
            GeoCoordinate::new(57.0120, 9.9910),
            GeoCoordinate::new(57.0130, 9.9910),
        ]
    }

    #[test]
    fn test_without_start_point() {
        let c = centres();
        let params = FlightParams::default();
        let (wps, metrics) = synthesize(&c, None, &params);
        let metrics = metrics.unwrap();

        assert_eq!(wps.len(), 3);
        for (i, wp) in wps.iter().enumerate() {
            assert_eq!(wp.order, i);
            assert_eq!(wp.wp_type, WaypointType::GridCenter);
            assert_eq!((wp.lat, wp.lon), (c[i].lat, c[i].lon));
        }

        let expected =
            distance_m(&c[0], &c[1]) + distance_m(&c[1], &c[2]) + distance_m(&c[2], &c[0]);
        assert!((metrics.total_distance - expected).abs() < 1e-9);
        assert_eq!(metrics.grid_count, 3);
        assert!((metrics.estimated_flight_time - (29.0 + expected / 5.0)).abs() < 1e-9);

        // Headings: east, then north, then back south-west to the first centre
        let r: Vec<f64> = wps.iter().map(|w| w.rotation.unwrap()).collect();
        assert!((r[0] - 90.0).abs() < 0.01);
        assert!(r[1].abs() < 1e-6 || (r[1] - 360.0).abs() < 1e-6);
        assert!(r[2] > 180.0 && r[2] < 270.0);
    }

    #[test]
    fn test_with_start_point() {
        let c = centres();
        let start = GeoCoordinate::new(57.0110, 9.9900);
        let (wps, metrics) = synthesize(&c, Some(&start), &FlightParams::default());
        let metrics = metrics.unwrap();

        assert_eq!(wps.len(), 5);
        assert_eq!(wps[0].wp_type, WaypointType::StartEnd);
        assert_eq!(wps[4].wp_type, WaypointType::StartEnd);
        assert_eq!((wps[0].lat, wps[0].lon), (start.lat, start.lon));
        assert_eq!((wps[4].lat, wps[4].lon), (start.lat, start.lon));
        assert!(wps[1..4].iter().all(|w| w.wp_type == WaypointType::GridCenter));
        assert!(wps.iter().enumerate().all(|(i, w)| w.order == i));

        // Bookends carry no heading, the last centre faces home
        assert!(wps[0].rotation.is_none());
        assert!(wps[4].rotation.is_none());
        assert!(wps[3].rotation.is_some());

        let expected = distance_m(&start, &c[0])
            + distance_m(&c[0], &c[1])
            + distance_m(&c[1], &c[2])
            + distance_m(&c[2], &start);
        assert!((metrics.total_distance - expected).abs() < 1e-9);
        assert_eq!(metrics.grid_count, 3);
    }

    #[test]
    fn test_single_and_empty() {
        let params = FlightParams::default();

        let (wps, metrics) = synthesize(&centres()[..1], None, &params);
        let metrics = metrics.unwrap();
        assert_eq!(wps.len(), 1);
        assert_eq!(metrics.total_distance, 0.0);
        assert_eq!(metrics.grid_count, 1);
        assert_eq!(metrics.estimated_flight_time, 23.0);
        // Zero length closing leg has no heading
        assert!(wps[0].rotation.is_none());

        let (wps, metrics) = synthesize(&[], None, &params);
        assert!(wps.is_empty());
        assert!(metrics.is_none());

        let (wps, metrics) = synthesize(&[], Some(&GeoCoordinate::new(57.0, 9.0)), &params);
        assert!(wps.is_empty());
        assert!(metrics.is_none());
    }

    #[test]
    fn test_heading_disabled() {
        let params = FlightParams {
            emit_heading: false,
            ..Default::default()
        };
        let (wps, _) = synthesize(&centres(), None, &params);
        assert!(wps.iter().all(|w| w.rotation.is_none()));
    }

    #[test]
    fn test_params_validate() {
        assert!(FlightParams::default().validate().is_ok());
        assert!(FlightParams {
            cruise_speed_ms: 0.0,
            ..Default::default()
        }
        .validate()
        .is_err());
        assert!(FlightParams {
            dwell_time_s: -1.0,
            ..Default::default()
        }
        .validate()
        .is_err());
    }
}

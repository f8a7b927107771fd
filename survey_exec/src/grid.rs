//! # Grid Placement
//!
//! Tiles the bounding box of a survey polygon with camera footprints and keeps those which cover
//! enough of the polygon.
//!
//! Placement runs as a sequence of transformations over plain records:
//!
//! 1. The polygon is projected onto a [`LocalTangentPlane`] centred on it.
//! 2. The bounding box is tiled with a lattice of footprint-sized candidate cells, spaced by the
//!    footprint scaled by `1 - overlap`.
//! 3. Each candidate is intersected with the polygon once. Candidates whose coverage ratio is
//!    below the threshold are dropped.
//! 4. The survivors are stably sorted by descending coverage ratio.
//! 5. Area statistics are built from the cached intersections and the cells are projected back to
//!    geographic coordinates.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::cmp::Reverse;

use geo::{Area, BooleanOps, BoundingRect, Coord, LineString, MultiPolygon, Polygon, Rect};
use log::debug;
use mission_if::{GeoCoordinate, GridOut};
use nalgebra::Vector2;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::{
    camera::{validate_overlap, CameraParams, Footprint},
    error::PlanError,
    geodesy::{validate_polygon, LocalTangentPlane},
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Coverage ratios this close to one are treated as full coverage, so that cells lying entirely
/// inside the polygon pass a threshold of exactly one despite rounding in the intersection.
const FULL_COVERAGE_TOLERANCE: f64 = 1e-9;

/// Slack allowed when counting lattice cells, so that a bounding box which is an exact multiple
/// of the step doesn't gain an extra row or column from projection rounding.
const LATTICE_COUNT_TOLERANCE: f64 = 1e-9;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridParams {
    /// Upper limit on the number of lattice cells tested against the polygon.
    pub max_candidate_cells: usize,
}

/// A camera footprint selected for the survey.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub center: GeoCoordinate,

    /// Counter-clockwise from the south-west corner.
    pub corners: [GeoCoordinate; 4],

    /// Fraction of the cell's area lying inside the polygon, in [0, 1].
    pub coverage_ratio: f64,
}

/// The output of [`place_grids`].
#[derive(Debug, Clone)]
pub struct GridPlacement {
    /// Selected cells, highest coverage first.
    pub cells: Vec<GridCell>,

    pub footprint: Footprint,

    /// Separation between adjacent lattice centres.
    ///
    /// Units: meters
    pub step_m: Vector2<f64>,

    /// Number of lattice cells tested.
    pub candidate_count: usize,

    pub polygon_area_m2: f64,

    /// Area of the polygon outside every selected cell.
    pub not_searched_area_m2: f64,

    /// Sum over the selected cells of the cell area lying outside the polygon.
    pub extra_area_m2: f64,
}

/// A lattice cell in the local plane, with its intersection against the polygon.
#[derive(Debug, Clone)]
struct Candidate {
    centre_m: Vector2<f64>,

    overlap: MultiPolygon<f64>,

    overlap_area_m2: f64,

    coverage_ratio: f64,
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Check the coverage threshold is in (0, 1].
pub fn validate_coverage_threshold(coverage_threshold: f64) -> Result<(), PlanError> {
    if coverage_threshold > 0.0 && coverage_threshold <= 1.0 {
        Ok(())
    } else {
        Err(PlanError::InvalidParameter(format!(
            "coverage threshold must be in (0, 1], found {}",
            coverage_threshold
        )))
    }
}

/// Place grid cells over the polygon.
///
/// Fails with [`PlanError::NoFeasibleGrid`] if no cell reaches the coverage threshold.
pub fn place_grids(
    polygon: &[GeoCoordinate],
    altitude_m: f64,
    overlap_percent: f64,
    coverage_threshold: f64,
    camera: &CameraParams,
    params: &GridParams,
) -> Result<GridPlacement, PlanError> {
    // ---- VALIDATION ----

    validate_polygon(polygon)?;
    validate_overlap(overlap_percent)?;
    validate_coverage_threshold(coverage_threshold)?;
    let footprint = Footprint::at_altitude(altitude_m, camera)?;

    // ---- PROJECTION ----

    let plane = LocalTangentPlane::centred_on(polygon)
        .ok_or_else(|| PlanError::InvalidPolygon("polygon has no vertices".into()))?;

    let local_polygon = Polygon::new(
        polygon
            .iter()
            .map(|c| {
                let p = plane.project(c);
                Coord { x: p.x, y: p.y }
            })
            .collect::<LineString<f64>>(),
        vec![],
    );

    let polygon_area_m2 = local_polygon.unsigned_area();
    if !(polygon_area_m2 > 0.0) {
        return Err(PlanError::InvalidPolygon("polygon has zero area".into()));
    }

    let bbox = local_polygon
        .bounding_rect()
        .ok_or_else(|| PlanError::InvalidPolygon("polygon has no extent".into()))?;

    // ---- TILING ----

    let step_m = footprint.step(overlap_percent);
    let num_cols = (bbox.width() / step_m.x - LATTICE_COUNT_TOLERANCE).ceil().max(0.0);
    let num_rows = (bbox.height() / step_m.y - LATTICE_COUNT_TOLERANCE).ceil().max(0.0);

    // Check in floating point before converting so that huge counts can't overflow
    if num_cols * num_rows > params.max_candidate_cells as f64 {
        return Err(PlanError::InvalidParameter(format!(
            "the survey would test {} x {} candidate cells, more than the limit of {}, reduce \
             the overlap or raise the altitude",
            num_cols, num_rows, params.max_candidate_cells
        )));
    }
    let num_cols = num_cols as usize;
    let num_rows = num_rows as usize;

    let candidates: Vec<Candidate> = lattice_centres(bbox, &footprint, step_m, num_cols, num_rows)
        .map(|centre_m| Candidate::evaluate(&local_polygon, centre_m, &footprint))
        .collect();
    let candidate_count = candidates.len();

    debug!(
        "Tested {} candidate cells ({} cols x {} rows) of {:.2} x {:.2} m",
        candidate_count, num_cols, num_rows, footprint.width_m, footprint.height_m
    );

    // ---- FILTER AND RANK ----

    let best_coverage_ratio = candidates
        .iter()
        .map(|c| OrderedFloat(c.coverage_ratio))
        .max()
        .map(|r| r.0)
        .unwrap_or(0.0);

    let mut retained: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| c.coverage_ratio >= coverage_threshold)
        .collect();

    if retained.is_empty() {
        return Err(PlanError::NoFeasibleGrid {
            threshold: coverage_threshold,
            candidate_count,
            best_coverage_ratio,
        });
    }

    // Stable, so equal ratios keep lattice order
    retained.sort_by_key(|c| Reverse(OrderedFloat(c.coverage_ratio)));

    // ---- STATISTICS ----

    // Overlapping cells would be double counted by a plain sum, so the covered area is taken
    // from the union of the cached intersections
    let covered_area_m2 = retained
        .iter()
        .fold(MultiPolygon::new(vec![]), |covered, c| covered.union(&c.overlap))
        .unsigned_area();

    let not_searched_area_m2 = (polygon_area_m2 - covered_area_m2).max(0.0);

    let extra_area_m2 = retained
        .iter()
        .map(|c| (footprint.area_m2() - c.overlap_area_m2).max(0.0))
        .sum();

    debug!(
        "Retained {} cells, polygon area {:.1} m2, not searched {:.1} m2, extra {:.1} m2",
        retained.len(),
        polygon_area_m2,
        not_searched_area_m2,
        extra_area_m2
    );

    // ---- OUTPUT ----

    let cells = retained
        .iter()
        .map(|c| c.to_grid_cell(&plane, &footprint))
        .collect();

    Ok(GridPlacement {
        cells,
        footprint,
        step_m,
        candidate_count,
        polygon_area_m2,
        not_searched_area_m2,
        extra_area_m2,
    })
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Centres of the tiling lattice, row by row from the south-west corner of the bounding box.
fn lattice_centres(
    bbox: Rect<f64>,
    footprint: &Footprint,
    step_m: Vector2<f64>,
    num_cols: usize,
    num_rows: usize,
) -> impl Iterator<Item = Vector2<f64>> {
    let min = bbox.min();
    let half_width = footprint.width_m / 2.0;
    let half_height = footprint.height_m / 2.0;

    (0..num_rows).flat_map(move |row| {
        (0..num_cols).map(move |col| {
            Vector2::new(
                min.x + col as f64 * step_m.x + half_width,
                min.y + row as f64 * step_m.y + half_height,
            )
        })
    })
}

/// The footprint rectangle centred on the given point.
fn cell_rect(centre_m: Vector2<f64>, footprint: &Footprint) -> Rect<f64> {
    let half = Vector2::new(footprint.width_m / 2.0, footprint.height_m / 2.0);
    let min = centre_m - half;
    let max = centre_m + half;

    Rect::new(Coord { x: min.x, y: min.y }, Coord { x: max.x, y: max.y })
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for GridParams {
    fn default() -> Self {
        Self {
            max_candidate_cells: 100_000,
        }
    }
}

impl GridParams {
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.max_candidate_cells == 0 {
            Err(PlanError::InvalidParameter(
                "grid max_candidate_cells must be at least 1".into(),
            ))
        } else {
            Ok(())
        }
    }
}

impl Candidate {
    fn evaluate(polygon: &Polygon<f64>, centre_m: Vector2<f64>, footprint: &Footprint) -> Self {
        let overlap = polygon.intersection(&cell_rect(centre_m, footprint).to_polygon());
        let overlap_area_m2 = overlap.unsigned_area();

        let coverage_ratio = (overlap_area_m2 / footprint.area_m2()).max(0.0).min(1.0);
        let coverage_ratio = if 1.0 - coverage_ratio < FULL_COVERAGE_TOLERANCE {
            1.0
        } else {
            coverage_ratio
        };

        Self {
            centre_m,
            overlap,
            overlap_area_m2,
            coverage_ratio,
        }
    }

    fn to_grid_cell(&self, plane: &LocalTangentPlane, footprint: &Footprint) -> GridCell {
        let rect = cell_rect(self.centre_m, footprint);
        let (min, max) = (rect.min(), rect.max());

        let corner = |x: f64, y: f64| plane.unproject(&Vector2::new(x, y));

        GridCell {
            center: plane.unproject(&self.centre_m),
            corners: [
                corner(min.x, min.y),
                corner(max.x, min.y),
                corner(max.x, max.y),
                corner(min.x, max.y),
            ],
            coverage_ratio: self.coverage_ratio,
        }
    }
}

impl From<&GridCell> for GridOut {
    fn from(cell: &GridCell) -> Self {
        GridOut {
            center: cell.center,
            corners: cell.corners,
            coverage_ratio: cell.coverage_ratio,
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// Build a square polygon of the given side length centred on the given coordinate.
    pub(crate) fn square_polygon(centre: GeoCoordinate, side_m: f64) -> Vec<GeoCoordinate> {
        let plane = LocalTangentPlane::new(centre);
        let h = side_m / 2.0;

        vec![
            plane.unproject(&Vector2::new(-h, -h)),
            plane.unproject(&Vector2::new(h, -h)),
            plane.unproject(&Vector2::new(h, h)),
            plane.unproject(&Vector2::new(-h, h)),
        ]
    }

    /// Camera with a 90 degree field of view and square images, so the footprint is twice the
    /// altitude on each side.
    pub(crate) fn square_camera() -> CameraParams {
        CameraParams {
            hfov_deg: 90.0,
            aspect_ratio: 1.0,
            max_altitude_m: 120.0,
        }
    }

    fn aalborg() -> GeoCoordinate {
        GeoCoordinate::new(57.0128, 9.9905)
    }

    #[test]
    fn test_place_grids_scenario() {
        let polygon = square_polygon(aalborg(), 200.0);
        let placement = place_grids(
            &polygon,
            20.0,
            30.0,
            0.8,
            &CameraParams::default(),
            &GridParams::default(),
        )
        .unwrap();

        assert!(!placement.cells.is_empty());
        assert!(placement.cells.len() <= placement.candidate_count);
        for cell in &placement.cells {
            assert_eq!(cell.corners.len(), 4);
            assert!(cell.coverage_ratio >= 0.8 && cell.coverage_ratio <= 1.0);
        }

        // Sorted by descending coverage
        for pair in placement.cells.windows(2) {
            assert!(pair[0].coverage_ratio >= pair[1].coverage_ratio);
        }

        assert!((placement.polygon_area_m2 - 40_000.0).abs() < 1.0);
        assert!(placement.not_searched_area_m2 >= 0.0);
        assert!(placement.not_searched_area_m2 < placement.polygon_area_m2);
        assert!(placement.extra_area_m2 >= 0.0);
    }

    #[test]
    fn test_exact_tiling() {
        // A 100 m square with 20 m footprints and no overlap tiles exactly into 5 x 5 cells, all
        // of which are fully inside the polygon
        let polygon = square_polygon(aalborg(), 100.0);
        let placement = place_grids(
            &polygon,
            10.0,
            0.0,
            1.0,
            &square_camera(),
            &GridParams::default(),
        )
        .unwrap();

        assert_eq!(placement.candidate_count, 25);
        assert_eq!(placement.cells.len(), 25);
        assert!((placement.footprint.width_m - 20.0).abs() < 1e-9);
        assert!((placement.step_m.x - 20.0).abs() < 1e-9);
        assert!(placement.cells.iter().all(|c| c.coverage_ratio == 1.0));
        assert!(placement.not_searched_area_m2 < 1e-3);
        assert!(placement.extra_area_m2 >= 0.0 && placement.extra_area_m2 < 1e-3);

        // All ties, so lattice order is kept: the first cell is the south-west one and the
        // second is its eastern neighbour
        let plane = LocalTangentPlane::new(aalborg());
        let first = plane.project(&placement.cells[0].center);
        let second = plane.project(&placement.cells[1].center);
        assert!((first.x - -40.0).abs() < 1e-6 && (first.y - -40.0).abs() < 1e-6);
        assert!((second.x - -20.0).abs() < 1e-6 && (second.y - -40.0).abs() < 1e-6);

        // Corners are counter-clockwise from the south-west
        let corners: Vec<_> = placement.cells[0]
            .corners
            .iter()
            .map(|c| plane.project(c))
            .collect();
        assert!((corners[0] - Vector2::new(-50.0, -50.0)).norm() < 1e-6);
        assert!((corners[1] - Vector2::new(-30.0, -50.0)).norm() < 1e-6);
        assert!((corners[2] - Vector2::new(-30.0, -30.0)).norm() < 1e-6);
        assert!((corners[3] - Vector2::new(-50.0, -30.0)).norm() < 1e-6);
    }

    #[test]
    fn test_partial_cells_and_area_statistics() {
        // A 90 m square with 20 m footprints and no overlap gives a 5 x 5 lattice whose last row
        // and column stick 10 m out of the polygon
        let polygon = square_polygon(aalborg(), 90.0);
        let camera = square_camera();

        let all = place_grids(&polygon, 10.0, 0.0, 0.1, &camera, &GridParams::default()).unwrap();
        assert_eq!(all.cells.len(), 25);

        // 16 full cells, 8 half cells and 1 quarter cell
        let full = all.cells.iter().filter(|c| c.coverage_ratio == 1.0).count();
        let half = all
            .cells
            .iter()
            .filter(|c| (c.coverage_ratio - 0.5).abs() < 1e-6)
            .count();
        assert_eq!(full, 16);
        assert_eq!(half, 8);
        assert!((all.cells[24].coverage_ratio - 0.25).abs() < 1e-6);

        // Everything is seen, and the overhang is 8 * 200 + 300 m2
        assert!(all.not_searched_area_m2 < 1e-3);
        assert!((all.extra_area_m2 - 1_900.0).abs() < 1e-3);

        // Only keeping full cells leaves the strips along the north and east edges unseen
        let full_only =
            place_grids(&polygon, 10.0, 0.0, 1.0, &camera, &GridParams::default()).unwrap();
        assert_eq!(full_only.cells.len(), 16);
        assert!((full_only.not_searched_area_m2 - (8_100.0 - 6_400.0)).abs() < 1e-3);
        assert!(full_only.extra_area_m2 >= 0.0 && full_only.extra_area_m2 < 1e-3);
    }

    #[test]
    fn test_overlapping_cells_not_double_counted() {
        let polygon = square_polygon(aalborg(), 100.0);
        let placement = place_grids(
            &polygon,
            10.0,
            50.0,
            0.5,
            &square_camera(),
            &GridParams::default(),
        )
        .unwrap();

        // Summing the overlaps would exceed the polygon area many times over
        assert!(placement.not_searched_area_m2 >= 0.0);
        assert!(placement.not_searched_area_m2 < 1e-3);
    }

    #[test]
    fn test_no_feasible_grid() {
        // A thin triangle can never cover most of a 40 m footprint
        let plane = LocalTangentPlane::new(aalborg());
        let polygon = vec![
            plane.unproject(&Vector2::new(0.0, 0.0)),
            plane.unproject(&Vector2::new(100.0, 0.0)),
            plane.unproject(&Vector2::new(0.0, 2.0)),
        ];

        let res = place_grids(
            &polygon,
            20.0,
            0.0,
            0.9,
            &square_camera(),
            &GridParams::default(),
        );

        match res {
            Err(PlanError::NoFeasibleGrid {
                threshold,
                candidate_count,
                best_coverage_ratio,
            }) => {
                assert_eq!(threshold, 0.9);
                assert!(candidate_count > 0);
                assert!(best_coverage_ratio < 0.9);
            }
            r => panic!("Expected NoFeasibleGrid, got {:?}", r),
        }
    }

    #[test]
    fn test_invalid_inputs() {
        let polygon = square_polygon(aalborg(), 100.0);
        let camera = CameraParams::default();
        let params = GridParams::default();

        assert!(matches!(
            place_grids(&polygon[..2], 20.0, 30.0, 0.8, &camera, &params),
            Err(PlanError::InvalidPolygon(_))
        ));
        assert!(matches!(
            place_grids(&polygon, 0.0, 30.0, 0.8, &camera, &params),
            Err(PlanError::InvalidParameter(_))
        ));
        assert!(matches!(
            place_grids(&polygon, 500.0, 30.0, 0.8, &camera, &params),
            Err(PlanError::InvalidParameter(_))
        ));
        assert!(matches!(
            place_grids(&polygon, 20.0, 100.0, 0.8, &camera, &params),
            Err(PlanError::InvalidParameter(_))
        ));
        assert!(matches!(
            place_grids(&polygon, 20.0, 30.0, 0.0, &camera, &params),
            Err(PlanError::InvalidParameter(_))
        ));
        assert!(matches!(
            place_grids(&polygon, 20.0, 30.0, 1.5, &camera, &params),
            Err(PlanError::InvalidParameter(_))
        ));

        // Collinear vertices enclose nothing
        let line = vec![polygon[0], polygon[1], polygon[1]];
        assert!(matches!(
            place_grids(&line, 20.0, 30.0, 0.8, &camera, &params),
            Err(PlanError::InvalidPolygon(_))
        ));
    }

    #[test]
    fn test_candidate_limit() {
        let polygon = square_polygon(aalborg(), 1_000.0);
        let params = GridParams {
            max_candidate_cells: 100,
        };

        assert!(matches!(
            place_grids(&polygon, 10.0, 99.0, 0.5, &square_camera(), &params),
            Err(PlanError::InvalidParameter(_))
        ));
    }
}

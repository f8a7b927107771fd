//! # Tour Optimisation
//!
//! Orders the selected grid cells into a closed tour of minimal length.
//!
//! A nearest neighbour tour is built first, then improved by a first-improvement 2-opt local
//! search, optionally followed by a segment exchange (3-opt) search. The local search is bounded
//! by a maximum number of sweeps and an optional wall-clock limit, and when either runs out the
//! best tour found so far is returned.
//!
//! The whole process is deterministic: ties are always broken towards the lowest index and the
//! first improving move found is applied.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::time::{Duration, Instant};

use log::{debug, trace, warn};
use mission_if::GeoCoordinate;
use ndarray::Array2;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::{error::PlanError, geodesy::distance_m};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Minimum length reduction for a move to count as an improvement. Prevents the search cycling
/// between tours whose lengths differ only by rounding.
///
/// Units: meters
const MIN_IMPROVEMENT_M: f64 = 1e-9;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TourParams {
    /// Maximum number of local search sweeps. A new sweep starts after every accepted move.
    pub max_sweeps: usize,

    /// Optional wall-clock limit on the local search. Limits too large to represent are treated
    /// as no limit.
    ///
    /// Units: seconds
    pub time_limit_s: Option<f64>,

    /// Follow 2-opt with a segment exchange search.
    pub use_three_opt: bool,
}

/// Symmetric matrix of distances between tour nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    data: Array2<f64>,
}

/// An optimised visiting order.
#[derive(Debug, Clone, PartialEq)]
pub struct Tour {
    /// Node indices in visiting order, each appearing exactly once.
    pub order: Vec<usize>,

    /// Length of the closed tour, including the edge back to the first node.
    ///
    /// Units: meters
    pub total_distance_m: f64,

    pub stats: TourStats,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TourStats {
    /// Length of the nearest neighbour tour before improvement.
    ///
    /// Units: meters
    pub initial_distance_m: f64,

    /// Number of local search sweeps started.
    pub sweeps: usize,

    /// Number of improving moves applied.
    pub moves: usize,

    /// True if the search stopped at a local optimum rather than running out of budget.
    pub converged: bool,
}

/// Limits on the local search.
#[derive(Debug)]
struct SearchBudget {
    max_sweeps: usize,
    deadline: Option<Instant>,
    sweeps: usize,
}

/// Result of running one local search to completion or exhaustion.
#[derive(Debug, Clone, Copy)]
struct SearchOutcome {
    moves: usize,
    converged: bool,
}

/// An improving exchange of the adjacent segments `order[i..j]` and `order[j..k]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SegmentExchange {
    i: usize,
    j: usize,
    k: usize,
    kind: ExchangeKind,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// How the two segments `a = order[i..j]` and `b = order[j..k]` are put back together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExchangeKind {
    /// `b a`
    Swap,
    /// `b rev(a)`
    SwapReverseFirst,
    /// `rev(b) a`
    SwapReverseSecond,
    /// `rev(a) rev(b)`
    ReverseBoth,
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Find the shortest closed tour through the given cell centres.
///
/// If a start point is given the tour begins at the centre nearest to it, otherwise at index 0.
pub fn optimize_tour(
    centres: &[GeoCoordinate],
    start_point: Option<&GeoCoordinate>,
    params: &TourParams,
) -> Tour {
    let matrix = DistanceMatrix::from_coordinates(centres);

    let start = match start_point {
        Some(p) => nearest_start(centres, p).unwrap_or(0),
        None => 0,
    };

    optimize_tour_matrix(&matrix, start, params)
}

/// Find the shortest closed tour over a precomputed distance matrix, starting at `start`.
pub fn optimize_tour_matrix(matrix: &DistanceMatrix, start: usize, params: &TourParams) -> Tour {
    let mut order = nearest_neighbour(matrix, start);
    let initial_distance_m = matrix.tour_length(&order);

    let mut budget = SearchBudget::new(params);
    let mut moves = 0;

    let converged = loop {
        let outcome = two_opt(matrix, &mut order, &mut budget);
        moves += outcome.moves;
        if !outcome.converged {
            break false;
        }
        if !params.use_three_opt {
            break true;
        }

        let outcome = three_opt(matrix, &mut order, &mut budget);
        moves += outcome.moves;
        if !outcome.converged {
            break false;
        }

        // Nothing for segment exchange to do means 2-opt has nothing new either
        if outcome.moves == 0 {
            break true;
        }
    };

    let total_distance_m = matrix.tour_length(&order);

    if converged {
        debug!(
            "Tour of {} nodes converged after {} sweeps and {} moves, {:.1} m -> {:.1} m",
            order.len(),
            budget.sweeps,
            moves,
            initial_distance_m,
            total_distance_m
        );
    } else {
        warn!(
            "Tour optimisation budget exhausted after {} sweeps and {} moves, using best tour \
             found ({:.1} m -> {:.1} m)",
            budget.sweeps, moves, initial_distance_m, total_distance_m
        );
    }

    Tour {
        order,
        total_distance_m,
        stats: TourStats {
            initial_distance_m,
            sweeps: budget.sweeps,
            moves,
            converged,
        },
    }
}

/// Index of the centre nearest to the given point, lowest index on ties. `None` if there are no
/// centres.
pub fn nearest_start(centres: &[GeoCoordinate], point: &GeoCoordinate) -> Option<usize> {
    centres
        .iter()
        .enumerate()
        .min_by_key(|(_, c)| OrderedFloat(distance_m(point, c)))
        .map(|(i, _)| i)
}

/// Build a tour by repeatedly moving to the nearest unvisited node, lowest index on ties.
///
/// Returns an empty tour for an empty matrix. `start` must be a valid node index otherwise.
pub fn nearest_neighbour(matrix: &DistanceMatrix, start: usize) -> Vec<usize> {
    let n = matrix.len();
    if n == 0 {
        return Vec::new();
    }

    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);

    let mut current = start;
    visited[current] = true;
    order.push(current);

    while order.len() < n {
        let mut best: Option<(usize, f64)> = None;

        for j in 0..n {
            if visited[j] {
                continue;
            }
            let d = matrix.get(current, j);
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((j, d));
            }
        }

        // There is always an unvisited node while the order is incomplete
        let next = match best {
            Some((j, _)) => j,
            None => break,
        };

        visited[next] = true;
        order.push(next);
        current = next;
    }

    order
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// First-improvement 2-opt. The node at position 0 is never moved.
fn two_opt(matrix: &DistanceMatrix, order: &mut [usize], budget: &mut SearchBudget) -> SearchOutcome {
    let mut moves = 0;

    loop {
        if !budget.start_sweep() {
            return SearchOutcome {
                moves,
                converged: false,
            };
        }

        match find_two_opt_move(matrix, order) {
            Some((i, j)) => {
                trace!("2-opt: reversing positions {}..={}", i, j);
                order[i..=j].reverse();
                moves += 1;
            }
            None => {
                return SearchOutcome {
                    moves,
                    converged: true,
                }
            }
        }
    }
}

/// Find the first segment `order[i..=j]` whose reversal shortens the tour.
fn find_two_opt_move(matrix: &DistanceMatrix, order: &[usize]) -> Option<(usize, usize)> {
    let n = order.len();

    // Every closed tour over three or fewer nodes has the same length
    if n < 4 {
        return None;
    }

    for i in 1..n - 1 {
        for j in i + 1..n {
            let a = order[i - 1];
            let b = order[i];
            let c = order[j];
            let d = order[(j + 1) % n];

            let delta = matrix.get(a, c) + matrix.get(b, d) - matrix.get(a, b) - matrix.get(c, d);

            if delta < -MIN_IMPROVEMENT_M {
                return Some((i, j));
            }
        }
    }

    None
}

/// First-improvement segment exchange. The node at position 0 is never moved.
fn three_opt(
    matrix: &DistanceMatrix,
    order: &mut [usize],
    budget: &mut SearchBudget,
) -> SearchOutcome {
    let mut moves = 0;

    loop {
        if !budget.start_sweep() {
            return SearchOutcome {
                moves,
                converged: false,
            };
        }

        match find_segment_exchange(matrix, order) {
            Some(exchange) => {
                trace!("3-opt: applying {:?}", exchange);
                exchange.apply(order);
                moves += 1;
            }
            None => {
                return SearchOutcome {
                    moves,
                    converged: true,
                }
            }
        }
    }
}

/// Find the first exchange of two adjacent segments which shortens the tour.
fn find_segment_exchange(matrix: &DistanceMatrix, order: &[usize]) -> Option<SegmentExchange> {
    let n = order.len();
    if n < 4 {
        return None;
    }

    let d = |x: usize, y: usize| matrix.get(x, y);

    for i in 1..n - 1 {
        for j in i + 1..n {
            for k in j + 1..=n {
                let prev = order[i - 1];
                let a_first = order[i];
                let a_last = order[j - 1];
                let b_first = order[j];
                let b_last = order[k - 1];
                let next = order[k % n];

                let removed = d(prev, a_first) + d(a_last, b_first) + d(b_last, next);

                let options = [
                    (
                        ExchangeKind::Swap,
                        d(prev, b_first) + d(b_last, a_first) + d(a_last, next),
                    ),
                    (
                        ExchangeKind::SwapReverseFirst,
                        d(prev, b_first) + d(b_last, a_last) + d(a_first, next),
                    ),
                    (
                        ExchangeKind::SwapReverseSecond,
                        d(prev, b_last) + d(b_first, a_first) + d(a_last, next),
                    ),
                    (
                        ExchangeKind::ReverseBoth,
                        d(prev, a_last) + d(a_first, b_last) + d(b_first, next),
                    ),
                ];

                for &(kind, added) in options.iter() {
                    if added - removed < -MIN_IMPROVEMENT_M {
                        return Some(SegmentExchange { i, j, k, kind });
                    }
                }
            }
        }
    }

    None
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for TourParams {
    fn default() -> Self {
        Self {
            max_sweeps: 10_000,
            time_limit_s: None,
            use_three_opt: false,
        }
    }
}

impl TourParams {
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.max_sweeps == 0 {
            return Err(PlanError::InvalidParameter(
                "tour max_sweeps must be at least 1".into(),
            ));
        }
        if let Some(t) = self.time_limit_s {
            if !(t > 0.0 && t.is_finite()) {
                return Err(PlanError::InvalidParameter(format!(
                    "tour time limit must be a positive number of seconds, found {}",
                    t
                )));
            }
        }

        Ok(())
    }
}

impl DistanceMatrix {
    /// Build the great-circle distance matrix between the given coordinates.
    pub fn from_coordinates(coords: &[GeoCoordinate]) -> Self {
        let n = coords.len();
        Self {
            data: Array2::from_shape_fn((n, n), |(i, j)| {
                if i == j {
                    0.0
                } else {
                    distance_m(&coords[i], &coords[j])
                }
            }),
        }
    }

    /// Wrap an existing matrix, which must be square. The local search assumes the distances
    /// are symmetric.
    pub fn from_array(data: Array2<f64>) -> Option<Self> {
        if data.nrows() == data.ncols() {
            Some(Self { data })
        } else {
            None
        }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[[from, to]]
    }

    /// Length of the closed tour visiting the nodes in the given order, including the edge from
    /// the last node back to the first.
    pub fn tour_length(&self, order: &[usize]) -> f64 {
        if order.len() < 2 {
            return 0.0;
        }

        let open: f64 = order.windows(2).map(|w| self.get(w[0], w[1])).sum();

        open + self.get(order[order.len() - 1], order[0])
    }
}

impl SearchBudget {
    fn new(params: &TourParams) -> Self {
        Self {
            max_sweeps: params.max_sweeps,
            deadline: params
                .time_limit_s
                .and_then(|t| Duration::try_from_secs_f64(t).ok())
                .and_then(|limit| Instant::now().checked_add(limit)),
            sweeps: 0,
        }
    }

    /// Account for a new sweep, returning false if the budget is exhausted.
    fn start_sweep(&mut self) -> bool {
        if self.sweeps >= self.max_sweeps {
            return false;
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return false;
            }
        }

        self.sweeps += 1;
        true
    }
}

impl SegmentExchange {
    fn apply(&self, order: &mut [usize]) {
        let a = &order[self.i..self.j];
        let b = &order[self.j..self.k];

        let mut joined: Vec<usize> = Vec::with_capacity(self.k - self.i);
        match self.kind {
            ExchangeKind::Swap => {
                joined.extend(b.iter());
                joined.extend(a.iter());
            }
            ExchangeKind::SwapReverseFirst => {
                joined.extend(b.iter());
                joined.extend(a.iter().rev());
            }
            ExchangeKind::SwapReverseSecond => {
                joined.extend(b.iter().rev());
                joined.extend(a.iter());
            }
            ExchangeKind::ReverseBoth => {
                joined.extend(a.iter().rev());
                joined.extend(b.iter().rev());
            }
        }

        order[self.i..self.k].copy_from_slice(&joined);
    }
}

//! # Planning Errors

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors raised while planning a survey.
///
/// All of these are raised before the tour is optimised and indicate a problem with the request or
/// parameters, so retrying with the same inputs will always fail in the same way.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    #[error("Invalid survey polygon: {0}")]
    InvalidPolygon(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error(
        "No grid cell reaches the coverage threshold of {threshold} (tested {candidate_count} \
         candidates, best coverage was {best_coverage_ratio:.3}), enlarge the area, lower the \
         altitude or reduce the threshold"
    )]
    NoFeasibleGrid {
        threshold: f64,
        candidate_count: usize,
        best_coverage_ratio: f64,
    },
}

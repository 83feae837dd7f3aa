//! Cell boundaries for grid plots on logarithmic axes.

use super::{SweepError, SweepResult};

/// Turn N sample centers into N + 1 cell boundaries.
///
/// Each interior boundary is the geometric mean of its two neighbours, the
/// visual midpoint on a log axis. The outer boundaries extend past the first
/// and last centers by the ratio of the adjacent pair. Input may be ascending
/// or descending; the output follows the same direction.
pub fn centers_to_boundaries(centers: &[f64]) -> SweepResult<Vec<f64>> {
    let n = centers.len();
    if n < 2 {
        return Err(SweepError::Domain(format!(
            "need at least two centers to interpolate boundaries, got {}",
            n
        )));
    }
    if let Some(bad) = centers.iter().find(|c| !(c.is_finite() && **c > 0.0)) {
        return Err(SweepError::Domain(format!(
            "centers must be positive, got {}",
            bad
        )));
    }

    let interior: Vec<f64> = centers.windows(2).map(|w| (w[0] * w[1]).sqrt()).collect();
    let first = interior[0] / (centers[1] / centers[0]);
    let last = interior[n - 2] * (centers[n - 1] / centers[n - 2]);

    let mut boundaries = Vec::with_capacity(n + 1);
    boundaries.push(first);
    boundaries.extend(interior);
    boundaries.push(last);
    Ok(boundaries)
}

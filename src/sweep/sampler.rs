//! Log-spaced integer sampling of one parameter axis.

use super::{SweepError, SweepResult};

/// Choose integer parameter values between `start` and `stop`.
///
/// Takes `steps` log-uniformly spaced points (both endpoints included), rounds
/// each to the nearest integer (ties to even) and drops duplicates, so the
/// result can be shorter than `steps`. Values are returned largest first:
/// sweeps start with the most expensive setup, which shows early whether the
/// chosen range is practical.
///
/// Rounding never yields zero; values below one are clamped to one.
pub fn sample(start: f64, stop: f64, steps: usize) -> SweepResult<Vec<u64>> {
    let positive = |v: f64| v.is_finite() && v > 0.0;
    if !positive(start) || !positive(stop) {
        return Err(SweepError::InvalidParameter(format!(
            "start and stop must be positive, got {} and {}",
            start, stop
        )));
    }
    if steps == 0 {
        return Err(SweepError::InvalidParameter(
            "steps must be at least 1".to_string(),
        ));
    }

    let mut values: Vec<u64> = geomspace(start, stop, steps)
        .map(|v| v.round_ties_even().max(1.0) as u64)
        .collect();
    values.sort_unstable();
    values.dedup();
    values.reverse();
    Ok(values)
}

/// `steps` points spaced evenly on a log scale, endpoints exact.
fn geomspace(start: f64, stop: f64, steps: usize) -> impl Iterator<Item = f64> {
    let (log_start, log_stop) = (start.ln(), stop.ln());
    let last = steps.saturating_sub(1);
    (0..steps).map(move |i| {
        if i == 0 {
            start
        } else if i == last {
            stop
        } else {
            let t = i as f64 / last as f64;
            (log_start + (log_stop - log_start) * t).exp()
        }
    })
}

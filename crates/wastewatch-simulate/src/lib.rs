//! Monte-Carlo approximation of the forecast distribution.
//!
//! The damped, transformed smoothing model has no closed-form interval, so
//! the forecast distribution is approximated empirically: each sample path
//! re-runs the recurrence forward from the model's terminal state, injecting
//! an independent Gaussian innovation at every step so the level, trend, and
//! seasonal state diverge stochastically per path.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;
use tracing::debug;
use wastewatch_core::{Result, WastewatchError};
use wastewatch_models::SmoothingModel;

/// Draw `n_paths` independent sample paths of length `horizon`.
///
/// Paths are anchored at the model's terminal state. Each path gets its own
/// RNG seeded from `seed` plus the path index, so the result is identical
/// for a fixed seed regardless of how rayon schedules the paths.
pub fn simulate_paths(
    model: &SmoothingModel,
    horizon: usize,
    n_paths: usize,
    seed: u64,
) -> Result<Vec<Vec<f64>>> {
    if horizon == 0 || n_paths == 0 {
        return Err(WastewatchError::InvalidInput(
            "horizon and path count must be positive".into(),
        ));
    }

    let sigma = model.residual_variance().sqrt();
    let innovation = Normal::new(0.0, sigma).map_err(|e| {
        WastewatchError::InvalidInput(format!("invalid innovation distribution (sigma={sigma}): {e}"))
    })?;

    debug!(
        horizon = horizon,
        n_paths = n_paths,
        sigma = sigma,
        seed = seed,
        "simulating sample paths"
    );

    let anchor = model.n_observations();
    let paths: Vec<Vec<f64>> = (0..n_paths)
        .into_par_iter()
        .map(|path_index| {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(path_index as u64));
            let mut state = model.state().clone();
            let mut path = Vec::with_capacity(horizon);
            for h in 0..horizon {
                let t = anchor + h;
                let simulated = model.predict_next(&state, t) + innovation.sample(&mut rng);
                model.advance(&mut state, t, simulated);
                path.push(simulated);
            }
            path
        })
        .collect();

    Ok(paths)
}

/// Per-step interval bounds across paths.
///
/// At each of the horizon steps, independently, the `lower_q` and `upper_q`
/// linear-interpolation percentiles are taken across all paths. Bounds are
/// per-step: different paths may realize the extreme percentile at
/// different steps.
pub fn interval_bounds(
    paths: &[Vec<f64>],
    lower_q: f64,
    upper_q: f64,
) -> Result<(Vec<f64>, Vec<f64>)> {
    if paths.is_empty() {
        return Err(WastewatchError::InvalidInput(
            "at least one sample path is required".into(),
        ));
    }
    if !(0.0..=1.0).contains(&lower_q) || !(0.0..=1.0).contains(&upper_q) || lower_q >= upper_q {
        return Err(WastewatchError::InvalidInput(format!(
            "quantiles must satisfy 0 <= lower < upper <= 1, got ({lower_q}, {upper_q})"
        )));
    }
    let horizon = paths[0].len();
    if paths.iter().any(|p| p.len() != horizon) {
        return Err(WastewatchError::InvalidInput(
            "sample paths have unequal lengths".into(),
        ));
    }

    let mut lower = Vec::with_capacity(horizon);
    let mut upper = Vec::with_capacity(horizon);
    let mut column = vec![0.0; paths.len()];

    for h in 0..horizon {
        for (i, path) in paths.iter().enumerate() {
            column[i] = path[h];
        }
        column.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        lower.push(percentile(&column, lower_q));
        upper.push(percentile(&column, upper_q));
    }

    Ok((lower, upper))
}

/// Linear-interpolation percentile of pre-sorted values.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let rank = q * (sorted.len() - 1) as f64;
    let low = rank.floor() as usize;
    let high = rank.ceil() as usize;
    if low == high {
        sorted[low]
    } else {
        let weight = rank - low as f64;
        sorted[low] * (1.0 - weight) + sorted[high] * weight
    }
}

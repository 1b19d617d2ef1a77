//! Parameter estimation for the smoothing model.
//!
//! The smoothing weights, damping factor, and the full initial state (level,
//! trend, and all m pre-sample seasonal values) are estimated jointly by
//! minimizing the sum of squared one-step-ahead residuals. Joint estimation
//! is used because heuristic initialization is unstable on short series; the
//! heuristic only seeds the optimizer.

use tracing::{debug, warn};
use wastewatch_core::{FitStrategy, Result, WastewatchError};
use wastewatch_transform::BoxCox;

use crate::optimizer::{minimize, Bounds, MinimizeOptions};
use crate::smoothing::{run_filter, SmoothingModel, SmoothingParams, SmoothingState};

const SMOOTHING_MIN: f64 = 1e-4;
const SMOOTHING_MAX: f64 = 0.9999;
const PHI_MIN: f64 = 1e-4;
const PHI_MAX: f64 = 1.0;

/// Options for a fit, usually derived from the engine configuration.
#[derive(Debug, Clone)]
pub struct FitOptions {
    pub season_length: usize,
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            season_length: 52,
            max_iterations: 50_000,
            tolerance: 1e-6,
        }
    }
}

/// A fitted model together with the transform that was applied to the
/// training values, when one was. The model operates in transformed space;
/// callers invert forecasts and simulated paths through `transform`.
#[derive(Debug, Clone)]
pub struct FittedModel {
    pub model: SmoothingModel,
    pub transform: Option<BoxCox>,
}

/// Fit the smoothing model to training values.
///
/// Two-stage strategy: the primary configuration uses the Box-Cox transform
/// and a free damping factor; if it fails for any reason (transform
/// inapplicable, non-finite objective, optimizer non-convergence) a single
/// fallback retries without the transform and with damping disabled. A
/// fallback failure propagates. The surviving configuration is tagged on
/// the returned model.
pub fn fit(values: &[f64], options: &FitOptions) -> Result<FittedModel> {
    let m = options.season_length;
    if values.len() < 2 * m {
        return Err(WastewatchError::InsufficientData(format!(
            "seasonal fit requires at least two full cycles ({} points), got {}",
            2 * m,
            values.len()
        )));
    }

    match fit_primary(values, options) {
        Ok(fitted) => Ok(fitted),
        Err(e) => {
            warn!(error = %e, "primary fit failed, retrying with fallback configuration");
            let model = fit_configuration(values, options, FitStrategy::Fallback)?;
            Ok(FittedModel {
                model,
                transform: None,
            })
        }
    }
}

fn fit_primary(values: &[f64], options: &FitOptions) -> Result<FittedModel> {
    let transform = BoxCox::fit(values)?;
    let transformed = transform.apply_all(values);
    let model = fit_configuration(&transformed, options, FitStrategy::Primary)?;
    Ok(FittedModel {
        model,
        transform: Some(transform),
    })
}

/// Fit one configuration. `Primary` estimates the damping factor; `Fallback`
/// pins it at 1 (no damping) and drops it from the parameter vector.
fn fit_configuration(
    values: &[f64],
    options: &FitOptions,
    strategy: FitStrategy,
) -> Result<SmoothingModel> {
    let m = options.season_length;
    let damped = strategy == FitStrategy::Primary;

    let heuristic = heuristic_state(values, m);
    let (start, bounds) = build_search_space(values, &heuristic, damped);

    let objective = |raw: &[f64]| {
        let (params, initial) = unpack(raw, m, damped);
        let (_, residuals) = run_filter(&params, m, &initial, values);
        let sse: f64 = residuals.iter().map(|e| e * e).sum();
        if sse.is_finite() {
            sse
        } else {
            f64::MAX
        }
    };

    let minimize_options = MinimizeOptions {
        max_iterations: options.max_iterations,
        tolerance: options.tolerance,
    };
    let minimum = minimize(objective, &start, &bounds, &minimize_options);

    if !minimum.value.is_finite() {
        return Err(WastewatchError::FitConvergence(format!(
            "objective is non-finite at the optimizer's best point ({strategy:?})"
        )));
    }
    if !minimum.converged {
        return Err(WastewatchError::FitConvergence(format!(
            "optimizer did not converge within {} iterations ({strategy:?})",
            minimum.iterations
        )));
    }

    let (params, initial) = unpack(&minimum.point, m, damped);
    let (terminal, residuals) = run_filter(&params, m, &initial, values);
    let sse: f64 = residuals.iter().map(|e| e * e).sum();
    let variance = sample_variance(&residuals);
    if !variance.is_finite() {
        return Err(WastewatchError::FitConvergence(
            "residual variance is non-finite".into(),
        ));
    }

    debug!(
        strategy = ?strategy,
        alpha = params.alpha,
        beta = params.beta,
        gamma = params.gamma,
        phi = params.phi,
        sse = sse,
        residual_variance = variance,
        iterations = minimum.iterations,
        "smoothing fit complete"
    );

    Ok(SmoothingModel::from_parts(
        params,
        m,
        terminal,
        values.len(),
        sse,
        variance,
        strategy,
    ))
}

/// Heuristic starting state: level is the first-season mean, trend the
/// difference of the first two season means spread over one cycle, and the
/// seasonal values the first season's deviations from its mean. Requires
/// at least 2*m values, which `fit` guarantees.
fn heuristic_state(values: &[f64], m: usize) -> SmoothingState {
    let first: f64 = values[..m].iter().sum::<f64>() / m as f64;
    let second: f64 = values[m..2 * m].iter().sum::<f64>() / m as f64;
    SmoothingState {
        level: first,
        trend: (second - first) / m as f64,
        seasonal: values[..m].iter().map(|&v| v - first).collect(),
    }
}

/// Parameter vector layout: [alpha, beta, gamma, (phi,) level, trend,
/// seasonal_0 .. seasonal_{m-1}]. State coordinates get a data-driven box
/// of one value-range around the heuristic start.
fn build_search_space(
    values: &[f64],
    heuristic: &SmoothingState,
    damped: bool,
) -> (Vec<f64>, Bounds) {
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let half_width = (max - min).max(1.0);

    let mut start = vec![0.3, 0.05, 0.1];
    let mut lower = vec![SMOOTHING_MIN; 3];
    let mut upper = vec![SMOOTHING_MAX; 3];

    if damped {
        start.push(0.95);
        lower.push(PHI_MIN);
        upper.push(PHI_MAX);
    }

    let mut push_state = |center: f64| {
        start.push(center);
        lower.push(center - half_width);
        upper.push(center + half_width);
    };
    push_state(heuristic.level);
    push_state(heuristic.trend);
    for &s in &heuristic.seasonal {
        push_state(s);
    }

    (start, Bounds { lower, upper })
}

fn unpack(raw: &[f64], m: usize, damped: bool) -> (SmoothingParams, SmoothingState) {
    let mut idx = 0;
    let alpha = raw[idx];
    idx += 1;
    let beta = raw[idx];
    idx += 1;
    let gamma = raw[idx];
    idx += 1;
    let phi = if damped {
        let v = raw[idx];
        idx += 1;
        v
    } else {
        1.0
    };
    let level = raw[idx];
    idx += 1;
    let trend = raw[idx];
    idx += 1;
    let seasonal = raw[idx..idx + m].to_vec();

    (
        SmoothingParams {
            alpha,
            beta,
            gamma,
            phi,
        },
        SmoothingState {
            level,
            trend,
            seasonal,
        },
    )
}

fn sample_variance(residuals: &[f64]) -> f64 {
    let n = residuals.len();
    if n < 2 {
        return 0.0;
    }
    let mean = residuals.iter().sum::<f64>() / n as f64;
    residuals.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / (n - 1) as f64
}

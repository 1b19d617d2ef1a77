//! Damped, additive-trend, additive-seasonal exponential smoothing.
//!
//! One recurrence serves filtering (fitting), point forecasting, and
//! stochastic simulation. In innovation form, with level L, trend T,
//! seasonal array S of length m, and damping phi:
//!
//! ```text
//! y_hat_t = L_{t-1} + phi*T_{t-1} + S_{t-m}
//! L_t = alpha*(y_t - S_{t-m}) + (1-alpha)*(L_{t-1} + phi*T_{t-1})
//! T_t = beta*(L_t - L_{t-1}) + (1-beta)*phi*T_{t-1}
//! S_t = gamma*(y_t - L_t) + (1-gamma)*S_{t-m}
//! ```
//!
//! Rolling forward with y_t = y_hat_t (zero residual) reproduces the
//! closed-form damped forecast exactly; injecting Gaussian residuals gives
//! one stochastic sample path.

use wastewatch_core::FitStrategy;

/// Smoothing weights and the damping factor.
///
/// alpha, beta, gamma lie in (0, 1); phi lies in (0, 1], with phi = 1
/// meaning an undamped trend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingParams {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub phi: f64,
}

/// Level, trend, and the cyclic seasonal array.
///
/// `seasonal[t % m]` holds the most recent seasonal value for that cyclic
/// position; before filtering starts it holds the m pre-sample values.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingState {
    pub level: f64,
    pub trend: f64,
    pub seasonal: Vec<f64>,
}

/// One step of the recurrence at global time index `t`.
///
/// Returns the one-step-ahead prediction made before `y` is absorbed.
pub(crate) fn smoothing_step(
    params: &SmoothingParams,
    m: usize,
    state: &mut SmoothingState,
    t: usize,
    y: f64,
) -> f64 {
    let s_prev = state.seasonal[t % m];
    let damped_trend = params.phi * state.trend;
    let predicted = state.level + damped_trend + s_prev;

    let prev_level = state.level;
    state.level = params.alpha * (y - s_prev) + (1.0 - params.alpha) * (prev_level + damped_trend);
    state.trend = params.beta * (state.level - prev_level) + (1.0 - params.beta) * damped_trend;
    state.seasonal[t % m] = params.gamma * (y - state.level) + (1.0 - params.gamma) * s_prev;

    predicted
}

/// Filter the training values from an initial state.
///
/// Returns the terminal state and the one-step-ahead residuals.
pub(crate) fn run_filter(
    params: &SmoothingParams,
    m: usize,
    initial: &SmoothingState,
    values: &[f64],
) -> (SmoothingState, Vec<f64>) {
    let mut state = initial.clone();
    let mut residuals = Vec::with_capacity(values.len());

    for (t, &y) in values.iter().enumerate() {
        let predicted = smoothing_step(params, m, &mut state, t, y);
        residuals.push(y - predicted);
    }

    (state, residuals)
}

/// A fitted smoothing model: parameters, terminal state, and the in-sample
/// quantities needed for forecasting and simulation. Immutable once built.
#[derive(Debug, Clone)]
pub struct SmoothingModel {
    params: SmoothingParams,
    season_length: usize,
    state: SmoothingState,
    n_observations: usize,
    sse: f64,
    residual_variance: f64,
    strategy: FitStrategy,
}

impl SmoothingModel {
    /// Assemble a fitted model from its components.
    pub fn from_parts(
        params: SmoothingParams,
        season_length: usize,
        state: SmoothingState,
        n_observations: usize,
        sse: f64,
        residual_variance: f64,
        strategy: FitStrategy,
    ) -> Self {
        debug_assert_eq!(state.seasonal.len(), season_length);
        Self {
            params,
            season_length,
            state,
            n_observations,
            sse,
            residual_variance,
            strategy,
        }
    }

    pub fn params(&self) -> &SmoothingParams {
        &self.params
    }

    pub fn season_length(&self) -> usize {
        self.season_length
    }

    /// Terminal state after absorbing the last training observation.
    pub fn state(&self) -> &SmoothingState {
        &self.state
    }

    /// Number of training observations filtered.
    pub fn n_observations(&self) -> usize {
        self.n_observations
    }

    pub fn sse(&self) -> f64 {
        self.sse
    }

    /// Sample variance of the in-sample one-step-ahead residuals.
    pub fn residual_variance(&self) -> f64 {
        self.residual_variance
    }

    pub fn strategy(&self) -> FitStrategy {
        self.strategy
    }

    /// One-step-ahead prediction from `state` at global time `t`, without
    /// advancing the state.
    pub fn predict_next(&self, state: &SmoothingState, t: usize) -> f64 {
        state.level + self.params.phi * state.trend + state.seasonal[t % self.season_length]
    }

    /// Advance `state` by one step at global time `t` with observation `y`.
    /// Returns the prediction made before `y` was absorbed.
    pub fn advance(&self, state: &mut SmoothingState, t: usize, y: f64) -> f64 {
        smoothing_step(&self.params, self.season_length, state, t, y)
    }

    /// Point forecast over `horizon` future steps.
    ///
    /// The trend contribution at step h is (phi + phi^2 + ... + phi^h) times
    /// the terminal trend, so a damped trend flattens geometrically instead
    /// of compounding linearly.
    pub fn forecast(&self, horizon: usize) -> Vec<f64> {
        let m = self.season_length;
        let n = self.n_observations;
        let phi = self.params.phi;

        let mut points = Vec::with_capacity(horizon);
        for h in 1..=horizon {
            let phi_sum = if (phi - 1.0).abs() < 1e-12 {
                h as f64
            } else {
                phi * (1.0 - phi.powi(h as i32)) / (1.0 - phi)
            };
            let seasonal = self.state.seasonal[(n + h - 1) % m];
            points.push(self.state.level + phi_sum * self.state.trend + seasonal);
        }
        points
    }
}

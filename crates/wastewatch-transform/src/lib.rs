//! Box-Cox power transform for variance stabilization of a positive series.
//!
//! The transform parameter lambda is estimated by maximizing the profile
//! log-likelihood over a bounded grid, then applied before modeling and
//! inverted after forecasting.

use tracing::debug;
use wastewatch_core::{Result, WastewatchError};

/// A fitted Box-Cox transform.
///
/// `apply` computes `(y^lambda - 1) / lambda` (natural log when lambda is
/// near zero); `invert` is the exact inverse. Only defined for y > 0.
#[derive(Debug, Clone)]
pub struct BoxCox {
    lambda: f64,
}

impl BoxCox {
    /// Below this magnitude, lambda is treated as the log transform.
    const LOG_EPSILON: f64 = 1e-10;

    const GRID_MIN: f64 = -2.0;
    const GRID_MAX: f64 = 2.0;
    const GRID_STEP: f64 = 0.01;

    /// Estimate lambda from training values by profile likelihood.
    ///
    /// Returns `Transform` if any value is non-positive, since the power
    /// transform is only defined on a strictly positive series.
    pub fn fit(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(WastewatchError::InsufficientData(
                "cannot fit a transform on an empty series".into(),
            ));
        }
        if let Some(v) = values.iter().find(|v| **v <= 0.0) {
            return Err(WastewatchError::Transform(format!(
                "series contains a non-positive value ({v}); power transform requires y > 0"
            )));
        }

        let n = values.len() as f64;
        let log_sum: f64 = values.iter().map(|v| v.ln()).sum();

        let mut best_lambda = 1.0;
        let mut best_ll = f64::NEG_INFINITY;

        let steps = ((Self::GRID_MAX - Self::GRID_MIN) / Self::GRID_STEP).round() as usize;
        for i in 0..=steps {
            let lambda = Self::GRID_MIN + i as f64 * Self::GRID_STEP;
            let candidate = Self { lambda };

            let transformed: Vec<f64> = values.iter().map(|&v| candidate.apply(v)).collect();
            let mean = transformed.iter().sum::<f64>() / n;
            let variance = transformed.iter().map(|z| (z - mean).powi(2)).sum::<f64>() / n;

            // Profile log-likelihood of the Gaussian model under this lambda.
            let ll = -0.5 * n * variance.max(1e-300).ln() + (lambda - 1.0) * log_sum;
            if ll > best_ll {
                best_ll = ll;
                best_lambda = lambda;
            }
        }

        debug!(
            lambda = best_lambda,
            log_likelihood = best_ll,
            n = values.len(),
            "Box-Cox lambda estimated"
        );

        Ok(Self {
            lambda: best_lambda,
        })
    }

    /// Build a transform with a known lambda.
    pub fn with_lambda(lambda: f64) -> Self {
        Self { lambda }
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    pub fn apply(&self, value: f64) -> f64 {
        if self.lambda.abs() < Self::LOG_EPSILON {
            value.ln()
        } else {
            (value.powf(self.lambda) - 1.0) / self.lambda
        }
    }

    pub fn invert(&self, value: f64) -> f64 {
        if self.lambda.abs() < Self::LOG_EPSILON {
            value.exp()
        } else {
            // Simulated paths can wander below the transform's range edge;
            // clamp the base so the inverse stays defined.
            let base = (value * self.lambda + 1.0).max(1e-12);
            base.powf(1.0 / self.lambda)
        }
    }

    pub fn apply_all(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.apply(v)).collect()
    }

    pub fn invert_all(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.invert(v)).collect()
    }
}

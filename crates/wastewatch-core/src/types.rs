use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Result, WastewatchError};

/// Which fitting configuration produced a forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitStrategy {
    /// Box-Cox transform with damped trend.
    Primary,
    /// No transform, damping disabled.
    Fallback,
}

/// An ordered, gap-free, regularly spaced time series of index values.
///
/// Invariants held after construction: dates strictly increasing, one value
/// per date, all values finite, constant spacing between consecutive dates
/// (7 days for the weekly wastewater series).
#[derive(Debug, Clone)]
pub struct TimeSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
    step_days: i64,
}

impl TimeSeries {
    /// Build a series from already-clean parallel vectors.
    ///
    /// The spacing between the first two dates defines the step; every
    /// subsequent gap must match it exactly.
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(WastewatchError::InvalidInput(
                "dates and values must have the same length".into(),
            ));
        }
        if dates.len() < 2 {
            return Err(WastewatchError::InsufficientData(
                "at least two observations are required to infer a sampling step".into(),
            ));
        }
        if let Some(v) = values.iter().find(|v| !v.is_finite()) {
            return Err(WastewatchError::InvalidInput(format!(
                "non-finite value in series: {v}"
            )));
        }

        let step_days = dates[1].signed_duration_since(dates[0]).num_days();
        if step_days <= 0 {
            return Err(WastewatchError::InvalidInput(
                "dates must be strictly increasing".into(),
            ));
        }
        for w in dates.windows(2) {
            let gap = w[1].signed_duration_since(w[0]).num_days();
            if gap != step_days {
                return Err(WastewatchError::InvalidInput(format!(
                    "irregular spacing: expected {step_days} days between observations, found {gap} ({} to {})",
                    w[0], w[1]
                )));
            }
        }

        Ok(Self {
            dates,
            values,
            step_days,
        })
    }

    /// Build a series from raw (date, value) observations.
    ///
    /// Non-finite values are dropped, observations are sorted by date, and
    /// duplicate dates are collapsed keeping the first occurrence.
    pub fn from_observations(mut observations: Vec<(NaiveDate, f64)>) -> Result<Self> {
        observations.retain(|(_, v)| v.is_finite());
        // Stable sort, so the first occurrence in input order survives dedup.
        observations.sort_by_key(|(d, _)| *d);
        observations.dedup_by_key(|(d, _)| *d);

        let (dates, values) = observations.into_iter().unzip();
        Self::new(dates, values)
    }

    /// The training partition: all observations dated on or before `cutoff`.
    /// Without a cutoff the whole series is training data.
    pub fn train_until(&self, cutoff: Option<NaiveDate>) -> Result<TimeSeries> {
        let end = match cutoff {
            Some(c) => self.dates.partition_point(|d| *d <= c),
            None => self.dates.len(),
        };
        if end < 2 {
            return Err(WastewatchError::InsufficientData(format!(
                "fewer than two observations on or before cutoff {:?}",
                cutoff
            )));
        }
        Ok(Self {
            dates: self.dates[..end].to_vec(),
            values: self.values[..end].to_vec(),
            step_days: self.step_days,
        })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Inferred spacing between consecutive observations, in days.
    pub fn step_days(&self) -> i64 {
        self.step_days
    }

    pub fn last_date(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }
}

/// One future step of a forecast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastStep {
    pub date: NaiveDate,
    /// Point estimate.
    pub point: f64,
    /// Lower bound of the 50% interval (25th percentile across paths).
    pub lower: f64,
    /// Upper bound of the 50% interval (75th percentile across paths).
    pub upper: f64,
}

/// A complete forecast: one entry per future step, in date order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast {
    pub steps: Vec<ForecastStep>,
    /// Last date of the training data the forecast is anchored on.
    pub cutoff: NaiveDate,
    /// Which fitting configuration succeeded.
    pub strategy: FitStrategy,
}

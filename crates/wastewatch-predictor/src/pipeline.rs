use chrono::{Duration, NaiveDate};
use tracing::info;
use wastewatch_core::{EngineConfig, Forecast, ForecastStep, Result, TimeSeries};
use wastewatch_models::fitter::{fit, FitOptions};
use wastewatch_simulate::{interval_bounds, simulate_paths};

/// Produce a forecast from a historical series.
///
/// Pipeline: train split -> two-stage fit (transform + damped, with the
/// documented fallback) -> point forecast -> Monte-Carlo simulation ->
/// inverse transform -> per-step interval percentiles -> future dates.
///
/// `cutoff` restricts training to observations on or before that date; the
/// returned forecast echoes the actual last training date. Stateless: each
/// call fits from scratch and retains nothing.
pub fn produce_forecast(
    series: &TimeSeries,
    cutoff: Option<NaiveDate>,
    config: &EngineConfig,
) -> Result<Forecast> {
    let train = series.train_until(cutoff)?;

    info!(
        observations = train.len(),
        last_date = %train.last_date(),
        horizon = config.horizon,
        "starting forecast"
    );

    let fit_options = FitOptions {
        season_length: config.season_length,
        max_iterations: config.max_optimizer_iterations,
        tolerance: config.optimizer_tolerance,
    };
    let fitted = fit(train.values(), &fit_options)?;

    let point_transformed = fitted.model.forecast(config.horizon);

    let seed = config.simulation_seed.unwrap_or_else(rand::random);
    let paths_transformed = simulate_paths(
        &fitted.model,
        config.horizon,
        config.simulation_paths,
        seed,
    )?;

    // Back to original units before the percentiles are taken.
    let (point, paths) = match &fitted.transform {
        Some(transform) => (
            transform.invert_all(&point_transformed),
            paths_transformed
                .iter()
                .map(|p| transform.invert_all(p))
                .collect(),
        ),
        None => (point_transformed, paths_transformed),
    };

    let (lower, upper) = interval_bounds(&paths, config.lower_quantile, config.upper_quantile)?;

    let last_date = train.last_date();
    let step_days = train.step_days();
    let steps = point
        .into_iter()
        .zip(lower)
        .zip(upper)
        .enumerate()
        .map(|(h, ((point, lower), upper))| ForecastStep {
            date: last_date + Duration::days(step_days * (h as i64 + 1)),
            point,
            lower,
            upper,
        })
        .collect();

    let forecast = Forecast {
        steps,
        cutoff: last_date,
        strategy: fitted.model.strategy(),
    };

    info!(
        strategy = ?forecast.strategy,
        steps = forecast.steps.len(),
        cutoff = %forecast.cutoff,
        "forecast complete"
    );

    Ok(forecast)
}

/// `produce_forecast` with the default engine configuration (52-week season
/// and horizon, 500 simulation paths, 50% interval).
pub fn produce_forecast_with_defaults(
    series: &TimeSeries,
    cutoff: Option<NaiveDate>,
) -> Result<Forecast> {
    produce_forecast(series, cutoff, &EngineConfig::default())
}

#[cfg(test)]
mod tests;

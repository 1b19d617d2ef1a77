use super::*;
use wastewatch_core::FitStrategy;

fn d(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn weekly_series(values: Vec<f64>) -> TimeSeries {
    let dates = (0..values.len())
        .map(|i| d(2023, 1, 7) + Duration::days(7 * i as i64))
        .collect();
    TimeSeries::new(dates, values).unwrap()
}

fn seasonal_values(n: usize, m: usize, base: f64, amplitude: f64) -> Vec<f64> {
    (0..n)
        .map(|i| base + amplitude * (2.0 * std::f64::consts::PI * i as f64 / m as f64).sin())
        .collect()
}

fn small_config() -> EngineConfig {
    EngineConfig {
        season_length: 4,
        horizon: 8,
        simulation_paths: 50,
        simulation_seed: Some(1),
        ..EngineConfig::default()
    }
}

#[test]
fn test_forecast_shape_and_dates() {
    let series = weekly_series(seasonal_values(40, 4, 12.0, 3.0));
    let forecast = produce_forecast(&series, None, &small_config()).unwrap();

    assert_eq!(forecast.steps.len(), 8);
    assert_eq!(forecast.cutoff, series.last_date());

    // Future dates continue weekly from the last training date.
    for (h, step) in forecast.steps.iter().enumerate() {
        let expected = series.last_date() + Duration::days(7 * (h as i64 + 1));
        assert_eq!(step.date, expected);
    }
}

#[test]
fn test_bounds_bracket_each_step() {
    let series = weekly_series(seasonal_values(60, 4, 12.0, 3.0));
    let forecast = produce_forecast(&series, None, &small_config()).unwrap();
    for step in &forecast.steps {
        assert!(
            step.lower <= step.upper,
            "{}: lower {} > upper {}",
            step.date,
            step.lower,
            step.upper
        );
    }
}

#[test]
fn test_cutoff_restricts_training() {
    let series = weekly_series(seasonal_values(60, 4, 12.0, 3.0));
    let cutoff = series.dates()[39];
    let forecast = produce_forecast(&series, Some(cutoff), &small_config()).unwrap();

    // The echoed cutoff is the actual last training date.
    assert_eq!(forecast.cutoff, cutoff);
    assert_eq!(
        forecast.steps[0].date,
        cutoff + Duration::days(7)
    );
}

#[test]
fn test_short_series_rejected() {
    // 2 * 4 - 1 = 7 observations: below the identifiability threshold.
    let series = weekly_series(seasonal_values(7, 4, 12.0, 3.0));
    assert!(produce_forecast(&series, None, &small_config()).is_err());
}

#[test]
fn test_deterministic_with_fixed_seed() {
    let series = weekly_series(seasonal_values(48, 4, 12.0, 3.0));
    let config = small_config();

    let a = produce_forecast(&series, None, &config).unwrap();
    let b = produce_forecast(&series, None, &config).unwrap();

    assert_eq!(a.strategy, b.strategy);
    for (x, y) in a.steps.iter().zip(b.steps.iter()) {
        assert_eq!(x.date, y.date);
        assert_eq!(x.point, y.point);
        assert_eq!(x.lower, y.lower);
        assert_eq!(x.upper, y.upper);
    }
}

#[test]
fn test_fallback_strategy_is_visible() {
    // Values dip below zero, so the transform is inapplicable and the
    // fallback configuration must be reported.
    let series = weekly_series(seasonal_values(48, 4, 1.0, 3.0));
    let forecast = produce_forecast(&series, None, &small_config()).unwrap();
    assert_eq!(forecast.strategy, FitStrategy::Fallback);
}

#[test]
fn test_primary_strategy_on_positive_series() {
    let series = weekly_series(seasonal_values(48, 4, 12.0, 3.0));
    let forecast = produce_forecast(&series, None, &small_config()).unwrap();
    assert_eq!(forecast.strategy, FitStrategy::Primary);
}

use assert_approx_eq::assert_approx_eq;
use chrono::{Days, NaiveDate};
use pretty_assertions::assert_eq;
use stock_forecast::config::AnalysisConfig;
use stock_forecast::data::SanitizedSeries;
use stock_forecast::error::AnalysisError;
use stock_forecast::forecast::{ConfidenceBucket, ForecastEngine, ForecastMethod};

fn series_of(values: Vec<f64>) -> SanitizedSeries {
    let start = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
    let points: Vec<_> = values
        .into_iter()
        .enumerate()
        .map(|(i, v)| (start + Days::new(i as u64), Some(v)))
        .collect();
    SanitizedSeries::from_points(&points).unwrap()
}

fn weekly_series(n: usize) -> SanitizedSeries {
    let values: Vec<f64> = (0..n)
        .map(|i| {
            let trend = 800.0 + 0.9 * i as f64;
            let weekly = 5.0 * ((i % 5) as f64 / 5.0 * std::f64::consts::TAU).cos();
            trend + weekly
        })
        .collect();
    series_of(values)
}

fn engine() -> ForecastEngine {
    ForecastEngine::new(AnalysisConfig::default())
}

#[test]
fn below_minimum_data_the_engine_does_not_run() {
    let series = series_of((0..25).map(|i| 100.0 + i as f64).collect());
    match engine().run(&series) {
        Err(AnalysisError::InsufficientData { required, actual }) => {
            assert_eq!(required, 30);
            assert_eq!(actual, 25);
        }
        other => panic!("expected InsufficientData, got {other:?}"),
    }
}

#[test]
fn constant_series_falls_back_to_trailing_average() {
    let series = series_of(vec![100.0; 40]);
    let outcome = engine().run(&series).unwrap();

    match &outcome.method {
        ForecastMethod::TrailingAverage { reason } => {
            assert!(reason.contains("insufficient variation"), "got: {reason}")
        }
        other => panic!("expected fallback, got {other:?}"),
    }

    assert_eq!(outcome.forecast.predicted, vec![100.0; 30]);
    assert_eq!(outcome.forecast.lower, vec![95.0; 30]);
    assert_eq!(outcome.forecast.upper, vec![105.0; 30]);

    // Flat fallback: no change, 10%-wide band at the last step
    assert_approx_eq!(outcome.summary.pct_change, 0.0, 1e-12);
    assert_approx_eq!(outcome.summary.confidence_width, 10.0, 1e-12);
    assert_eq!(outcome.summary.confidence, ConfidenceBucket::Medium);
}

#[test]
fn forecast_dates_are_consecutive_calendar_days() {
    let series = weekly_series(90);
    let outcome = engine().run(&series).unwrap();

    let last_observed = series.last_date();
    assert_eq!(outcome.forecast.dates.len(), 30);
    assert_eq!(outcome.forecast.dates[0], last_observed + Days::new(1));
    for pair in outcome.forecast.dates.windows(2) {
        assert_eq!(pair[1], pair[0] + Days::new(1));
    }
}

#[test]
fn primary_path_produces_ordered_bounds() {
    let series = weekly_series(120);
    let outcome = engine().run(&series).unwrap();

    assert_eq!(outcome.method, ForecastMethod::Sarima);
    assert!(!outcome.method.is_fallback());
    assert_eq!(outcome.forecast.len(), 30);

    for i in 0..30 {
        assert!(outcome.forecast.lower[i] <= outcome.forecast.predicted[i]);
        assert!(outcome.forecast.predicted[i] <= outcome.forecast.upper[i]);
    }
}

#[test]
fn forty_five_points_is_enough_to_forecast() {
    let series = weekly_series(45);
    let outcome = engine().run(&series).unwrap();
    assert_eq!(outcome.forecast.len(), 30);
}

#[test]
fn engine_is_idempotent() {
    let series = weekly_series(100);
    let first = engine().run(&series).unwrap();
    let second = engine().run(&series).unwrap();
    assert_eq!(first, second);
}

#[test]
fn honors_configured_horizon() {
    let config = AnalysisConfig {
        forecast_horizon: 7,
        ..AnalysisConfig::default()
    };
    let outcome = ForecastEngine::new(config)
        .run(&weekly_series(80))
        .unwrap();
    assert_eq!(outcome.forecast.len(), 7);
    assert_eq!(outcome.forecast.dates.len(), 7);
}

#[test]
fn summary_change_matches_final_forecast_point() {
    let series = weekly_series(120);
    let outcome = engine().run(&series).unwrap();

    let last_close = series.last_value();
    let last_predicted = *outcome.forecast.predicted.last().unwrap();
    let expected = (last_predicted - last_close) / last_close * 100.0;
    assert_approx_eq!(outcome.summary.pct_change, expected, 1e-12);
}

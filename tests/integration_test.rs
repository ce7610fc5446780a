use chrono::{Days, NaiveDate};
use stock_forecast::config::AnalysisConfig;
use stock_forecast::error::{AnalysisError, AnalysisFault};
use stock_forecast::forecast::ForecastMethod;
use stock_forecast::pipeline::{analyze_symbol, run_analysis};
use stock_forecast::source::StaticSource;

fn day(i: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 2).unwrap() + Days::new(i)
}

fn market_points(n: usize) -> Vec<(NaiveDate, Option<f64>)> {
    (0..n)
        .map(|i| {
            let trend = 1450.0 + 1.1 * i as f64;
            let weekly = 8.0 * ((i % 5) as f64 / 5.0 * std::f64::consts::TAU).sin();
            let monthly = 20.0 * ((i % 30) as f64 / 30.0 * std::f64::consts::TAU).cos();
            (day(i as u64), Some(trend + weekly + monthly))
        })
        .collect()
}

fn source_with(n: usize) -> StaticSource {
    StaticSource::new().with_series("INFY.NS", market_points(n))
}

#[test]
fn full_run_produces_all_sections() {
    let source = source_with(180);
    let config = AnalysisConfig::default();

    let report = run_analysis(&source, "Infosys", day(0), day(365), &config).unwrap();

    assert_eq!(report.company, "Infosys");
    assert_eq!(report.symbol, "INFY.NS");
    assert_eq!(report.series.len(), 180);
    assert_eq!(report.overview.days_analyzed, 180);
    assert!(report.overview.total_return_pct > 0.0);

    let decomposition = report.decomposition.as_ref().unwrap();
    assert_eq!(decomposition.observed.len(), 180);
    assert_eq!(decomposition.period, 30);

    let outcome = report.forecast.as_ref().unwrap();
    assert_eq!(outcome.forecast.len(), 30);
    assert_eq!(outcome.forecast.dates[0], day(179) + Days::new(1));
}

#[test]
fn forty_five_points_skips_decomposition_but_forecasts() {
    let source = source_with(45);
    let config = AnalysisConfig::default();

    let report = run_analysis(&source, "Infosys", day(0), day(365), &config).unwrap();

    assert_eq!(
        report.decomposition.as_ref().unwrap_err(),
        &AnalysisFault::InsufficientData {
            required: 60,
            actual: 45
        }
    );
    assert!(report.forecast.is_ok());
}

#[test]
fn twenty_five_points_skips_the_forecast_too() {
    let source = source_with(25);
    let config = AnalysisConfig::default();

    let report = run_analysis(&source, "Infosys", day(0), day(365), &config).unwrap();

    assert!(matches!(
        report.decomposition,
        Err(AnalysisFault::InsufficientData { .. })
    ));
    assert_eq!(
        report.forecast.as_ref().unwrap_err(),
        &AnalysisFault::InsufficientData {
            required: 30,
            actual: 25
        }
    );
}

#[test]
fn empty_provider_result_is_terminal() {
    let source = StaticSource::new();
    let config = AnalysisConfig::default();

    assert!(matches!(
        run_analysis(&source, "Infosys", day(0), day(10), &config),
        Err(AnalysisError::EmptyOrMissingData)
    ));
}

#[test]
fn all_missing_closes_is_terminal() {
    let points: Vec<_> = (0..20).map(|i| (day(i), None)).collect();
    let source = StaticSource::new().with_series("INFY.NS", points);
    let config = AnalysisConfig::default();

    assert!(matches!(
        run_analysis(&source, "Infosys", day(0), day(30), &config),
        Err(AnalysisError::EmptySeries)
    ));
}

#[test]
fn unknown_company_is_rejected() {
    let source = source_with(100);
    let config = AnalysisConfig::default();

    assert!(matches!(
        run_analysis(&source, "Enron", day(0), day(365), &config),
        Err(AnalysisError::DataError(_))
    ));
}

#[test]
fn analyze_symbol_bypasses_the_company_map() {
    let source = StaticSource::new().with_series("CUSTOM.NS", market_points(90));
    let config = AnalysisConfig::default();

    let report = analyze_symbol(&source, "CUSTOM.NS", day(0), day(365), &config).unwrap();
    assert_eq!(report.symbol, "CUSTOM.NS");
    assert!(report.decomposition.is_ok());
}

#[test]
fn shifted_series_keeps_display_price_unshifted() {
    // A series dipping below zero forces the positivity shift; the overview
    // must still report the provider's own last close
    let points: Vec<_> = (0..70)
        .map(|i| (day(i as u64), Some(-5.0 + 0.4 * i as f64)))
        .collect();
    let last_close = points.last().unwrap().1.unwrap();
    let source = StaticSource::new().with_series("INFY.NS", points);
    let config = AnalysisConfig::default();

    let report = run_analysis(&source, "Infosys", day(0), day(365), &config).unwrap();

    assert!(report.series.shift() > 0.0);
    assert!((report.overview.current_price - last_close).abs() < 1e-9);
    assert!(report.series.values().iter().all(|v| *v > 0.0));
}

#[test]
fn degraded_runs_warn_under_an_active_subscriber() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();

    // Both warning paths with a collector installed: the skipped sections of a
    // short series and the model-fit fallback of a constant one
    let config = AnalysisConfig::default();
    let short = source_with(25);
    let report = run_analysis(&short, "Infosys", day(0), day(365), &config).unwrap();
    assert!(report.decomposition.is_err());
    assert!(report.forecast.is_err());

    let flat: Vec<_> = (0..40).map(|i| (day(i), Some(180.0))).collect();
    let source = StaticSource::new().with_series("INFY.NS", flat);
    let report = run_analysis(&source, "Infosys", day(0), day(365), &config).unwrap();
    assert!(report.forecast.as_ref().unwrap().method.is_fallback());
}

#[test]
fn fallback_is_visible_at_the_report_boundary() {
    let points: Vec<_> = (0..40).map(|i| (day(i), Some(250.0))).collect();
    let source = StaticSource::new().with_series("INFY.NS", points);
    let config = AnalysisConfig::default();

    let report = run_analysis(&source, "Infosys", day(0), day(365), &config).unwrap();
    let outcome = report.forecast.as_ref().unwrap();

    assert!(outcome.method.is_fallback());
    if let ForecastMethod::TrailingAverage { reason } = &outcome.method {
        assert!(!reason.is_empty());
    }
}

#[test]
fn report_serializes_for_the_presentation_layer() {
    let source = source_with(120);
    let config = AnalysisConfig::default();

    let report = run_analysis(&source, "Infosys", day(0), day(365), &config).unwrap();
    let json = serde_json::to_string(&report).unwrap();

    let parsed: stock_forecast::AnalysisReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.symbol, report.symbol);
    assert_eq!(parsed.series.values(), report.series.values());
    assert_eq!(
        parsed.forecast.as_ref().unwrap().forecast.predicted,
        report.forecast.as_ref().unwrap().forecast.predicted
    );
}

#[test]
fn reruns_are_bit_identical() {
    let source = source_with(150);
    let config = AnalysisConfig::default();

    let first = run_analysis(&source, "Infosys", day(0), day(365), &config).unwrap();
    let second = run_analysis(&source, "Infosys", day(0), day(365), &config).unwrap();

    assert_eq!(first.series, second.series);
    assert_eq!(first.decomposition, second.decomposition);
    assert_eq!(first.forecast, second.forecast);
}

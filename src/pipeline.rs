//! The analysis pipeline: fetch, sanitize, decompose, forecast
//!
//! One user interaction maps to one [`run_analysis`] call. The pipeline is
//! synchronous and stateless: every run fetches and recomputes from scratch,
//! and the decomposition and forecast stages are independent, read-only
//! consumers of the same sanitized series. Data-availability failures are
//! terminal for their own section only and are recorded in the report rather
//! than propagated.

use crate::config::{self, AnalysisConfig};
use crate::data::{PriceTable, SanitizedSeries};
use crate::decompose::{decompose, Decomposition};
use crate::error::{AnalysisError, AnalysisFault, Result};
use crate::forecast::{ForecastEngine, ForecastOutcome};
use crate::source::MarketDataSource;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Headline metrics over the observed range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesOverview {
    /// Latest close as the provider reported it (positivity shift reversed)
    pub current_price: f64,
    /// Percent change from the first to the last observed close
    pub total_return_pct: f64,
    /// Mean traded volume, when the table carries a volume column
    pub average_volume: Option<f64>,
    /// Number of trading days in the sanitized series
    pub days_analyzed: usize,
}

/// Everything one analysis run hands to the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub company: String,
    pub symbol: String,
    pub series: SanitizedSeries,
    pub overview: SeriesOverview,
    /// Decomposition, or why the section was skipped
    pub decomposition: std::result::Result<Decomposition, AnalysisFault>,
    /// Forecast, or why the section was skipped
    pub forecast: std::result::Result<ForecastOutcome, AnalysisFault>,
}

/// Run the full pipeline for a company from the fixed dashboard list.
///
/// Fails outright only when no usable series exists at all (empty provider
/// result, nothing left after sanitization, unknown company). Per-section
/// insufficient-data failures are logged and stored in the report.
pub fn run_analysis(
    source: &dyn MarketDataSource,
    company: &str,
    start: NaiveDate,
    end: NaiveDate,
    config: &AnalysisConfig,
) -> Result<AnalysisReport> {
    let symbol = config::ticker_for(company).ok_or_else(|| {
        AnalysisError::DataError(format!("'{}' is not a known company", company))
    })?;

    let report = analyze_symbol(source, symbol, start, end, config)?;
    Ok(AnalysisReport {
        company: company.to_string(),
        ..report
    })
}

/// Run the full pipeline for an explicit ticker symbol.
pub fn analyze_symbol(
    source: &dyn MarketDataSource,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
    config: &AnalysisConfig,
) -> Result<AnalysisReport> {
    let table = source.fetch_daily(symbol, start, end)?;
    if table.is_empty() {
        return Err(AnalysisError::EmptyOrMissingData);
    }

    let series = SanitizedSeries::from_points(&table.close_points()?)?;
    let overview = overview(&table, &series);

    let decomposition = decompose(&series, config.decomposition_period).map_err(|err| {
        warn!(symbol, %err, "skipping decomposition");
        AnalysisFault::from(&err)
    });

    let forecast = ForecastEngine::new(config.clone())
        .run(&series)
        .map_err(|err| {
            warn!(symbol, %err, "skipping forecast");
            AnalysisFault::from(&err)
        });

    Ok(AnalysisReport {
        company: symbol.to_string(),
        symbol: symbol.to_string(),
        series,
        overview,
        decomposition,
        forecast,
    })
}

fn overview(table: &PriceTable, series: &SanitizedSeries) -> SeriesOverview {
    let originals = series.original_values();
    let first = originals[0];
    let last = originals[originals.len() - 1];
    let total_return_pct = if first != 0.0 {
        (last - first) / first * 100.0
    } else {
        0.0
    };

    SeriesOverview {
        current_price: last,
        total_return_pct,
        average_volume: table.average_volume(),
        days_analyzed: series.len(),
    }
}

//! Forecast engine: SARIMA primary path with a trailing-average fallback
//!
//! The engine never surfaces a model-fit failure. Any error from the SARIMA
//! fit, whatever its cause, switches the run to the trailing-average model and
//! tags the outcome so callers can tell a degraded forecast from a fitted one.

use crate::config::AnalysisConfig;
use crate::data::SanitizedSeries;
use crate::error::{AnalysisError, Result};
use crate::models::sarima::SarimaModel;
use crate::models::trailing_average::TrailingAverage;
use crate::models::{ForecastModel, ModelForecast, TrainedForecastModel};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Dated forecast with confidence bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// Future calendar dates, starting the day after the last observed date
    pub dates: Vec<NaiveDate>,
    /// Point forecast per step
    pub predicted: Vec<f64>,
    /// Lower confidence bound per step
    pub lower: Vec<f64>,
    /// Upper confidence bound per step
    pub upper: Vec<f64>,
}

impl Forecast {
    /// Number of forecast steps
    pub fn len(&self) -> usize {
        self.predicted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicted.is_empty()
    }
}

/// Which path produced the forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ForecastMethod {
    /// The SARIMA fit succeeded
    Sarima,
    /// The SARIMA fit failed and the trailing-average fallback ran instead
    TrailingAverage {
        /// The fit failure that triggered the fallback
        reason: String,
    },
}

impl ForecastMethod {
    /// Whether this outcome is the degraded fallback path
    pub fn is_fallback(&self) -> bool {
        matches!(self, ForecastMethod::TrailingAverage { .. })
    }
}

/// How tight the forecast interval is at the end of the horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceBucket {
    High,
    Medium,
    Low,
}

/// Summary values derived from the forecast for presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSummary {
    /// Percent change of the final forecast point versus the last observed close
    pub pct_change: f64,
    /// Final-step interval width as a percent of the final forecast point
    pub confidence_width: f64,
    /// `confidence_width` bucketed against the configured thresholds
    pub confidence: ConfidenceBucket,
}

/// A complete forecast run: the forecast, which path produced it, and summary stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastOutcome {
    pub forecast: Forecast,
    pub method: ForecastMethod,
    pub summary: ForecastSummary,
}

/// Runs the primary/fallback forecast pair for a configured horizon
#[derive(Debug, Clone)]
pub struct ForecastEngine {
    config: AnalysisConfig,
}

impl ForecastEngine {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Forecast `config.forecast_horizon` calendar days past the series end.
    ///
    /// Fails only on the minimum-data precondition; every model-fit error is
    /// recovered internally via the fallback path.
    pub fn run(&self, series: &SanitizedSeries) -> Result<ForecastOutcome> {
        if series.len() < self.config.min_forecast_points {
            return Err(AnalysisError::InsufficientData {
                required: self.config.min_forecast_points,
                actual: series.len(),
            });
        }

        let horizon = self.config.forecast_horizon;
        let sarima = SarimaModel::new(
            self.config.sarima_order,
            self.config.sarima_seasonal,
            self.config.confidence_level,
        );

        let (model_forecast, method) = match self.run_primary(&sarima, series, horizon) {
            Ok(forecast) => (forecast, ForecastMethod::Sarima),
            Err(err) => {
                warn!(model = sarima.name(), %err, "model fit failed, using trailing-average fallback");
                let fallback =
                    TrailingAverage::new(self.config.fallback_window, self.config.fallback_band)?;
                let forecast = fallback.train(series)?.forecast(horizon)?;
                (
                    forecast,
                    ForecastMethod::TrailingAverage {
                        reason: err.to_string(),
                    },
                )
            }
        };

        let forecast = date_forecast(series.last_date(), &model_forecast);
        let summary = self.summarize(series, &forecast);

        Ok(ForecastOutcome {
            forecast,
            method,
            summary,
        })
    }

    fn run_primary(
        &self,
        sarima: &SarimaModel,
        series: &SanitizedSeries,
        horizon: usize,
    ) -> Result<ModelForecast> {
        sarima.train(series)?.forecast(horizon)
    }

    fn summarize(&self, series: &SanitizedSeries, forecast: &Forecast) -> ForecastSummary {
        // Summary works in the same (possibly shifted) space as the model, so
        // the change and the forecast it describes stay consistent.
        let last_close = series.last_value();
        let last_predicted = *forecast.predicted.last().unwrap_or(&last_close);
        let pct_change = (last_predicted - last_close) / last_close * 100.0;

        let last_lower = *forecast.lower.last().unwrap_or(&last_predicted);
        let last_upper = *forecast.upper.last().unwrap_or(&last_predicted);
        let confidence_width = (last_upper - last_lower) / last_predicted * 100.0;

        let confidence = if confidence_width < self.config.high_confidence_width {
            ConfidenceBucket::High
        } else if confidence_width < self.config.medium_confidence_width {
            ConfidenceBucket::Medium
        } else {
            ConfidenceBucket::Low
        };

        ForecastSummary {
            pct_change,
            confidence_width,
            confidence,
        }
    }
}

/// Attach calendar dates to a model forecast.
///
/// Forecast steps advance by calendar day, not trading day, starting the day
/// after the last observed date.
fn date_forecast(last_date: NaiveDate, model_forecast: &ModelForecast) -> Forecast {
    let dates: Vec<NaiveDate> = (1..=model_forecast.len() as u64)
        .map(|offset| last_date + Days::new(offset))
        .collect();

    let (lower, upper) = model_forecast.intervals().iter().cloned().unzip();

    Forecast {
        dates,
        predicted: model_forecast.values().to_vec(),
        lower,
        upper,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_thresholds() {
        let engine = ForecastEngine::new(AnalysisConfig::default());
        let series = {
            let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
            let points: Vec<_> = (0..40)
                .map(|i| (start + Days::new(i), Some(100.0)))
                .collect();
            crate::data::SanitizedSeries::from_points(&points).unwrap()
        };

        // Constant series forces the fallback, whose band is 10% wide total
        let outcome = engine.run(&series).unwrap();
        assert!(outcome.method.is_fallback());
        assert!((outcome.summary.confidence_width - 10.0).abs() < 1e-9);
        assert_eq!(outcome.summary.confidence, ConfidenceBucket::Medium);
    }
}

//! Trailing-average fallback forecast
//!
//! When the SARIMA fit fails, the forecast engine degrades to repeating the
//! mean of the most recent observations with a fixed symmetric percentage band
//! instead of a model-derived interval.

use crate::data::SanitizedSeries;
use crate::error::{AnalysisError, Result};
use crate::models::{ForecastModel, ModelForecast, TrainedForecastModel};

/// Trailing-mean projection with a fixed band
#[derive(Debug, Clone)]
pub struct TrailingAverage {
    name: String,
    /// Number of trailing observations to average
    window: usize,
    /// Symmetric band around the projection (0.05 = plus/minus 5%)
    band: f64,
}

/// Trailing-average model fitted to a concrete series
#[derive(Debug, Clone)]
pub struct TrainedTrailingAverage {
    name: String,
    level: f64,
    band: f64,
}

impl TrailingAverage {
    pub fn new(window: usize, band: f64) -> Result<Self> {
        if window == 0 {
            return Err(AnalysisError::DataError(
                "trailing-average window must be positive".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&band) {
            return Err(AnalysisError::DataError(format!(
                "trailing-average band must be in [0, 1), got {}",
                band
            )));
        }

        Ok(Self {
            name: format!("Trailing Average (window={})", window),
            window,
            band,
        })
    }
}

impl ForecastModel for TrailingAverage {
    type Trained = TrainedTrailingAverage;

    fn train(&self, series: &SanitizedSeries) -> Result<TrainedTrailingAverage> {
        let values = series.values();
        if values.len() < self.window {
            return Err(AnalysisError::InsufficientData {
                required: self.window,
                actual: values.len(),
            });
        }

        let tail = &values[values.len() - self.window..];
        let level = tail.iter().sum::<f64>() / self.window as f64;

        Ok(TrainedTrailingAverage {
            name: self.name.clone(),
            level,
            band: self.band,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedForecastModel for TrainedTrailingAverage {
    fn forecast(&self, horizon: usize) -> Result<ModelForecast> {
        let values = vec![self.level; horizon];
        let intervals = vec![
            (self.level * (1.0 - self.band), self.level * (1.0 + self.band));
            horizon
        ];

        ModelForecast::new(values, intervals)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(values: &[f64]) -> SanitizedSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points: Vec<_> = values
            .iter()
            .enumerate()
            .map(|(i, v)| (start + chrono::Days::new(i as u64), Some(*v)))
            .collect();
        SanitizedSeries::from_points(&points).unwrap()
    }

    #[test]
    fn projects_mean_of_tail() {
        let data = series(&[1.0, 2.0, 3.0, 10.0, 20.0, 30.0]);
        let model = TrailingAverage::new(3, 0.05).unwrap();
        let forecast = model.train(&data).unwrap().forecast(4).unwrap();

        assert_eq!(forecast.values(), &[20.0; 4]);
        assert_eq!(forecast.intervals()[0], (19.0, 21.0));
    }

    #[test]
    fn rejects_short_series() {
        let data = series(&[1.0, 2.0]);
        let model = TrailingAverage::new(10, 0.05).unwrap();
        assert!(matches!(
            model.train(&data),
            Err(AnalysisError::InsufficientData {
                required: 10,
                actual: 2
            })
        ));
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(TrailingAverage::new(0, 0.05).is_err());
        assert!(TrailingAverage::new(10, 1.5).is_err());
    }
}

//! Forecasting models for the sanitized close-price series

use crate::data::SanitizedSeries;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Undated model output: point forecasts with a two-sided interval per step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelForecast {
    values: Vec<f64>,
    intervals: Vec<(f64, f64)>,
}

impl ModelForecast {
    /// Create a model forecast, validating the interval contract
    pub fn new(values: Vec<f64>, intervals: Vec<(f64, f64)>) -> Result<Self> {
        if values.len() != intervals.len() {
            return Err(crate::error::AnalysisError::DataError(format!(
                "forecast has {} values but {} intervals",
                values.len(),
                intervals.len()
            )));
        }
        for (v, (lo, hi)) in values.iter().zip(&intervals) {
            if !(lo <= v && v <= hi) {
                return Err(crate::error::AnalysisError::DataError(format!(
                    "interval [{lo}, {hi}] does not contain forecast {v}"
                )));
            }
        }

        Ok(Self { values, intervals })
    }

    /// Point forecasts, one per step
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// (lower, upper) bounds, one per step
    pub fn intervals(&self) -> &[(f64, f64)] {
        &self.intervals
    }

    /// Number of forecast steps
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A model fitted to a concrete series, ready to forecast from its end
pub trait TrainedForecastModel: Debug {
    /// Generate a forecast `horizon` steps past the end of the training data
    fn forecast(&self, horizon: usize) -> Result<ModelForecast>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// A forecast model that can be trained on a sanitized series
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Fit the model to the series
    fn train(&self, series: &SanitizedSeries) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod sarima;
pub mod trailing_average;

//! Error types for the stock_forecast crate

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Custom error types for the analysis pipeline
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The data source returned no rows for the requested symbol/range
    #[error("no data found for the requested symbol and date range")]
    EmptyOrMissingData,

    /// Sanitization removed every point from the series
    #[error("series is empty after removing missing and non-finite values")]
    EmptySeries,

    /// A component's minimum-data precondition was violated
    #[error("insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Model fitting failed; recovered internally via the fallback path
    #[error("model fit failed: {0}")]
    ModelFit(String),

    /// Error related to data validation or processing
    #[error("data error: {0}")]
    DataError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("polars error: {0}")]
    Polars(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, AnalysisError>;

impl From<polars::prelude::PolarsError> for AnalysisError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        AnalysisError::Polars(err.to_string())
    }
}

/// Serializable mirror of [`AnalysisError`] for the presentation boundary.
///
/// `std::io::Error` is not serializable, so reports carry this flattened form
/// instead of the error itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail")]
pub enum AnalysisFault {
    EmptyOrMissingData,
    EmptySeries,
    InsufficientData { required: usize, actual: usize },
    ModelFit(String),
    DataError(String),
    Io(String),
    Polars(String),
}

impl From<&AnalysisError> for AnalysisFault {
    fn from(err: &AnalysisError) -> Self {
        match err {
            AnalysisError::EmptyOrMissingData => AnalysisFault::EmptyOrMissingData,
            AnalysisError::EmptySeries => AnalysisFault::EmptySeries,
            AnalysisError::InsufficientData { required, actual } => {
                AnalysisFault::InsufficientData {
                    required: *required,
                    actual: *actual,
                }
            }
            AnalysisError::ModelFit(msg) => AnalysisFault::ModelFit(msg.clone()),
            AnalysisError::DataError(msg) => AnalysisFault::DataError(msg.clone()),
            AnalysisError::Io(err) => AnalysisFault::Io(err.to_string()),
            AnalysisError::Polars(msg) => AnalysisFault::Polars(msg.clone()),
        }
    }
}

impl std::fmt::Display for AnalysisFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisFault::EmptyOrMissingData => {
                write!(f, "no data found for the requested symbol and date range")
            }
            AnalysisFault::EmptySeries => {
                write!(f, "series is empty after removing missing and non-finite values")
            }
            AnalysisFault::InsufficientData { required, actual } => {
                write!(f, "insufficient data: need at least {required} points, got {actual}")
            }
            AnalysisFault::ModelFit(msg) => write!(f, "model fit failed: {msg}"),
            AnalysisFault::DataError(msg) => write!(f, "data error: {msg}"),
            AnalysisFault::Io(msg) => write!(f, "IO error: {msg}"),
            AnalysisFault::Polars(msg) => write!(f, "polars error: {msg}"),
        }
    }
}

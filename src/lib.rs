//! # Stock Forecast
//!
//! A Rust library for decomposing daily stock price series and producing
//! short-horizon forecasts with confidence bounds.
//!
//! ## Features
//!
//! - Price table ingestion from CSV or in-memory sources, with date/close
//!   column detection
//! - Series sanitization (missing-value removal, positivity shift) ahead of
//!   multiplicative modeling
//! - Multiplicative classical decomposition into trend, seasonal, and residual
//!   components
//! - SARIMA forecasting with confidence intervals, degrading to a
//!   trailing-average projection when the fit fails
//! - A single synchronous pipeline that assembles an [`AnalysisReport`] per run
//!
//! ## Quick Start
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use stock_forecast::config::AnalysisConfig;
//! use stock_forecast::pipeline::run_analysis;
//! use stock_forecast::source::CsvSource;
//!
//! # fn main() -> stock_forecast::Result<()> {
//! let source = CsvSource::new("data/");
//! let config = AnalysisConfig::default();
//! let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//!
//! let report = run_analysis(&source, "Infosys", start, end, &config)?;
//!
//! if let Ok(outcome) = &report.forecast {
//!     println!(
//!         "30-day forecast: {:.2} ({:+.2}%)",
//!         outcome.forecast.predicted.last().unwrap(),
//!         outcome.summary.pct_change,
//!     );
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod decompose;
pub mod error;
pub mod forecast;
pub mod models;
pub mod pipeline;
pub mod source;

// Re-export commonly used types
pub use crate::config::AnalysisConfig;
pub use crate::data::{PriceTable, SanitizedSeries};
pub use crate::decompose::Decomposition;
pub use crate::error::{AnalysisError, AnalysisFault, Result};
pub use crate::forecast::{ConfidenceBucket, Forecast, ForecastMethod, ForecastOutcome};
pub use crate::pipeline::{run_analysis, AnalysisReport};
pub use crate::source::MarketDataSource;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

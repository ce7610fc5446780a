//! Configuration for the analysis pipeline
//!
//! Everything tunable lives here: the decomposition period, forecast horizon,
//! SARIMA orders, minimum-data thresholds, fallback parameters, and the fixed
//! company-to-ticker map the dashboard offers.

use crate::models::sarima::{Order, SeasonalOrder};
use serde::{Deserialize, Serialize};

/// The ten companies the dashboard covers, mapped to NSE-qualified tickers.
pub const COMPANIES: &[(&str, &str)] = &[
    ("Reliance Industries", "RELIANCE.NS"),
    ("Tata Consultancy Services", "TCS.NS"),
    ("Infosys", "INFY.NS"),
    ("HDFC Bank", "HDFCBANK.NS"),
    ("ICICI Bank", "ICICIBANK.NS"),
    ("State Bank of India", "SBIN.NS"),
    ("Bharti Airtel", "BHARTIARTL.NS"),
    ("Larsen & Toubro", "LT.NS"),
    ("Hindustan Unilever", "HINDUNILVR.NS"),
    ("ITC Limited", "ITC.NS"),
];

/// Look up the ticker symbol for a company name.
pub fn ticker_for(company: &str) -> Option<&'static str> {
    COMPANIES
        .iter()
        .find(|(name, _)| *name == company)
        .map(|(_, ticker)| *ticker)
}

/// Tunable parameters for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Seasonal period for the multiplicative decomposition
    pub decomposition_period: usize,
    /// Number of calendar days to forecast ahead
    pub forecast_horizon: usize,
    /// Minimum series length before forecasting is attempted
    pub min_forecast_points: usize,
    /// Non-seasonal SARIMA order (p, d, q)
    pub sarima_order: Order,
    /// Seasonal SARIMA order (P, D, Q, s)
    pub sarima_seasonal: SeasonalOrder,
    /// Nominal confidence level for the forecast interval
    pub confidence_level: f64,
    /// Trailing-mean window for the fallback forecast
    pub fallback_window: usize,
    /// Symmetric band around the fallback forecast (0.05 = plus/minus 5%)
    pub fallback_band: f64,
    /// Confidence-width threshold (percent) below which confidence is "High"
    pub high_confidence_width: f64,
    /// Confidence-width threshold (percent) below which confidence is "Medium"
    pub medium_confidence_width: f64,
}

impl AnalysisConfig {
    /// Minimum series length before decomposition is attempted.
    ///
    /// The centered moving average needs two full periods of data.
    pub fn min_decomposition_points(&self) -> usize {
        self.decomposition_period * 2
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            decomposition_period: 30,
            forecast_horizon: 30,
            min_forecast_points: 30,
            sarima_order: Order { p: 1, d: 1, q: 1 },
            sarima_seasonal: SeasonalOrder {
                p: 1,
                d: 1,
                q: 1,
                period: 5,
            },
            confidence_level: 0.95,
            fallback_window: 10,
            fallback_band: 0.05,
            high_confidence_width: 10.0,
            medium_confidence_width: 20.0,
        }
    }
}

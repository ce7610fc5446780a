//! Multiplicative classical decomposition
//!
//! Splits a close-price series into trend, seasonal, and residual factors with
//! `observed = trend * seasonal * residual`. The trend is a centered moving
//! average over one seasonal period, so it is undefined for half a period at
//! each edge of the series; the residual inherits those gaps.

use crate::data::SanitizedSeries;
use crate::error::{AnalysisError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Components of a multiplicative decomposition, aligned to the series dates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decomposition {
    /// Trading dates, copied from the input series
    pub dates: Vec<NaiveDate>,
    /// The input values, unchanged
    pub observed: Vec<f64>,
    /// Centered-moving-average trend; `None` at the series edges
    pub trend: Vec<Option<f64>>,
    /// Seasonal factors, tiled over the whole series; they average to 1 over one period
    pub seasonal: Vec<f64>,
    /// `observed / (trend * seasonal)`; `None` wherever the trend is undefined
    pub residual: Vec<Option<f64>>,
    /// Seasonal period the decomposition used
    pub period: usize,
}

/// Decompose a series into multiplicative trend/seasonal/residual components.
///
/// Requires at least `2 * period` points; shorter series yield
/// [`AnalysisError::InsufficientData`] so the caller can skip the section and
/// tell the user, rather than render a default.
pub fn decompose(series: &SanitizedSeries, period: usize) -> Result<Decomposition> {
    if period < 2 {
        return Err(AnalysisError::DataError(format!(
            "decomposition period must be at least 2, got {}",
            period
        )));
    }

    let n = series.len();
    let required = 2 * period;
    if n < required {
        return Err(AnalysisError::InsufficientData {
            required,
            actual: n,
        });
    }

    let observed = series.values().to_vec();
    let trend = centered_moving_average(&observed, period);

    // Per-phase means of the detrended series, phase = index mod period
    let mut phase_sums = vec![0.0; period];
    let mut phase_counts = vec![0usize; period];
    for (i, t) in trend.iter().enumerate() {
        if let Some(t) = t {
            phase_sums[i % period] += observed[i] / t;
            phase_counts[i % period] += 1;
        }
    }

    let mut factors = Vec::with_capacity(period);
    for (sum, count) in phase_sums.iter().zip(&phase_counts) {
        if *count == 0 {
            return Err(AnalysisError::DataError(format!(
                "no detrended values for seasonal phase, period {} too large for series",
                period
            )));
        }
        factors.push(sum / *count as f64);
    }

    // Normalize so the factors average to 1 over one full period
    let mean = factors.iter().sum::<f64>() / period as f64;
    for f in &mut factors {
        *f /= mean;
    }

    let seasonal: Vec<f64> = (0..n).map(|i| factors[i % period]).collect();

    let residual: Vec<Option<f64>> = trend
        .iter()
        .zip(&observed)
        .zip(&seasonal)
        .map(|((t, o), s)| t.map(|t| o / (t * s)))
        .collect();

    Ok(Decomposition {
        dates: series.dates().to_vec(),
        observed,
        trend,
        seasonal,
        residual,
        period,
    })
}

/// Centered moving average over one period.
///
/// For an even period the window spans `period + 1` points with half weight on
/// the two endpoints, which keeps the average centered; for an odd period it is
/// a plain window of `period` points. Either way exactly `period / 2` positions
/// at each edge have no value.
fn centered_moving_average(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let half = period / 2;
    let mut trend = vec![None; n];

    if period % 2 == 0 {
        for i in half..n.saturating_sub(half) {
            let window = &values[i - half..=i + half];
            let inner: f64 = window[1..window.len() - 1].iter().sum();
            let avg = (inner + 0.5 * window[0] + 0.5 * window[window.len() - 1]) / period as f64;
            trend[i] = Some(avg);
        }
    } else {
        for i in half..n.saturating_sub(half) {
            let window = &values[i - half..=i + half];
            trend[i] = Some(window.iter().sum::<f64>() / period as f64);
        }
    }

    trend
}

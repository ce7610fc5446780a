//! SARIMA model for seasonal close-price forecasting
//!
//! Implements SARIMA(p,d,q)(P,D,Q,s): the series is differenced by
//! `(1-B)^d (1-B^s)^D`, an ARMA model with multiplicative seasonal terms is
//! fitted to the result by conditional sum of squares, and forecasts are
//! integrated back to the price scale. Coefficients are found with a
//! deterministic Nelder-Mead search and are NOT constrained to the stationary
//! or invertible region, matching how the dashboard uses the model on
//! edge-case data.

use crate::data::SanitizedSeries;
use crate::error::{AnalysisError, Result};
use crate::models::{ForecastModel, ModelForecast, TrainedForecastModel};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

/// Non-seasonal order (p, d, q)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Autoregressive order
    pub p: usize,
    /// Differencing order
    pub d: usize,
    /// Moving-average order
    pub q: usize,
}

/// Seasonal order (P, D, Q) with its period s
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalOrder {
    /// Seasonal autoregressive order
    pub p: usize,
    /// Seasonal differencing order
    pub d: usize,
    /// Seasonal moving-average order
    pub q: usize,
    /// Seasonal period
    pub period: usize,
}

/// SARIMA model specification
#[derive(Debug, Clone)]
pub struct SarimaModel {
    name: String,
    order: Order,
    seasonal: SeasonalOrder,
    confidence_level: f64,
}

/// SARIMA model fitted to a concrete series
#[derive(Debug, Clone)]
pub struct TrainedSarima {
    name: String,
    /// Expanded AR polynomial: regular x seasonal, coefficient 0 is 1
    phi: Vec<f64>,
    /// Expanded MA polynomial: regular x seasonal, coefficient 0 is 1
    theta: Vec<f64>,
    /// Expanded differencing polynomial `(1-B)^d (1-B^s)^D`
    diff: Vec<f64>,
    /// Differenced training series
    differenced: Vec<f64>,
    /// One-step residuals on the differenced scale
    residuals: Vec<f64>,
    /// Training series on the price scale
    history: Vec<f64>,
    /// Innovation variance estimate
    sigma2: f64,
    confidence_level: f64,
}

impl SarimaModel {
    pub fn new(order: Order, seasonal: SeasonalOrder, confidence_level: f64) -> Self {
        Self {
            name: format!(
                "SARIMA({},{},{})({},{},{},{})",
                order.p, order.d, order.q, seasonal.p, seasonal.d, seasonal.q, seasonal.period
            ),
            order,
            seasonal,
            confidence_level,
        }
    }

    /// Expand the AR and MA polynomials for a parameter vector
    ///
    /// Layout of `params`: p AR values, q MA values, P seasonal AR values,
    /// Q seasonal MA values.
    fn expand(&self, params: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let (p, q) = (self.order.p, self.order.q);
        let (sp, sq, s) = (self.seasonal.p, self.seasonal.q, self.seasonal.period);

        let ar = &params[..p];
        let ma = &params[p..p + q];
        let sar = &params[p + q..p + q + sp];
        let sma = &params[p + q + sp..];

        let phi = poly_mul(&lag_poly(ar, 1, -1.0), &lag_poly(sar, s, -1.0));
        let theta = poly_mul(&lag_poly(ma, 1, 1.0), &lag_poly(sma, s, 1.0));
        (phi, theta)
    }
}

impl ForecastModel for SarimaModel {
    type Trained = TrainedSarima;

    fn train(&self, series: &SanitizedSeries) -> Result<TrainedSarima> {
        let history = series.values().to_vec();
        let s = self.seasonal.period;
        if s < 2 {
            return Err(AnalysisError::ModelFit(format!(
                "seasonal period must be at least 2, got {}",
                s
            )));
        }

        let diff = diff_poly(self.order.d, self.seasonal.d, s);
        let diff_degree = diff.len() - 1;
        let max_lag = (self.order.p + self.seasonal.p * s).max(self.order.q + self.seasonal.q * s);

        // Need enough differenced observations to condition the recursion on
        let min_len = diff_degree + 2 * max_lag.max(1) + 1;
        if history.len() < min_len {
            return Err(AnalysisError::ModelFit(format!(
                "{} needs at least {} observations, got {}",
                self.name,
                min_len,
                history.len()
            )));
        }

        let differenced = apply_differencing(&history, &diff);

        let mean = differenced.iter().sum::<f64>() / differenced.len() as f64;
        let variance = differenced
            .iter()
            .map(|w| (w - mean).powi(2))
            .sum::<f64>()
            / differenced.len() as f64;
        if variance < 1e-10 {
            return Err(AnalysisError::ModelFit(
                "insufficient variation in the differenced series".to_string(),
            ));
        }

        let n_params = self.order.p + self.order.q + self.seasonal.p + self.seasonal.q;
        let params = if n_params == 0 {
            Vec::new()
        } else {
            let objective = |params: &[f64]| {
                let (phi, theta) = self.expand(params);
                css_sum_of_squares(&differenced, &phi, &theta)
            };
            nelder_mead(&objective, &vec![0.1; n_params], 0.5, 500, 1e-10)
        };

        let (phi, theta) = self.expand(&params);
        let (sse, residuals) = css_residuals(&differenced, &phi, &theta);
        if !sse.is_finite() {
            return Err(AnalysisError::ModelFit(
                "conditional sum of squares did not converge".to_string(),
            ));
        }
        let sigma2 = sse / differenced.len() as f64;

        tracing::debug!(
            model = %self.name,
            sse,
            sigma2,
            "fitted SARIMA coefficients {:?}",
            params
        );

        Ok(TrainedSarima {
            name: self.name.clone(),
            phi,
            theta,
            diff,
            differenced,
            residuals,
            history,
            sigma2,
            confidence_level: self.confidence_level,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedForecastModel for TrainedSarima {
    fn forecast(&self, horizon: usize) -> Result<ModelForecast> {
        if horizon == 0 {
            return ModelForecast::new(Vec::new(), Vec::new());
        }

        // Forecast the differenced series: future innovations are zero, lagged
        // innovations come from the fit residuals while they are in range.
        let m = self.differenced.len();
        let mut w = self.differenced.clone();
        let mut e = self.residuals.clone();
        for _ in 0..horizon {
            let t = w.len();
            let mut next = 0.0;
            for (i, phi) in self.phi.iter().enumerate().skip(1) {
                if i <= t {
                    next -= phi * w[t - i];
                }
            }
            for (j, theta) in self.theta.iter().enumerate().skip(1) {
                if j <= t {
                    next += theta * e[t - j];
                }
            }
            w.push(next);
            e.push(0.0);
        }

        // Integrate back to the price scale through the differencing polynomial
        let mut y = self.history.clone();
        for h in 0..horizon {
            let t = y.len();
            let mut value = w[m + h];
            for (i, c) in self.diff.iter().enumerate().skip(1) {
                if i <= t {
                    value -= c * y[t - i];
                }
            }
            y.push(value);
        }
        let values = y[self.history.len()..].to_vec();

        // Forecast error variance from the psi weights of the integrated process
        let a = poly_mul(&self.phi, &self.diff);
        let mut psi = vec![0.0; horizon];
        psi[0] = 1.0;
        for j in 1..horizon {
            let mut sum = *self.theta.get(j).unwrap_or(&0.0);
            for (i, c) in a.iter().enumerate().skip(1) {
                if i <= j {
                    sum -= c * psi[j - i];
                }
            }
            psi[j] = sum;
        }

        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| AnalysisError::ModelFit(format!("normal quantile unavailable: {e}")))?;
        let z = normal.inverse_cdf(0.5 + self.confidence_level / 2.0);

        let mut cumulative = 0.0;
        let mut intervals = Vec::with_capacity(horizon);
        for (h, value) in values.iter().enumerate() {
            cumulative += psi[h] * psi[h];
            let margin = z * (self.sigma2 * cumulative).sqrt();
            if !margin.is_finite() {
                return Err(AnalysisError::ModelFit(
                    "forecast interval is not finite".to_string(),
                ));
            }
            intervals.push((value - margin, value + margin));
        }

        ModelForecast::new(values, intervals)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Lag polynomial `1 + sign * c_1 B^s + sign * c_2 B^{2s} + ...`
fn lag_poly(coeffs: &[f64], stride: usize, sign: f64) -> Vec<f64> {
    let mut poly = vec![0.0; coeffs.len() * stride + 1];
    poly[0] = 1.0;
    for (k, c) in coeffs.iter().enumerate() {
        poly[(k + 1) * stride] = sign * c;
    }
    poly
}

/// Multiply two polynomials in the lag operator
fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// Combined differencing polynomial `(1-B)^d (1-B^s)^D`
fn diff_poly(d: usize, seasonal_d: usize, s: usize) -> Vec<f64> {
    let mut poly = vec![1.0];
    for _ in 0..d {
        poly = poly_mul(&poly, &[1.0, -1.0]);
    }
    let mut seasonal = vec![0.0; s + 1];
    seasonal[0] = 1.0;
    seasonal[s] = -1.0;
    for _ in 0..seasonal_d {
        poly = poly_mul(&poly, &seasonal);
    }
    poly
}

/// Apply a differencing polynomial to a series
fn apply_differencing(values: &[f64], diff: &[f64]) -> Vec<f64> {
    let degree = diff.len() - 1;
    (degree..values.len())
        .map(|t| {
            diff.iter()
                .enumerate()
                .map(|(i, c)| c * values[t - i])
                .sum()
        })
        .collect()
}

/// Conditional-sum-of-squares residuals, zero-padding the pre-sample values
fn css_residuals(w: &[f64], phi: &[f64], theta: &[f64]) -> (f64, Vec<f64>) {
    let mut residuals = Vec::with_capacity(w.len());
    let mut sse = 0.0;
    for t in 0..w.len() {
        let mut e = 0.0;
        for (i, c) in phi.iter().enumerate() {
            if i <= t {
                e += c * w[t - i];
            }
        }
        for (j, c) in theta.iter().enumerate().skip(1) {
            if j <= t {
                e -= c * residuals[t - j];
            }
        }
        sse += e * e;
        residuals.push(e);
    }
    (sse, residuals)
}

fn css_sum_of_squares(w: &[f64], phi: &[f64], theta: &[f64]) -> f64 {
    let (sse, _) = css_residuals(w, phi, theta);
    if sse.is_finite() {
        sse
    } else {
        f64::MAX
    }
}

/// Deterministic Nelder-Mead simplex minimization
fn nelder_mead(
    f: &dyn Fn(&[f64]) -> f64,
    x0: &[f64],
    step: f64,
    max_iters: usize,
    tol: f64,
) -> Vec<f64> {
    let dim = x0.len();
    let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(dim + 1);
    simplex.push((x0.to_vec(), f(x0)));
    for i in 0..dim {
        let mut x = x0.to_vec();
        x[i] += step;
        let fx = f(&x);
        simplex.push((x, fx));
    }

    for _ in 0..max_iters {
        simplex.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        if (simplex[dim].1 - simplex[0].1).abs() < tol {
            break;
        }

        // Centroid of all points except the worst
        let mut centroid = vec![0.0; dim];
        for (x, _) in &simplex[..dim] {
            for (c, xi) in centroid.iter_mut().zip(x) {
                *c += xi / dim as f64;
            }
        }

        let worst = simplex[dim].clone();
        let reflected: Vec<f64> = centroid
            .iter()
            .zip(&worst.0)
            .map(|(c, w)| c + (c - w))
            .collect();
        let f_reflected = f(&reflected);

        if f_reflected < simplex[0].1 {
            // Try expanding further in the same direction
            let expanded: Vec<f64> = centroid
                .iter()
                .zip(&worst.0)
                .map(|(c, w)| c + 2.0 * (c - w))
                .collect();
            let f_expanded = f(&expanded);
            if f_expanded < f_reflected {
                simplex[dim] = (expanded, f_expanded);
            } else {
                simplex[dim] = (reflected, f_reflected);
            }
        } else if f_reflected < simplex[dim - 1].1 {
            simplex[dim] = (reflected, f_reflected);
        } else {
            let contracted: Vec<f64> = centroid
                .iter()
                .zip(&worst.0)
                .map(|(c, w)| c + 0.5 * (w - c))
                .collect();
            let f_contracted = f(&contracted);
            if f_contracted < worst.1 {
                simplex[dim] = (contracted, f_contracted);
            } else {
                // Shrink the whole simplex toward the best point
                let best = simplex[0].0.clone();
                for entry in simplex.iter_mut().skip(1) {
                    let x: Vec<f64> = best
                        .iter()
                        .zip(&entry.0)
                        .map(|(b, xi)| b + 0.5 * (xi - b))
                        .collect();
                    let fx = f(&x);
                    *entry = (x, fx);
                }
            }
        }
    }

    simplex.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    simplex[0].0.clone()
}

//! Price table handling and series sanitization
//!
//! [`PriceTable`] wraps the raw tabular OHLCV history a data source returns,
//! with the date/close/volume columns detected by name. [`SanitizedSeries`] is
//! the cleaned close-price series every downstream computation consumes:
//! one-dimensional, gap-free (missing closes dropped), strictly positive.

use crate::error::{AnalysisError, Result};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Raw daily price history as returned by a data source
#[derive(Debug, Clone)]
pub struct PriceTable {
    /// Data frame containing the price history
    df: DataFrame,
    /// Name of the date column
    date_column: String,
    /// Name of the close-price column
    close_column: String,
    /// Name of the volume column, if present
    volume_column: Option<String>,
}

impl PriceTable {
    /// Create a price table from an existing DataFrame, detecting columns by name
    pub fn from_dataframe(df: DataFrame) -> Result<Self> {
        let date_column = detect_date_column(&df)?;
        let close_column = detect_close_column(&df)?;
        let volume_column = detect_volume_column(&df);

        Ok(Self {
            df,
            date_column,
            close_column,
            volume_column,
        })
    }

    /// Get the underlying DataFrame
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Number of rows in the table
    pub fn len(&self) -> usize {
        self.df.height()
    }

    /// Whether the table holds no rows at all
    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Restrict the table to rows whose date falls within `[start, end]`
    pub fn filter_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let points = self.close_points()?;
        let mask: Vec<bool> = points
            .iter()
            .map(|(date, _)| *date >= start && *date <= end)
            .collect();
        let mask = BooleanChunked::from_slice("mask", &mask);
        let df = self.df.filter(&mask)?;

        Ok(Self {
            df,
            date_column: self.date_column.clone(),
            close_column: self.close_column.clone(),
            volume_column: self.volume_column.clone(),
        })
    }

    /// Extract the close column as (date, nullable close) pairs
    pub fn close_points(&self) -> Result<Vec<(NaiveDate, Option<f64>)>> {
        let dates = self.column_as_dates(&self.date_column)?;
        let closes = self.column_as_nullable_f64(&self.close_column)?;

        if dates.len() != closes.len() {
            return Err(AnalysisError::DataError(format!(
                "date column has {} rows but close column has {}",
                dates.len(),
                closes.len()
            )));
        }

        Ok(dates.into_iter().zip(closes).collect())
    }

    /// Mean of the volume column, if the table has one
    pub fn average_volume(&self) -> Option<f64> {
        let name = self.volume_column.as_ref()?;
        self.df.column(name).ok()?.mean()
    }

    /// Parse a column into dates, accepting string, date, and datetime dtypes
    fn column_as_dates(&self, column_name: &str) -> Result<Vec<NaiveDate>> {
        let col = self.df.column(column_name).map_err(|e| {
            AnalysisError::DataError(format!("column '{}' not found: {}", column_name, e))
        })?;

        match col.dtype() {
            DataType::Utf8 => col
                .utf8()
                .map_err(AnalysisError::from)?
                .into_iter()
                .map(|opt| {
                    let s = opt.ok_or_else(|| {
                        AnalysisError::DataError("null date in price table".to_string())
                    })?;
                    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
                        AnalysisError::DataError(format!("unparseable date '{}': {}", s, e))
                    })
                })
                .collect(),
            DataType::Date => col
                .date()
                .map_err(AnalysisError::from)?
                .into_iter()
                .map(|opt| {
                    let days = opt.ok_or_else(|| {
                        AnalysisError::DataError("null date in price table".to_string())
                    })?;
                    epoch_days_to_date(days as i64)
                })
                .collect(),
            DataType::Datetime(unit, _) => {
                let divisor = match unit {
                    TimeUnit::Nanoseconds => 86_400_000_000_000i64,
                    TimeUnit::Microseconds => 86_400_000_000i64,
                    TimeUnit::Milliseconds => 86_400_000i64,
                };
                col.datetime()
                    .map_err(AnalysisError::from)?
                    .into_iter()
                    .map(|opt| {
                        let ts = opt.ok_or_else(|| {
                            AnalysisError::DataError("null date in price table".to_string())
                        })?;
                        epoch_days_to_date(ts.div_euclid(divisor))
                    })
                    .collect()
            }
            other => Err(AnalysisError::DataError(format!(
                "column '{}' has unsupported date dtype {:?}",
                column_name, other
            ))),
        }
    }

    /// Read a numeric column keeping nulls as `None`
    fn column_as_nullable_f64(&self, column_name: &str) -> Result<Vec<Option<f64>>> {
        let col = self.df.column(column_name).map_err(|e| {
            AnalysisError::DataError(format!("column '{}' not found: {}", column_name, e))
        })?;

        match col.dtype() {
            DataType::Float64 => Ok(col.f64().map_err(AnalysisError::from)?.into_iter().collect()),
            DataType::Float32 => Ok(col
                .f32()
                .map_err(AnalysisError::from)?
                .into_iter()
                .map(|opt| opt.map(|v| v as f64))
                .collect()),
            DataType::Int64 => Ok(col
                .i64()
                .map_err(AnalysisError::from)?
                .into_iter()
                .map(|opt| opt.map(|v| v as f64))
                .collect()),
            DataType::Int32 => Ok(col
                .i32()
                .map_err(AnalysisError::from)?
                .into_iter()
                .map(|opt| opt.map(|v| v as f64))
                .collect()),
            other => Err(AnalysisError::DataError(format!(
                "column '{}' with dtype {:?} cannot be read as f64",
                column_name, other
            ))),
        }
    }
}

fn epoch_days_to_date(days: i64) -> Result<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days as i32 + 719_163)
        .ok_or_else(|| AnalysisError::DataError(format!("date out of range: {} epoch days", days)))
}

/// Detect the date column in a DataFrame
fn detect_date_column(df: &DataFrame) -> Result<String> {
    for name in df.get_column_names() {
        let lower = name.to_lowercase();
        if lower.contains("date") || lower.contains("time") {
            return Ok(name.to_string());
        }
    }

    // Fall back to the first column if it is temporal
    if let Some(first) = df.get_columns().first() {
        if first.dtype().is_temporal() {
            return Ok(first.name().to_string());
        }
    }

    Err(AnalysisError::DataError(
        "no date column found in price table".to_string(),
    ))
}

/// Detect the close-price column in a DataFrame
fn detect_close_column(df: &DataFrame) -> Result<String> {
    let names = df.get_column_names();

    for name in &names {
        if name.to_lowercase().contains("close") {
            return Ok(name.to_string());
        }
    }
    for name in &names {
        if name.to_lowercase().contains("price") {
            return Ok(name.to_string());
        }
    }

    Err(AnalysisError::DataError(
        "no close column found in price table".to_string(),
    ))
}

/// Detect the volume column in a DataFrame
fn detect_volume_column(df: &DataFrame) -> Option<String> {
    df.get_column_names()
        .iter()
        .find(|name| {
            let lower = name.to_lowercase();
            lower.contains("volume") || lower.contains("vol")
        })
        .map(|name| name.to_string())
}

/// Clean close-price series: finite, strictly positive, indexed by trading date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanitizedSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
    /// Additive offset applied to enforce positivity (0.0 when none was needed)
    shift: f64,
}

impl SanitizedSeries {
    /// Build a sanitized series from (date, nullable close) pairs.
    ///
    /// Missing and non-finite closes are dropped. If any surviving value is
    /// non-positive, every value is shifted by `-min + 1` so the multiplicative
    /// decomposition stays defined; the offset is recorded in `shift`. Gaps are
    /// never resampled or interpolated.
    pub fn from_points(points: &[(NaiveDate, Option<f64>)]) -> Result<Self> {
        let mut dates = Vec::with_capacity(points.len());
        let mut values = Vec::with_capacity(points.len());

        for (date, close) in points {
            if let Some(v) = close {
                if v.is_finite() {
                    dates.push(*date);
                    values.push(*v);
                }
            }
        }

        if values.is_empty() {
            return Err(AnalysisError::EmptySeries);
        }

        for pair in dates.windows(2) {
            if pair[1] <= pair[0] {
                return Err(AnalysisError::DataError(format!(
                    "dates must be strictly increasing, found {} after {}",
                    pair[1], pair[0]
                )));
            }
        }

        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let shift = if min <= 0.0 { -min + 1.0 } else { 0.0 };
        if shift != 0.0 {
            for v in &mut values {
                *v += shift;
            }
        }

        Ok(Self {
            dates,
            values,
            shift,
        })
    }

    /// Number of points in the series
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`: construction rejects empty series
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Trading dates, strictly increasing
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Close values after the positivity shift
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The additive positivity offset that was applied (0.0 when none)
    pub fn shift(&self) -> f64 {
        self.shift
    }

    /// Last trading date in the series
    pub fn last_date(&self) -> NaiveDate {
        *self.dates.last().expect("series is never empty")
    }

    /// Last close value in the (possibly shifted) series
    pub fn last_value(&self) -> f64 {
        *self.values.last().expect("series is never empty")
    }

    /// Close values with the positivity shift reversed
    pub fn original_values(&self) -> Vec<f64> {
        self.values.iter().map(|v| v - self.shift).collect()
    }

    /// Last close value as the provider reported it, shift reversed
    pub fn last_original_value(&self) -> f64 {
        self.last_value() - self.shift
    }
}

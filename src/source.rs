//! Market data sources
//!
//! The analysis pipeline treats the market-data provider as an external
//! collaborator behind the [`MarketDataSource`] trait: given a ticker and an
//! inclusive date range it returns a [`PriceTable`], which may be empty for
//! unknown symbols or out-of-range requests.

use crate::data::PriceTable;
use crate::error::Result;
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// A provider of daily OHLCV history
pub trait MarketDataSource {
    /// Fetch daily history for `symbol` between `start` and `end`, inclusive
    fn fetch_daily(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceTable>;
}

/// Data source backed by a directory of per-symbol CSV files
///
/// Each symbol is expected at `<dir>/<symbol>.csv` with a header row and at
/// least a date and a close column (detection is by name, case-insensitive).
#[derive(Debug, Clone)]
pub struct CsvSource {
    dir: PathBuf,
}

impl CsvSource {
    /// Create a source rooted at the given directory
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", symbol))
    }
}

impl MarketDataSource for CsvSource {
    fn fetch_daily(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceTable> {
        let file = File::open(self.path_for(symbol))?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        PriceTable::from_dataframe(df)?.filter_range(start, end)
    }
}

/// In-memory data source for tests and demos
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    tables: HashMap<String, Vec<(NaiveDate, Option<f64>)>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a close-price history for a symbol
    pub fn with_series(mut self, symbol: &str, points: Vec<(NaiveDate, Option<f64>)>) -> Self {
        self.tables.insert(symbol.to_string(), points);
        self
    }
}

impl MarketDataSource for StaticSource {
    fn fetch_daily(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceTable> {
        // Unknown symbols behave like a provider returning an empty result
        let points = self.tables.get(symbol).cloned().unwrap_or_default();

        let dates: Vec<String> = points.iter().map(|(d, _)| d.to_string()).collect();
        let closes: Vec<Option<f64>> = points.iter().map(|(_, c)| *c).collect();

        let df = DataFrame::new(vec![
            Series::new("Date", dates),
            Series::new("Close", closes),
        ])?;

        PriceTable::from_dataframe(df)?.filter_range(start, end)
    }
}

//! Data provider traits and structured error types.
//!
//! `BarSource` abstracts over where daily bars come from (CSV files, Parquet
//! files, a synthetic generator). `MarketDataProvider` is what the simulation
//! consumes: it turns bars into an aligned [`Panel`]. `BaselineProvider`
//! supplies a benchmark index series for weighted runs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Panel;

/// Raw daily OHLCV bar from a bar source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("no data for symbol '{symbol}' at {path}")]
    SymbolNotFound { symbol: String, path: String },

    #[error("no bars for '{symbol}' between {start} and {end}")]
    EmptyRange {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("io error: {0}")]
    Io(String),

    #[error("csv error: {0}")]
    Csv(String),

    #[error("parquet error: {0}")]
    Parquet(String),

    #[error("validation error: {0}")]
    Validation(String),
}

impl From<std::io::Error> for DataError {
    fn from(err: std::io::Error) -> Self {
        DataError::Io(err.to_string())
    }
}

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        DataError::Csv(err.to_string())
    }
}

/// Where bars came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Csv,
    Parquet,
    Synthetic,
}

/// Everything a provider needs to build a panel for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRequest {
    pub exchange: String,
    pub instruments: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Rows of history the strategy may look at before `start`.
    pub lookback: usize,
    /// Initial value of the `FUNDS` and `VALUE` columns.
    pub budget: f64,
}

/// A source of daily bars for a single symbol.
pub trait BarSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Daily bars for `symbol` with `start <= date <= end`, ascending.
    fn fetch(
        &self,
        exchange: &str,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError>;
}

/// Supplies the aligned panel the simulation runs over.
///
/// The panel's date axis is the active-date index: calendar days missing
/// from it are skipped by the loop.
pub trait MarketDataProvider {
    fn load_data(&self, request: &DataRequest) -> Result<Panel, DataError>;
}

/// Benchmark index closes aligned to a set of trading dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineSeries {
    pub symbol: String,
    pub dates: Vec<NaiveDate>,
    pub close: Vec<f64>,
}

impl BaselineSeries {
    /// Day-over-day percentage returns; the first day is 0.
    pub fn daily_returns_pct(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.close.len());
        for (i, &close) in self.close.iter().enumerate() {
            let ret = if i == 0 {
                0.0
            } else {
                let prev = self.close[i - 1];
                if prev > 0.0 && close.is_finite() {
                    (close / prev - 1.0) * 100.0
                } else {
                    0.0
                }
            };
            out.push(ret);
        }
        out
    }
}

/// Supplies a benchmark series for comparison metrics (weighted runs only).
pub trait BaselineProvider {
    fn baseline(
        &self,
        exchange: &str,
        index_symbol: &str,
        dates: &[NaiveDate],
    ) -> Result<BaselineSeries, DataError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_returns_start_at_zero() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let series = BaselineSeries {
            symbol: "SPX".into(),
            dates: vec![d, d.succ_opt().unwrap(), d.succ_opt().unwrap().succ_opt().unwrap()],
            close: vec![100.0, 110.0, 99.0],
        };
        let r = series.daily_returns_pct();
        assert_eq!(r[0], 0.0);
        assert!((r[1] - 10.0).abs() < 1e-9);
        assert!((r[2] + 10.0).abs() < 1e-9);
    }

    #[test]
    fn data_error_display() {
        let err = DataError::SymbolNotFound {
            symbol: "AAA".into(),
            path: "data/abcd/AAA.csv".into(),
        };
        assert!(err.to_string().contains("AAA"));
    }
}

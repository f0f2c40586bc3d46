//! Daily bars from Parquet files.
//!
//! Layout: `{dir}/{exchange}/{SYMBOL}.parquet`, one file per symbol with
//! columns `date` (Date), `open`, `high`, `low`, `close` (f64) and `volume`
//! (u64). [`write_bars`] produces files in this layout.

use super::provider::{BarSource, DataError, RawBar};
use chrono::NaiveDate;
use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

pub struct ParquetSource {
    dir: PathBuf,
}

impl ParquetSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `{dir}/{exchange}/{SYMBOL}.parquet`
    pub fn symbol_path(&self, exchange: &str, symbol: &str) -> PathBuf {
        self.dir.join(exchange).join(format!("{symbol}.parquet"))
    }

    /// Store bars for a symbol, replacing any existing file.
    ///
    /// Writes to a `.tmp` sibling and renames it into place.
    pub fn write(&self, exchange: &str, symbol: &str, bars: &[RawBar]) -> Result<(), DataError> {
        let path = self.symbol_path(exchange, symbol);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("parquet.tmp");
        write_bars(bars, &tmp)?;
        fs::rename(&tmp, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            DataError::Io(format!("atomic rename failed: {e}"))
        })
    }
}

impl BarSource for ParquetSource {
    fn name(&self) -> &str {
        "parquet"
    }

    fn fetch(
        &self,
        exchange: &str,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError> {
        let path = self.symbol_path(exchange, symbol);
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
                path: path.display().to_string(),
            });
        }
        let mut bars = read_bars(&path)?;
        bars.retain(|b| b.date >= start && b.date <= end);
        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

// ── Parquet I/O helpers ─────────────────────────────────────────────

fn epoch() -> NaiveDate {
    NaiveDate::default()
}

fn bars_to_dataframe(bars: &[RawBar]) -> Result<DataFrame, DataError> {
    let dates: Vec<i32> = bars
        .iter()
        .map(|b| (b.date - epoch()).num_days() as i32)
        .collect();
    let opens: Vec<f64> = bars.iter().map(|b| b.open).collect();
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<u64> = bars.iter().map(|b| b.volume).collect();

    DataFrame::new(vec![
        Column::new("date".into(), dates)
            .cast(&DataType::Date)
            .map_err(|e| DataError::Parquet(format!("date cast: {e}")))?,
        Column::new("open".into(), opens),
        Column::new("high".into(), highs),
        Column::new("low".into(), lows),
        Column::new("close".into(), closes),
        Column::new("volume".into(), volumes),
    ])
    .map_err(|e| DataError::Parquet(format!("dataframe creation: {e}")))
}

/// Write bars to a Parquet file at `path`.
pub fn write_bars(bars: &[RawBar], path: &Path) -> Result<(), DataError> {
    let mut df = bars_to_dataframe(bars)?;
    let file =
        fs::File::create(path).map_err(|e| DataError::Parquet(format!("create file: {e}")))?;
    ParquetWriter::new(file)
        .finish(&mut df)
        .map_err(|e| DataError::Parquet(format!("write parquet: {e}")))?;
    Ok(())
}

fn read_bars(path: &Path) -> Result<Vec<RawBar>, DataError> {
    let file = fs::File::open(path).map_err(|e| DataError::Parquet(format!("open: {e}")))?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|e| DataError::Parquet(format!("read: {e}")))?;

    for name in ["date", "open", "high", "low", "close"] {
        if df.column(name).is_err() {
            return Err(DataError::Validation(format!(
                "{}: missing column '{name}'",
                path.display()
            )));
        }
    }
    dataframe_to_bars(&df)
}

fn dataframe_to_bars(df: &DataFrame) -> Result<Vec<RawBar>, DataError> {
    let col = |name: &str| {
        df.column(name)
            .map_err(|e| DataError::Parquet(format!("column read: {e}")))
    };
    let f64_col = |name: &str| -> Result<Float64Chunked, DataError> {
        col(name)?
            .f64()
            .cloned()
            .map_err(|e| DataError::Parquet(format!("{name} column type: {e}")))
    };

    let date_ca = col("date")?
        .date()
        .map_err(|e| DataError::Parquet(format!("date column type: {e}")))?
        .clone();
    let open_ca = f64_col("open")?;
    let high_ca = f64_col("high")?;
    let low_ca = f64_col("low")?;
    let close_ca = f64_col("close")?;
    let vol_ca = match df.column("volume") {
        Ok(c) => Some(
            c.u64()
                .map_err(|e| DataError::Parquet(format!("volume column type: {e}")))?
                .clone(),
        ),
        Err(_) => None,
    };

    let mut bars = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let days = date_ca
            .get(i)
            .ok_or_else(|| DataError::Parquet(format!("null date at row {i}")))?;
        bars.push(RawBar {
            date: epoch() + chrono::Duration::days(days as i64),
            open: open_ca.get(i).unwrap_or(f64::NAN),
            high: high_ca.get(i).unwrap_or(f64::NAN),
            low: low_ca.get(i).unwrap_or(f64::NAN),
            close: close_ca.get(i).unwrap_or(f64::NAN),
            volume: vol_ca.as_ref().and_then(|v| v.get(i)).unwrap_or(0),
        });
    }
    Ok(bars)
}

//! Daily bars from CSV files.
//!
//! Layout: `{dir}/{exchange}/{SYMBOL}.csv` with a header row naming at least
//! `date,open,high,low,close`; `volume` is optional. Column order does not
//! matter and header names are case-insensitive. Empty price cells load as
//! NaN and surface later as malformed data on the day they are needed.

use super::provider::{BarSource, DataError, RawBar};
use chrono::NaiveDate;
use std::fs::File;
use std::path::{Path, PathBuf};

pub struct CsvSource {
    dir: PathBuf,
}

impl CsvSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `{dir}/{exchange}/{SYMBOL}.csv`
    pub fn symbol_path(&self, exchange: &str, symbol: &str) -> PathBuf {
        self.dir.join(exchange).join(format!("{symbol}.csv"))
    }
}

impl BarSource for CsvSource {
    fn name(&self) -> &str {
        "csv"
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
        let file = File::open(&path)?;
        let mut bars = read_bars(file, &path)?;
        bars.retain(|b| b.date >= start && b.date <= end);
        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

/// Header positions of the columns we read.
struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord, path: &Path) -> Result<Self, DataError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| {
                DataError::Validation(format!("{}: missing column '{name}'", path.display()))
            })
        };
        Ok(Self {
            date: require("date")?,
            open: require("open")?,
            high: require("high")?,
            low: require("low")?,
            close: require("close")?,
            volume: find("volume"),
        })
    }
}

fn read_bars<R: std::io::Read>(reader: R, path: &Path) -> Result<Vec<RawBar>, DataError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let cols = Columns::from_headers(rdr.headers()?, path)?;

    let mut bars = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        // +2: one for the header, one for 1-based line numbers
        let at = |what: &str| format!("{} line {}: {what}", path.display(), line + 2);

        let raw_date = record.get(cols.date).unwrap_or("");
        let date = parse_date(raw_date)
            .ok_or_else(|| DataError::Validation(at(&format!("bad date '{raw_date}'"))))?;

        let price = |idx: usize, name: &str| -> Result<f64, DataError> {
            let cell = record.get(idx).unwrap_or("");
            if cell.is_empty() {
                return Ok(f64::NAN);
            }
            cell.parse::<f64>()
                .map_err(|_| DataError::Validation(at(&format!("bad {name} '{cell}'"))))
        };

        let volume = match cols.volume.and_then(|i| record.get(i)) {
            None | Some("") => 0,
            Some(cell) => cell
                .parse::<f64>()
                .map(|v| v.max(0.0) as u64)
                .map_err(|_| DataError::Validation(at(&format!("bad volume '{cell}'"))))?,
        };

        bars.push(RawBar {
            date,
            open: price(cols.open, "open")?,
            high: price(cols.high, "high")?,
            low: price(cols.low, "low")?,
            close: price(cols.close, "close")?,
            volume,
        });
    }
    Ok(bars)
}

/// Accepts `2010-01-04`, `20100104` and `2010/01/04`.
fn parse_date(s: &str) -> Option<NaiveDate> {
    ["%Y-%m-%d", "%Y%m%d", "%Y/%m/%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

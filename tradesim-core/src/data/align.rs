//! Multi-symbol time alignment.
//!
//! Symbols are aligned on the dates they all share. A date missing for any
//! symbol is dropped from the common timeline rather than filled, so the
//! panel never carries invented prices.

use super::provider::RawBar;
use crate::domain::{PriceTables, Table};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// Bars for several symbols on a shared timeline.
#[derive(Debug, Clone)]
pub struct AlignedBars {
    /// Common date axis, ascending.
    pub dates: Vec<NaiveDate>,
    /// Symbols in input order; the column order of every table.
    pub symbols: Vec<String>,
    pub prices: PriceTables,
    /// Dates present for some symbols but not all.
    pub dropped: Vec<NaiveDate>,
}

impl AlignedBars {
    /// Keep rows whose index satisfies `keep`.
    pub fn retain_rows(self, keep: impl Fn(usize, NaiveDate) -> bool) -> Self {
        let rows: Vec<usize> = self
            .dates
            .iter()
            .enumerate()
            .filter(|(i, d)| keep(*i, **d))
            .map(|(i, _)| i)
            .collect();
        let pick = |t: &Table<f64>| {
            table_from_rows(rows.iter().map(|&r| t.row(r).to_vec()).collect(), t.cols())
        };
        let prices = PriceTables {
            open: pick(&self.prices.open),
            high: pick(&self.prices.high),
            low: pick(&self.prices.low),
            close: pick(&self.prices.close),
        };
        Self {
            dates: rows.iter().map(|&r| self.dates[r]).collect(),
            symbols: self.symbols,
            prices,
            dropped: self.dropped,
        }
    }
}

/// Align symbols on the intersection of their dates.
///
/// If a symbol has two bars for the same date, the later one wins.
pub fn align_symbols(symbol_bars: Vec<(String, Vec<RawBar>)>) -> AlignedBars {
    let by_date: Vec<BTreeMap<NaiveDate, &RawBar>> = symbol_bars
        .iter()
        .map(|(_, bars)| bars.iter().map(|b| (b.date, b)).collect())
        .collect();

    let mut union = BTreeSet::new();
    for map in &by_date {
        union.extend(map.keys().copied());
    }

    let (dates, dropped): (Vec<NaiveDate>, Vec<NaiveDate>) = union
        .into_iter()
        .partition(|d| by_date.iter().all(|m| m.contains_key(d)));

    let rows_of = |field: fn(&RawBar) -> f64| -> Table<f64> {
        let rows: Vec<Vec<f64>> = dates
            .iter()
            .map(|d| by_date.iter().map(|m| field(m[d])).collect())
            .collect();
        table_from_rows(rows, by_date.len())
    };

    let prices = PriceTables {
        open: rows_of(|b| b.open),
        high: rows_of(|b| b.high),
        low: rows_of(|b| b.low),
        close: rows_of(|b| b.close),
    };

    AlignedBars {
        symbols: symbol_bars.iter().map(|(s, _)| s.clone()).collect(),
        dates,
        prices,
        dropped,
    }
}

/// Rows are built from complete date lookups, so they are never ragged; an
/// empty set keeps its column count.
fn table_from_rows(rows: Vec<Vec<f64>>, cols: usize) -> Table<f64> {
    if rows.is_empty() {
        return Table::filled(0, cols, 0.0);
    }
    Table::from_rows(rows).unwrap_or_else(|| Table::filled(0, cols, 0.0))
}

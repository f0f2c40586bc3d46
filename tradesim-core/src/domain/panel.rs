//! Daily panel: aligned price inputs plus the simulation's output columns.
//!
//! Inputs (`OPEN`, `HIGH`, `LOW`, `CLOSE`) are fixed at construction. Outputs
//! are written by the simulation loop through [`Panel::record_day`], which only
//! accepts strictly increasing row indices: a row is written at most once and
//! never behind a row that was already written.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::table::{Table, TableView};
use crate::data::provider::DataError;

/// Panel field names, in export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Open,
    High,
    Low,
    Close,
    Position,
    Order,
    FilledOrder,
    DailyPnl,
    TotalPnl,
    Funds,
    Margin,
    Value,
    CostToTrade,
}

impl Field {
    pub const ALL: [Field; 13] = [
        Field::Open,
        Field::High,
        Field::Low,
        Field::Close,
        Field::Position,
        Field::Order,
        Field::FilledOrder,
        Field::DailyPnl,
        Field::TotalPnl,
        Field::Funds,
        Field::Margin,
        Field::Value,
        Field::CostToTrade,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::Open => "OPEN",
            Field::High => "HIGH",
            Field::Low => "LOW",
            Field::Close => "CLOSE",
            Field::Position => "POSITION",
            Field::Order => "ORDER",
            Field::FilledOrder => "FILLED_ORDER",
            Field::DailyPnl => "DAILY_PNL",
            Field::TotalPnl => "TOTAL_PNL",
            Field::Funds => "FUNDS",
            Field::Margin => "MARGIN",
            Field::Value => "VALUE",
            Field::CostToTrade => "COST_TO_TRADE",
        }
    }

    /// True for fields stored once per date rather than once per instrument.
    pub fn is_portfolio_level(&self) -> bool {
        matches!(self, Field::Funds | Field::Margin | Field::Value)
    }
}

/// OHLC input tables, one row per date.
#[derive(Debug, Clone)]
pub struct PriceTables {
    pub open: Table<f64>,
    pub high: Table<f64>,
    pub low: Table<f64>,
    pub close: Table<f64>,
}

/// Everything the loop writes for one trading day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayRow {
    pub position: Vec<i64>,
    pub order: Vec<i64>,
    pub filled_order: Vec<i64>,
    pub daily_pnl: Vec<f64>,
    pub total_pnl: Vec<f64>,
    pub cost_to_trade: Vec<f64>,
    pub funds: f64,
    pub margin: f64,
    pub value: f64,
}

#[derive(Debug, Clone)]
pub struct Panel {
    dates: Vec<NaiveDate>,
    instruments: Vec<String>,
    open: Table<f64>,
    high: Table<f64>,
    low: Table<f64>,
    close: Table<f64>,
    position: Table<i64>,
    order: Table<i64>,
    filled_order: Table<i64>,
    daily_pnl: Table<f64>,
    total_pnl: Table<f64>,
    cost_to_trade: Table<f64>,
    funds: Vec<f64>,
    margin: Vec<f64>,
    value: Vec<f64>,
    last_recorded: Option<usize>,
}

impl Panel {
    /// Build a panel from aligned prices.
    ///
    /// Output columns start at zero, except `FUNDS` and `VALUE` which start at
    /// `budget` on every row. Dates must be strictly ascending and every price
    /// table must be `dates × instruments`.
    pub fn new(
        dates: Vec<NaiveDate>,
        instruments: Vec<String>,
        prices: PriceTables,
        budget: f64,
    ) -> Result<Self, DataError> {
        if dates.windows(2).any(|w| w[0] >= w[1]) {
            return Err(DataError::Validation(
                "panel dates must be strictly ascending".into(),
            ));
        }
        let (rows, cols) = (dates.len(), instruments.len());
        for (name, table) in [
            ("open", &prices.open),
            ("high", &prices.high),
            ("low", &prices.low),
            ("close", &prices.close),
        ] {
            if table.rows() != rows || table.cols() != cols {
                return Err(DataError::Validation(format!(
                    "{name} table is {}x{}, expected {rows}x{cols}",
                    table.rows(),
                    table.cols()
                )));
            }
        }

        Ok(Self {
            dates,
            instruments,
            open: prices.open,
            high: prices.high,
            low: prices.low,
            close: prices.close,
            position: Table::filled(rows, cols, 0),
            order: Table::filled(rows, cols, 0),
            filled_order: Table::filled(rows, cols, 0),
            daily_pnl: Table::filled(rows, cols, 0.0),
            total_pnl: Table::filled(rows, cols, 0.0),
            cost_to_trade: Table::filled(rows, cols, 0.0),
            funds: vec![budget; rows],
            margin: vec![0.0; rows],
            value: vec![budget; rows],
            last_recorded: None,
        })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn instruments(&self) -> &[String] {
        &self.instruments
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Row of `date` in the active-date index.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    pub fn open(&self) -> &Table<f64> {
        &self.open
    }

    pub fn high(&self) -> &Table<f64> {
        &self.high
    }

    pub fn low(&self) -> &Table<f64> {
        &self.low
    }

    pub fn close(&self) -> &Table<f64> {
        &self.close
    }

    pub fn position(&self) -> &Table<i64> {
        &self.position
    }

    pub fn order(&self) -> &Table<i64> {
        &self.order
    }

    pub fn filled_order(&self) -> &Table<i64> {
        &self.filled_order
    }

    pub fn daily_pnl(&self) -> &Table<f64> {
        &self.daily_pnl
    }

    pub fn total_pnl(&self) -> &Table<f64> {
        &self.total_pnl
    }

    pub fn cost_to_trade(&self) -> &Table<f64> {
        &self.cost_to_trade
    }

    pub fn funds(&self) -> &[f64] {
        &self.funds
    }

    pub fn margin(&self) -> &[f64] {
        &self.margin
    }

    pub fn value(&self) -> &[f64] {
        &self.value
    }

    /// Highest row written by the simulation so far.
    pub fn last_recorded(&self) -> Option<usize> {
        self.last_recorded
    }

    /// Borrow rows `[start, end)` of every field.
    pub fn window(&self, start: usize, end: usize) -> PanelWindow<'_> {
        assert!(start <= end && end <= self.len(), "window out of bounds");
        PanelWindow {
            panel: self,
            start,
            end,
        }
    }

    /// Write one simulated day.
    ///
    /// # Panics
    /// If `index` is not past the last recorded row, or the row widths do not
    /// match the instrument count. Both indicate a bug in the caller.
    pub(crate) fn record_day(&mut self, index: usize, row: DayRow) {
        assert!(
            self.last_recorded.map_or(true, |last| index > last),
            "panel row {index} written out of order (last written: {:?})",
            self.last_recorded
        );
        self.position.set_row(index, &row.position);
        self.order.set_row(index, &row.order);
        self.filled_order.set_row(index, &row.filled_order);
        self.daily_pnl.set_row(index, &row.daily_pnl);
        self.total_pnl.set_row(index, &row.total_pnl);
        self.cost_to_trade.set_row(index, &row.cost_to_trade);
        self.funds[index] = row.funds;
        self.margin[index] = row.margin;
        self.value[index] = row.value;
        self.last_recorded = Some(index);
    }
}

/// Borrowed row range of a [`Panel`], handed to strategies and writers.
#[derive(Debug, Clone, Copy)]
pub struct PanelWindow<'a> {
    panel: &'a Panel,
    start: usize,
    end: usize,
}

impl<'a> PanelWindow<'a> {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Panel row of the first date in this window.
    pub fn start_index(&self) -> usize {
        self.start
    }

    pub fn dates(&self) -> &'a [NaiveDate] {
        &self.panel.dates[self.start..self.end]
    }

    pub fn instruments(&self) -> &'a [String] {
        &self.panel.instruments
    }

    pub fn open(&self) -> TableView<'a, f64> {
        self.panel.open.view(self.start, self.end)
    }

    pub fn high(&self) -> TableView<'a, f64> {
        self.panel.high.view(self.start, self.end)
    }

    pub fn low(&self) -> TableView<'a, f64> {
        self.panel.low.view(self.start, self.end)
    }

    pub fn close(&self) -> TableView<'a, f64> {
        self.panel.close.view(self.start, self.end)
    }

    pub fn position(&self) -> TableView<'a, i64> {
        self.panel.position.view(self.start, self.end)
    }

    pub fn order(&self) -> TableView<'a, i64> {
        self.panel.order.view(self.start, self.end)
    }

    pub fn filled_order(&self) -> TableView<'a, i64> {
        self.panel.filled_order.view(self.start, self.end)
    }

    pub fn daily_pnl(&self) -> TableView<'a, f64> {
        self.panel.daily_pnl.view(self.start, self.end)
    }

    pub fn total_pnl(&self) -> TableView<'a, f64> {
        self.panel.total_pnl.view(self.start, self.end)
    }

    pub fn cost_to_trade(&self) -> TableView<'a, f64> {
        self.panel.cost_to_trade.view(self.start, self.end)
    }

    pub fn funds(&self) -> &'a [f64] {
        &self.panel.funds[self.start..self.end]
    }

    pub fn margin(&self) -> &'a [f64] {
        &self.panel.margin[self.start..self.end]
    }

    pub fn value(&self) -> &'a [f64] {
        &self.panel.value[self.start..self.end]
    }

    /// Per-instrument float field by name; `None` for integer and
    /// portfolio-level fields.
    pub fn float_field(&self, field: Field) -> Option<TableView<'a, f64>> {
        match field {
            Field::Open => Some(self.open()),
            Field::High => Some(self.high()),
            Field::Low => Some(self.low()),
            Field::Close => Some(self.close()),
            Field::DailyPnl => Some(self.daily_pnl()),
            Field::TotalPnl => Some(self.total_pnl()),
            Field::CostToTrade => Some(self.cost_to_trade()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn prices(rows: usize, cols: usize) -> PriceTables {
        PriceTables {
            open: Table::filled(rows, cols, 100.0),
            high: Table::filled(rows, cols, 101.0),
            low: Table::filled(rows, cols, 99.0),
            close: Table::filled(rows, cols, 100.5),
        }
    }

    fn row(n: usize, position: i64) -> DayRow {
        DayRow {
            position: vec![position; n],
            order: vec![0; n],
            filled_order: vec![0; n],
            daily_pnl: vec![0.0; n],
            total_pnl: vec![0.0; n],
            cost_to_trade: vec![0.0; n],
            funds: 1.0,
            margin: 0.0,
            value: 1.0,
        }
    }

    #[test]
    fn new_initializes_outputs() {
        let panel = Panel::new(vec![d(2), d(3)], vec!["AAA".into()], prices(2, 1), 500.0).unwrap();
        assert_eq!(panel.funds(), &[500.0, 500.0]);
        assert_eq!(panel.value(), &[500.0, 500.0]);
        assert_eq!(panel.position().row(1), &[0]);
        assert_eq!(panel.total_pnl().row(0), &[0.0]);
        assert!(panel.last_recorded().is_none());
    }

    #[test]
    fn new_rejects_unsorted_dates() {
        let err = Panel::new(vec![d(3), d(2)], vec!["AAA".into()], prices(2, 1), 1.0);
        assert!(err.is_err());
    }

    #[test]
    fn new_rejects_shape_mismatch() {
        let err = Panel::new(vec![d(2), d(3)], vec!["AAA".into()], prices(3, 1), 1.0);
        assert!(err.is_err());
    }

    #[test]
    fn index_of_finds_dates() {
        let panel = Panel::new(vec![d(2), d(4)], vec!["AAA".into()], prices(2, 1), 1.0).unwrap();
        assert_eq!(panel.index_of(d(4)), Some(1));
        assert_eq!(panel.index_of(d(3)), None);
    }

    #[test]
    fn record_day_writes_all_columns() {
        let mut panel =
            Panel::new(vec![d(2), d(3)], vec!["AAA".into(), "BBB".into()], prices(2, 2), 1.0)
                .unwrap();
        panel.record_day(1, row(2, 7));
        assert_eq!(panel.position().row(1), &[7, 7]);
        assert_eq!(panel.last_recorded(), Some(1));
    }

    #[test]
    #[should_panic(expected = "out of order")]
    fn record_day_rejects_rewrites() {
        let mut panel = Panel::new(vec![d(2), d(3)], vec!["AAA".into()], prices(2, 1), 1.0).unwrap();
        panel.record_day(1, row(1, 1));
        panel.record_day(1, row(1, 2));
    }

    #[test]
    fn window_excludes_end_row() {
        let panel =
            Panel::new(vec![d(2), d(3), d(4)], vec!["AAA".into()], prices(3, 1), 1.0).unwrap();
        let w = panel.window(0, 2);
        assert_eq!(w.len(), 2);
        assert_eq!(w.dates(), &[d(2), d(3)]);
        assert_eq!(w.close().len(), 2);
        assert_eq!(w.funds().len(), 2);
        assert!(w.float_field(Field::Position).is_none());
        assert!(w.float_field(Field::Close).is_some());
    }

    #[test]
    fn field_names_match_export_headers() {
        assert_eq!(Field::CostToTrade.name(), "COST_TO_TRADE");
        assert!(Field::Funds.is_portfolio_level());
        assert!(!Field::Position.is_portfolio_level());
    }
}

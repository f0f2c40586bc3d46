//! Panel construction from a bar source.
//!
//! `PanelLoader` fetches every instrument, aligns them on their common dates
//! and trims the timeline to the requested range plus enough history for the
//! strategy's lookback window and the first day's prior session.

use super::align::align_symbols;
use super::provider::{
    BarSource, BaselineProvider, BaselineSeries, DataError, DataRequest, MarketDataProvider,
};
use crate::calendar::is_business_day;
use crate::domain::Panel;
use chrono::{Days, NaiveDate};
use log::{debug, info, warn};

/// Calendar days fetched before `start` on top of the lookback, to cover
/// weekends and holidays.
const HISTORY_PADDING_DAYS: u64 = 14;

pub struct PanelLoader<S: BarSource> {
    source: S,
}

impl<S: BarSource> PanelLoader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// First calendar date fetched for a request. Fails when the lookback
    /// reaches past the earliest representable date.
    fn fetch_start(request: &DataRequest) -> Result<NaiveDate, DataError> {
        let history = u64::try_from(request.lookback.max(1)).unwrap_or(u64::MAX);
        let days = history
            .saturating_mul(2)
            .saturating_add(HISTORY_PADDING_DAYS);
        request
            .start
            .checked_sub_days(Days::new(days))
            .ok_or_else(|| {
                DataError::Validation(format!(
                    "lookback of {} rows reaches before the earliest supported date",
                    request.lookback
                ))
            })
    }
}

impl<S: BarSource> MarketDataProvider for PanelLoader<S> {
    fn load_data(&self, request: &DataRequest) -> Result<Panel, DataError> {
        if request.instruments.is_empty() {
            return Err(DataError::Validation("no instruments requested".into()));
        }
        if request.start > request.end {
            return Err(DataError::Validation(format!(
                "start date {} is after end date {}",
                request.start, request.end
            )));
        }

        let fetch_start = Self::fetch_start(request)?;
        let mut per_symbol = Vec::with_capacity(request.instruments.len());
        for symbol in &request.instruments {
            let bars = self
                .source
                .fetch(&request.exchange, symbol, fetch_start, request.end)?;
            if bars.is_empty() {
                return Err(DataError::EmptyRange {
                    symbol: symbol.clone(),
                    start: fetch_start,
                    end: request.end,
                });
            }
            debug!("{}: {} bars for {symbol}", self.source.name(), bars.len());
            per_symbol.push((symbol.clone(), bars));
        }

        let aligned = align_symbols(per_symbol);
        if !aligned.dropped.is_empty() {
            warn!(
                "dropped {} dates missing for at least one instrument (first: {})",
                aligned.dropped.len(),
                aligned.dropped[0]
            );
        }
        // Weekend rows would sit between two trading days the loop treats as
        // consecutive.
        let weekend_rows = aligned.dates.iter().filter(|d| !is_business_day(**d)).count();
        if weekend_rows > 0 {
            debug!("ignoring {weekend_rows} weekend rows");
        }
        let aligned = aligned.retain_rows(|_, date| is_business_day(date));

        let first_in_range = aligned.dates.partition_point(|d| *d < request.start);
        let history_from = first_in_range.saturating_sub(request.lookback.max(1));
        let end = request.end;
        let trimmed = aligned.retain_rows(|i, date| i >= history_from && date <= end);

        let in_range = trimmed.dates.len() - (first_in_range - history_from);
        if in_range == 0 {
            warn!(
                "no common trading dates between {} and {}",
                request.start, request.end
            );
        }
        info!(
            "loaded {} instruments from {}: {} trading dates, {} history rows",
            trimmed.symbols.len(),
            self.source.name(),
            in_range,
            first_in_range - history_from
        );

        Panel::new(
            trimmed.dates,
            trimmed.symbols,
            trimmed.prices,
            request.budget,
        )
    }
}

impl<S: BarSource> BaselineProvider for PanelLoader<S> {
    fn baseline(
        &self,
        exchange: &str,
        index_symbol: &str,
        dates: &[NaiveDate],
    ) -> Result<BaselineSeries, DataError> {
        let (Some(&first), Some(&last)) = (dates.first(), dates.last()) else {
            return Ok(BaselineSeries {
                symbol: index_symbol.to_string(),
                dates: Vec::new(),
                close: Vec::new(),
            });
        };

        let bars = self.source.fetch(
            exchange,
            index_symbol,
            first
                .checked_sub_days(Days::new(HISTORY_PADDING_DAYS))
                .unwrap_or(first),
            last,
        )?;

        // Carry the latest close at or before each date forward.
        let mut close = Vec::with_capacity(dates.len());
        let mut cursor = 0;
        let mut latest = f64::NAN;
        for &date in dates {
            while cursor < bars.len() && bars[cursor].date <= date {
                if bars[cursor].close.is_finite() {
                    latest = bars[cursor].close;
                }
                cursor += 1;
            }
            close.push(latest);
        }

        Ok(BaselineSeries {
            symbol: index_symbol.to_string(),
            dates: dates.to_vec(),
            close,
        })
    }
}

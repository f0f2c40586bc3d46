//! Business-day calendar.
//!
//! The simulation walks every weekday between the start and end dates. Which
//! of those days actually trade is decided by the panel's date index, not here.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Every Monday–Friday date in `[start, end]`, ascending.
///
/// Returns an empty calendar when `start > end`.
pub fn business_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        if is_business_day(current) {
            days.push(current);
        }
        current += Duration::days(1);
    }
    days
}

/// True for Monday through Friday.
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Format used in trading-date log lines, e.g. `04 Jan 2010`.
pub fn log_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

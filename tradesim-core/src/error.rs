//! Fatal simulation errors.
//!
//! Every variant aborts the run at the point of detection. Checks for a day
//! run before that day's panel row is written, so an error never leaves a
//! half-written row behind. Insolvency is not an error: see
//! [`RunStatus::Halted`](crate::engine::RunStatus::Halted).

use chrono::NaiveDate;
use thiserror::Error;

use crate::data::provider::DataError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("lookback is invalid: expected a non-negative integer, got {value}")]
    InvalidLookback { value: i64 },

    #[error(
        "{date}: signal for {instrument} is {value}; signal can only be -1 (sell), 0 (hold) or 1 (buy)"
    )]
    InvalidSignal {
        date: NaiveDate,
        instrument: String,
        value: f64,
    },

    #[error(
        "{date}: weight for {instrument} is {value}; weights cannot be negative and should sum to <= 1"
    )]
    InvalidWeight {
        date: NaiveDate,
        instrument: String,
        value: f64,
    },

    #[error("{date}: {field} for {instrument} is {value}; data not formatted properly")]
    MalformedData {
        date: NaiveDate,
        instrument: String,
        field: &'static str,
        value: f64,
    },

    #[error("{date}: {what} has {got} entries for {expected} instruments")]
    OrderShape {
        date: NaiveDate,
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

impl SimError {
    /// Trading date the error was raised on, if it happened inside the loop.
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            SimError::InvalidSignal { date, .. }
            | SimError::InvalidWeight { date, .. }
            | SimError::MalformedData { date, .. }
            | SimError::OrderShape { date, .. } => Some(*date),
            SimError::InvalidLookback { .. } | SimError::Data(_) => None,
        }
    }
}

//! Account state carried from one trading day to the next.

use serde::{Deserialize, Serialize};

/// Cash, positions and margin after the most recent execution.
///
/// The loop owns exactly one of these at a time and replaces it with the
/// executor's result each active day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountState {
    /// Available cash.
    pub cash: f64,
    /// Share count per instrument (negative = short).
    pub positions: Vec<i64>,
    /// Cash pledged against short positions.
    pub margin: f64,
    /// Trading cost realized by the last execution, per instrument.
    pub cost_to_trade: Vec<f64>,
}

impl AccountState {
    /// State seeded from a prior panel row: positions and margin carried,
    /// cost to trade zeroed.
    pub fn seeded(cash: f64, positions: Vec<i64>, margin: f64) -> Self {
        let cost_to_trade = vec![0.0; positions.len()];
        Self {
            cash,
            positions,
            margin,
            cost_to_trade,
        }
    }
}

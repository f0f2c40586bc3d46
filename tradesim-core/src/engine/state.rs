//! Simulation configuration, run status, and the report handed back to callers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{OrderMode, Panel, PanelWindow};
use crate::error::SimError;

/// Rows of history passed to the strategy each day (the current day excluded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Lookback(usize);

impl Lookback {
    pub fn new(value: i64) -> Result<Self, SimError> {
        usize::try_from(value)
            .map(Self)
            .map_err(|_| SimError::InvalidLookback { value })
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl TryFrom<i64> for Lookback {
    type Error = SimError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Lookback> for i64 {
    fn from(lookback: Lookback) -> Self {
        lookback.0 as i64
    }
}

/// Configuration for a single simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub lookback: Lookback,
    /// Starting cash.
    pub budget: f64,
    /// Benchmark index for weighted runs.
    pub base_index: String,
    /// Log a detailed block for every trading day.
    pub verbose: bool,
}

impl SimulationConfig {
    pub fn new(start: NaiveDate, end: NaiveDate, lookback: Lookback, budget: f64) -> Self {
        Self {
            start,
            end,
            lookback,
            budget,
            base_index: DEFAULT_BASE_INDEX.to_string(),
            verbose: false,
        }
    }
}

pub const DEFAULT_BASE_INDEX: &str = "SPX";

/// Where a run stands. `Halted` and `Completed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunStatus {
    /// No active day reached yet.
    NotStarted,
    /// The first active day has been processed.
    Seeded,
    /// At least one active day after the first has been processed.
    Running,
    /// Weighted-mode portfolio value fell to zero or below on `date`.
    Halted { date: NaiveDate, value: f64 },
    /// Every calendar day was visited.
    Completed,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Halted { .. } | RunStatus::Completed)
    }

    pub fn is_halted(&self) -> bool {
        matches!(self, RunStatus::Halted { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            RunStatus::NotStarted => "not started",
            RunStatus::Seeded => "seeded",
            RunStatus::Running => "running",
            RunStatus::Halted { .. } => "halted",
            RunStatus::Completed => "completed",
        }
    }
}

/// Outcome of a simulation. Owns the panel with every written row.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    panel: Panel,
    pub status: RunStatus,
    /// Panel row of the first processed day.
    pub first_index: Option<usize>,
    /// Panel row of the last processed day.
    pub last_index: Option<usize>,
    /// Calendar days processed, ascending.
    pub processed_days: Vec<NaiveDate>,
    /// Calendar days with no market data.
    pub skipped_days: Vec<NaiveDate>,
    /// Order mode of the last processed day.
    pub last_mode: Option<OrderMode>,
    /// `VALUE` on the last processed day.
    pub final_value: Option<f64>,
    /// Benchmark to compare against; set when the last day was weighted.
    pub baseline_index: Option<String>,
}

impl SimulationReport {
    pub(crate) fn new(panel: Panel) -> Self {
        Self {
            panel,
            status: RunStatus::NotStarted,
            first_index: None,
            last_index: None,
            processed_days: Vec::new(),
            skipped_days: Vec::new(),
            last_mode: None,
            final_value: None,
            baseline_index: None,
        }
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub(crate) fn panel_mut(&mut self) -> &mut Panel {
        &mut self.panel
    }

    /// Rows from the first active day through the last processed day.
    pub fn result_window(&self) -> Option<PanelWindow<'_>> {
        match (self.first_index, self.last_index) {
            (Some(first), Some(last)) => Some(self.panel.window(first, last + 1)),
            _ => None,
        }
    }

    pub fn is_weighted(&self) -> bool {
        self.last_mode == Some(OrderMode::Weighted)
    }
}

//! Simulation engine: the day-by-day loop and its collaborators.
//!
//! The loop consumes a [`Panel`](crate::domain::Panel) from a market data
//! provider and, per active day:
//!
//! 1. Strategy: lookback window in, order request out
//! 2. Validation: signal and weights checked, weights normalized
//! 3. Sizing (weighted mode) and execution: the account state advances
//! 4. Accounting: positions, P&L, funds, margin and value written to the panel

pub mod accounting;
pub mod cost_model;
pub mod executor;
pub mod loop_runner;
pub mod state;

pub use cost_model::CostModel;
pub use executor::{Execution, ExecutionContext, MarginExecutor, OrderExecutor};
pub use loop_runner::{run_simulation, DayOutcome, Simulation};
pub use state::{Lookback, RunStatus, SimulationConfig, SimulationReport, DEFAULT_BASE_INDEX};

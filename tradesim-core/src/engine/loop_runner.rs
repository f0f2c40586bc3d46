//! Day-by-day simulation loop.
//!
//! For every business day in `[start, end]`:
//! 1. Skip it if the panel has no row for it.
//! 2. Hand the strategy the lookback window `[end - lookback, end)`.
//! 3. Validate the request, read today's and yesterday's prices.
//! 4. Size (weighted mode) or diff against the prior position (signal mode).
//! 5. Execute, then write the day's row: positions, orders, P&L, funds,
//!    margin, value, cost to trade.
//! 6. Stop early if a weighted day leaves the portfolio insolvent.
//!
//! Every check for a day runs before its row is written.

use chrono::NaiveDate;
use log::{info, warn};

use crate::calendar::{business_days, log_date};
use crate::domain::order::check_len;
use crate::domain::{
    AccountState, DayRow, Order, OrderIntent, OrderMode, OrderRequest, Panel, WeightedOrder,
};
use crate::error::SimError;
use crate::sizers::OrderSizer;
use crate::strategies::Strategy;

use super::accounting::{daily_pnl, margin_at_close, value_at_close, value_at_open};
use super::executor::{ExecutionContext, OrderExecutor};
use super::state::{RunStatus, SimulationConfig, SimulationReport};

/// Prices the loop needs for one trading day.
struct DayPrices {
    open: Vec<f64>,
    close: Vec<f64>,
    high: Vec<f64>,
    low: Vec<f64>,
    close_last: Vec<f64>,
}

impl DayPrices {
    /// Read row `end` and the open/close of row `end - 1`, rejecting any
    /// non-finite value.
    fn read(panel: &Panel, end: usize, date: NaiveDate) -> Result<Self, SimError> {
        let instruments = panel.instruments();
        let check = |values: &[f64], field: &'static str| -> Result<Vec<f64>, SimError> {
            if let Some((i, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
                return Err(SimError::MalformedData {
                    date,
                    instrument: instruments[i].clone(),
                    field,
                    value,
                });
            }
            Ok(values.to_vec())
        };
        check(panel.open().row(end - 1), "previous OPEN")?;
        Ok(Self {
            open: check(panel.open().row(end), "OPEN")?,
            close: check(panel.close().row(end), "CLOSE")?,
            high: check(panel.high().row(end), "HIGH")?,
            low: check(panel.low().row(end), "LOW")?,
            close_last: check(panel.close().row(end - 1), "previous CLOSE")?,
        })
    }
}

/// What [`Simulation::step`] did with a calendar day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DayOutcome {
    /// No panel row for the date.
    Skipped,
    /// The date is panel row 0; there is no prior session to trade from.
    NoPriorSession,
    /// The day was traded and its row written.
    Traded { value: f64 },
    /// The day was traded, its row written, and the portfolio is insolvent.
    Halted { value: f64 },
    /// The run already halted, or the date is not after the last traded day.
    Ignored,
}

/// The simulation state machine, advanced one calendar day at a time.
///
/// [`run_simulation`] drives it over the business-day calendar; callers that
/// need to observe the panel between days can step it themselves.
pub struct Simulation<'a> {
    config: &'a SimulationConfig,
    strategy: &'a dyn Strategy,
    sizer: &'a dyn OrderSizer,
    executor: &'a dyn OrderExecutor,
    instruments: Vec<String>,
    account: Option<AccountState>,
    report: SimulationReport,
}

impl<'a> Simulation<'a> {
    pub fn new(
        panel: Panel,
        config: &'a SimulationConfig,
        strategy: &'a dyn Strategy,
        sizer: &'a dyn OrderSizer,
        executor: &'a dyn OrderExecutor,
    ) -> Self {
        let instruments = panel.instruments().to_vec();
        Self {
            config,
            strategy,
            sizer,
            executor,
            instruments,
            account: None,
            report: SimulationReport::new(panel),
        }
    }

    pub fn status(&self) -> RunStatus {
        self.report.status
    }

    pub fn panel(&self) -> &Panel {
        self.report.panel()
    }

    /// Account state after the last traded day.
    pub fn account(&self) -> Option<&AccountState> {
        self.account.as_ref()
    }

    /// Process one calendar day.
    ///
    /// On error nothing is written for `date` and the simulation should be
    /// abandoned.
    pub fn step(&mut self, date: NaiveDate) -> Result<DayOutcome, SimError> {
        let past_last = self
            .report
            .processed_days
            .last()
            .is_some_and(|last| date <= *last);
        if self.report.status.is_halted() || past_last {
            return Ok(DayOutcome::Ignored);
        }

        let Some(end) = self.report.panel().index_of(date) else {
            info!("{}: no market data, skipping", log_date(date));
            self.report.skipped_days.push(date);
            return Ok(DayOutcome::Skipped);
        };
        if end == 0 {
            info!("{}: no prior session to trade from, skipping", log_date(date));
            return Ok(DayOutcome::NoPriorSession);
        }
        info!("Trading date: {}", log_date(date));

        let n = self.instruments.len();
        let panel = self.report.panel();
        let prior = match &self.account {
            Some(state) => state.clone(),
            None => AccountState::seeded(
                self.config.budget,
                panel.position().row(end - 1).to_vec(),
                panel.margin()[end - 1],
            ),
        };

        // ─── Strategy ───
        let start = end.saturating_sub(self.config.lookback.get());
        let request = self.strategy.decide(&panel.window(start, end));
        let signal = request.validate_signal(date, &self.instruments)?;
        let prices = DayPrices::read(panel, end, date)?;

        // zero slippage: the hook cost models plug into
        let slippage = vec![0.0; n];
        let position_last = panel.position().row(end - 1).to_vec();
        let total_last = panel.total_pnl().row(end - 1).to_vec();
        let value = value_at_open(prior.cash, prior.margin, &position_last, &prices.open);

        // ─── Order ───
        let (order, costs_enabled) = match request {
            OrderRequest::Weighted { weights, .. } => {
                let weighted = WeightedOrder::new(date, &self.instruments, signal, weights)?;
                let quantity =
                    self.sizer
                        .size(&weighted, &prices.open, &slippage, value, &position_last);
                check_len(date, "sized quantity", n, quantity.len())?;
                (Order::new(OrderIntent::Weighted(weighted), quantity), true)
            }
            OrderRequest::Signal { .. } => {
                let quantity = signal
                    .iter()
                    .zip(&position_last)
                    .map(|(s, &p)| s.as_i64() - p)
                    .collect();
                (Order::new(OrderIntent::Signal { signal }, quantity), false)
            }
        };
        let mode = order.mode();

        // ─── Execution ───
        let execution = self.executor.execute(
            &order,
            &ExecutionContext {
                prior_position: &position_last,
                slippage: &slippage,
                reference_price: &prices.open,
                cash: prior.cash,
                margin: prior.margin,
                costs_enabled,
            },
        );
        check_len(date, "executed positions", n, execution.positions.len())?;
        check_len(date, "cost to trade", n, execution.cost_to_trade.len())?;

        // ─── Accounting ───
        let positions = execution.positions;
        let filled_order: Vec<i64> = positions
            .iter()
            .zip(&position_last)
            .map(|(p, l)| p - l)
            .collect();
        let pnl = daily_pnl(
            &positions,
            &position_last,
            &prices.open,
            &prices.close,
            &prices.close_last,
            &execution.cost_to_trade,
        );
        let total_pnl: Vec<f64> = pnl.iter().zip(&total_last).map(|(d, t)| d + t).collect();
        let margin_close = margin_at_close(&positions, &prices.close);
        let value_close = value_at_close(
            execution.cash,
            execution.margin,
            margin_close,
            &positions,
            &prices.close,
        );

        if self.config.verbose {
            info!(
                "{}\n  instruments    : {:?}\n  open / close   : {:?} / {:?}\n  high / low     : {:?} / {:?}\n  order          : {:?}\n  positions      : {:?}\n  cost to trade  : {:?}\n  available funds: {:.2}\n  margin funds   : {:.2}\n  pnl            : {:.2}\n  portfolio value: {:.2}",
                log_date(date),
                self.instruments,
                prices.open,
                prices.close,
                prices.high,
                prices.low,
                order.quantity,
                positions,
                execution.cost_to_trade,
                execution.cash,
                execution.margin,
                pnl.iter().sum::<f64>(),
                value_close
            );
        }

        self.report.panel_mut().record_day(
            end,
            DayRow {
                position: positions.clone(),
                order: order.quantity,
                filled_order,
                daily_pnl: pnl,
                total_pnl,
                cost_to_trade: execution.cost_to_trade.clone(),
                funds: execution.cash,
                margin: margin_close,
                value: value_close,
            },
        );

        self.account = Some(AccountState {
            cash: execution.cash,
            positions,
            margin: execution.margin,
            cost_to_trade: execution.cost_to_trade,
        });

        let report = &mut self.report;
        if report.first_index.is_none() {
            report.first_index = Some(end);
            report.status = RunStatus::Seeded;
        } else {
            report.status = RunStatus::Running;
        }
        report.last_index = Some(end);
        report.processed_days.push(date);
        report.last_mode = Some(mode);
        report.final_value = Some(value_close);

        if mode == OrderMode::Weighted && value_close <= 0.0 {
            warn!(
                "{}: portfolio value {value_close:.2} is not positive, insolvent; stopping",
                log_date(date)
            );
            report.status = RunStatus::Halted {
                date,
                value: value_close,
            };
            return Ok(DayOutcome::Halted { value: value_close });
        }
        Ok(DayOutcome::Traded { value: value_close })
    }

    /// Close the run and hand back the report.
    pub fn finish(mut self) -> SimulationReport {
        let report = &mut self.report;
        if matches!(report.status, RunStatus::Seeded | RunStatus::Running) {
            report.status = RunStatus::Completed;
        }
        if report.is_weighted() {
            report.baseline_index = Some(self.config.base_index.clone());
            if let Some(value) = report.final_value {
                info!("Final portfolio value: {value:.2}");
            }
        }
        info!(
            "simulation {}: {} days processed, {} skipped",
            report.status.label(),
            report.processed_days.len(),
            report.skipped_days.len()
        );
        self.report
    }
}

/// Run the simulation over `panel` and return the report that owns it.
///
/// The panel's dates are the active-date index. Calendar days missing from
/// it are skipped. The first active day is seeded from the row before it,
/// so a day on panel row 0 cannot be traded and is passed over.
pub fn run_simulation(
    panel: Panel,
    config: &SimulationConfig,
    strategy: &dyn Strategy,
    sizer: &dyn OrderSizer,
    executor: &dyn OrderExecutor,
) -> Result<SimulationReport, SimError> {
    info!(
        "simulating {} over {} instruments from {} to {} (lookback {})",
        strategy.name(),
        panel.instruments().len(),
        config.start,
        config.end,
        config.lookback.get()
    );

    let mut sim = Simulation::new(panel, config, strategy, sizer, executor);
    for date in business_days(config.start, config.end) {
        if let DayOutcome::Halted { .. } = sim.step(date)? {
            break;
        }
    }
    Ok(sim.finish())
}

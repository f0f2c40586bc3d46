//! Order execution: turns a day's order into the next account state.
//!
//! The executor is the single point where cash, positions and margin change.
//! [`MarginExecutor`] is the default:
//!
//! - Reductions (selling longs, covering shorts) run first for every
//!   instrument, then increases, so freed cash can fund new positions.
//! - Buying a long pays `shares × fill` from cash.
//! - Opening a short moves `shares × fill` of cash into margin as collateral.
//! - Covering releases collateral in proportion to the covered notional and
//!   settles the gain or loss against cash.
//! - Increases are capped at the whole shares cash can pay for.
//! - With costs enabled, commission is charged on every traded share.

use super::cost_model::CostModel;
use crate::domain::Order;

/// Inputs the executor sees besides the order.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionContext<'a> {
    pub prior_position: &'a [i64],
    pub slippage: &'a [f64],
    /// Price orders fill against (the day's open).
    pub reference_price: &'a [f64],
    pub cash: f64,
    pub margin: f64,
    pub costs_enabled: bool,
}

/// Account after execution.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub positions: Vec<i64>,
    pub cash: f64,
    pub margin: f64,
    pub cost_to_trade: Vec<f64>,
}

pub trait OrderExecutor: Send + Sync {
    fn name(&self) -> &str;

    fn execute(&self, order: &Order, ctx: &ExecutionContext<'_>) -> Execution;
}

#[derive(Debug, Clone, Default)]
pub struct MarginExecutor {
    pub cost: CostModel,
}

impl MarginExecutor {
    pub fn new(cost: CostModel) -> Self {
        Self { cost }
    }

    fn commission(&self, ctx: &ExecutionContext<'_>, fill: f64, shares: i64) -> f64 {
        if ctx.costs_enabled {
            self.cost.commission(fill, shares)
        } else {
            0.0
        }
    }

    /// Largest share count in `0..=wanted` whose cost and commission fit in `cash`.
    fn affordable(&self, ctx: &ExecutionContext<'_>, cash: f64, fill: f64, wanted: i64) -> i64 {
        if wanted <= 0 || cash <= 0.0 {
            return 0;
        }
        let per_share = fill + self.commission(ctx, fill, 1);
        if per_share <= 0.0 {
            return wanted;
        }
        let max = (cash / per_share).floor();
        if max >= wanted as f64 {
            wanted
        } else {
            max as i64
        }
    }
}

/// How a single instrument's trade splits into closing and opening legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Legs {
    sell_long: i64,
    cover_short: i64,
    buy_long: i64,
    open_short: i64,
}

impl Legs {
    fn split(prior: i64, quantity: i64) -> Self {
        let target = prior + quantity;
        let (long_before, short_before) = (prior.max(0), (-prior).max(0));
        let (long_after, short_after) = (target.max(0), (-target).max(0));
        Self {
            sell_long: (long_before - long_after).max(0),
            cover_short: (short_before - short_after).max(0),
            buy_long: (long_after - long_before).max(0),
            open_short: (short_after - short_before).max(0),
        }
    }
}

impl OrderExecutor for MarginExecutor {
    fn name(&self) -> &str {
        "margin"
    }

    fn execute(&self, order: &Order, ctx: &ExecutionContext<'_>) -> Execution {
        let n = ctx.prior_position.len();
        let mut positions = ctx.prior_position.to_vec();
        let mut cost_to_trade = vec![0.0; n];
        let mut cash = ctx.cash;
        let mut margin = ctx.margin;

        let legs: Vec<Legs> = (0..n)
            .map(|i| {
                let ok = ctx.reference_price[i].is_finite() && ctx.reference_price[i] > 0.0;
                let q = if ok { order.quantity[i] } else { 0 };
                Legs::split(ctx.prior_position[i], q)
            })
            .collect();

        // ─── Reductions ───
        let short_notional: f64 = (0..n)
            .filter(|&i| ctx.prior_position[i] < 0)
            .map(|i| -ctx.prior_position[i] as f64 * ctx.reference_price[i])
            .sum();
        let margin_before = margin;

        for i in 0..n {
            let leg = legs[i];
            if leg.sell_long > 0 {
                let fill = CostModel::fill_price(
                    ctx.reference_price[i],
                    ctx.slippage[i],
                    -leg.sell_long,
                );
                let fee = self.commission(ctx, fill, leg.sell_long);
                cash += leg.sell_long as f64 * fill - fee;
                cost_to_trade[i] += fee;
                positions[i] -= leg.sell_long;
            }
            if leg.cover_short > 0 {
                let fill = CostModel::fill_price(
                    ctx.reference_price[i],
                    ctx.slippage[i],
                    leg.cover_short,
                );
                let released = if short_notional > 0.0 {
                    margin_before * (leg.cover_short as f64 * ctx.reference_price[i])
                        / short_notional
                } else {
                    0.0
                };
                let fee = self.commission(ctx, fill, leg.cover_short);
                // collateral back, plus entry notional less buy-back cost
                cash += 2.0 * released - leg.cover_short as f64 * fill - fee;
                margin -= released;
                cost_to_trade[i] += fee;
                positions[i] += leg.cover_short;
            }
        }

        // ─── Increases ───
        for i in 0..n {
            let leg = legs[i];
            if leg.buy_long > 0 {
                let fill =
                    CostModel::fill_price(ctx.reference_price[i], ctx.slippage[i], leg.buy_long);
                let shares = self.affordable(ctx, cash, fill, leg.buy_long);
                if shares > 0 {
                    let fee = self.commission(ctx, fill, shares);
                    cash -= shares as f64 * fill + fee;
                    cost_to_trade[i] += fee;
                    positions[i] += shares;
                }
            }
            if leg.open_short > 0 {
                let fill = CostModel::fill_price(
                    ctx.reference_price[i],
                    ctx.slippage[i],
                    -leg.open_short,
                );
                let shares = self.affordable(ctx, cash, fill, leg.open_short);
                if shares > 0 {
                    let fee = self.commission(ctx, fill, shares);
                    let notional = shares as f64 * fill;
                    cash -= notional + fee;
                    margin += notional;
                    cost_to_trade[i] += fee;
                    positions[i] -= shares;
                }
            }
        }

        if positions.iter().all(|&p| p >= 0) {
            // no shorts left: any residue is rounding
            cash += margin;
            margin = 0.0;
        }

        Execution {
            positions,
            cash,
            margin,
            cost_to_trade,
        }
    }
}

//! Order sizers: weighted orders to share quantities.
//!
//! Sizers are value-aware (they see the portfolio value marked to the open)
//! but do not decide direction; that comes from the order's signal.

pub mod target_weight;

pub use target_weight::TargetWeightSizer;

use crate::domain::WeightedOrder;

/// Position sizing for weighted orders.
///
/// # Responsibilities
/// - Convert weights + portfolio value + prices into share quantities to trade
///
/// # Non-Responsibilities
/// - Sizers do NOT validate or normalize weights (the loop already has)
/// - Sizers do NOT check affordability (the executor caps fills)
pub trait OrderSizer: Send + Sync {
    /// Shares to trade per instrument, relative to `prior_position`.
    fn size(
        &self,
        order: &WeightedOrder,
        reference_price: &[f64],
        slippage: &[f64],
        portfolio_value: f64,
        prior_position: &[i64],
    ) -> Vec<i64>;

    /// Sizer name for manifest/logging
    fn name(&self) -> &str;
}

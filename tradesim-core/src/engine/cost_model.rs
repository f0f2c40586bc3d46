//! Cost model: commission per side in basis points.
//!
//! Slippage is not priced here; the loop passes a zero slippage vector to
//! the sizer and executor, which apply it directionally when present.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
    /// Commission in basis points of traded notional, per side.
    pub commission_bps: f64,
}

impl CostModel {
    pub fn new(commission_bps: f64) -> Self {
        Self { commission_bps }
    }

    pub fn frictionless() -> Self {
        Self::new(0.0)
    }

    /// `commission = fill_price * |quantity| * commission_bps / 10_000`
    pub fn commission(&self, fill_price: f64, quantity: i64) -> f64 {
        fill_price * quantity.unsigned_abs() as f64 * (self.commission_bps / 10_000.0)
    }

    /// Fill price for a trade of `quantity` at `reference` with `slippage`:
    /// buyers pay more, sellers receive less.
    pub fn fill_price(reference: f64, slippage: f64, quantity: i64) -> f64 {
        if quantity > 0 {
            reference + slippage
        } else if quantity < 0 {
            reference - slippage
        } else {
            reference
        }
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self::frictionless()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frictionless_is_free() {
        assert_eq!(CostModel::frictionless().commission(100.0, 50), 0.0);
    }

    #[test]
    fn commission_is_symmetric() {
        let cost = CostModel::new(5.0);
        // 100 * 1000 * 5/10000 = 50
        assert!((cost.commission(100.0, 1000) - 50.0).abs() < 1e-10);
        assert!((cost.commission(100.0, -1000) - 50.0).abs() < 1e-10);
    }

    #[test]
    fn slippage_is_directional() {
        assert_eq!(CostModel::fill_price(100.0, 0.5, 10), 100.5);
        assert_eq!(CostModel::fill_price(100.0, 0.5, -10), 99.5);
        assert_eq!(CostModel::fill_price(100.0, 0.5, 0), 100.0);
    }
}

//! Target-weight sizer.
//!
//! Each instrument's target is `signal × floor(weight × value / (price + slippage))`
//! whole shares; the quantity traded is the distance from the prior position.

use super::OrderSizer;
use crate::domain::WeightedOrder;

#[derive(Debug, Clone, Copy, Default)]
pub struct TargetWeightSizer;

impl TargetWeightSizer {
    fn target_shares(weight: f64, value: f64, price: f64, slippage: f64) -> i64 {
        let unit = price + slippage;
        if !(unit > 0.0) || !value.is_finite() || value <= 0.0 {
            return 0;
        }
        let shares = (weight * value / unit).floor();
        if shares.is_finite() && shares > 0.0 {
            shares as i64
        } else {
            0
        }
    }
}

impl OrderSizer for TargetWeightSizer {
    fn size(
        &self,
        order: &WeightedOrder,
        reference_price: &[f64],
        slippage: &[f64],
        portfolio_value: f64,
        prior_position: &[i64],
    ) -> Vec<i64> {
        (0..prior_position.len())
            .map(|i| {
                let target = order.signal[i].as_i64()
                    * Self::target_shares(
                        order.weights[i],
                        portfolio_value,
                        reference_price[i],
                        slippage[i],
                    );
                target - prior_position[i]
            })
            .collect()
    }

    fn name(&self) -> &str {
        "target_weight"
    }
}

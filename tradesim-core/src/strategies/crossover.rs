//! Moving average crossover: long while the fast SMA is above the slow one,
//! short while below.

use super::{sign, Strategy};
use crate::domain::{OrderRequest, PanelWindow};
use crate::indicators::{Indicator, Sma};

#[derive(Debug, Clone)]
pub struct MovingAverageCrossover {
    fast: Sma,
    slow: Sma,
    name: String,
}

impl MovingAverageCrossover {
    /// Periods are swapped if `fast > slow`.
    pub fn new(fast: usize, slow: usize) -> Self {
        let (fast, slow) = if fast <= slow { (fast, slow) } else { (slow, fast) };
        Self {
            fast: Sma::new(fast),
            slow: Sma::new(slow),
            name: format!("ma_crossover_{fast}_{slow}"),
        }
    }
}

impl Strategy for MovingAverageCrossover {
    fn name(&self) -> &str {
        &self.name
    }

    fn min_history(&self) -> usize {
        self.slow.lookback() + 1
    }

    fn decide(&self, window: &PanelWindow<'_>) -> OrderRequest {
        let close = window.close();
        let signal = (0..close.cols())
            .map(|i| {
                let series = close.column(i);
                match (self.fast.last(&series), self.slow.last(&series)) {
                    (Some(fast), Some(slow)) => sign(fast - slow),
                    _ => 0.0,
                }
            })
            .collect::<Vec<_>>();
        OrderRequest::signal(signal)
    }
}

//! Strategies: a lookback window in, the day's order request out.
//!
//! A strategy sees only rows strictly before the trading day, as a borrowed
//! [`PanelWindow`]. It cannot hold on to the window past the call, and it
//! cannot see the account state except through the panel's output columns.

pub mod constant;
pub mod crossover;
pub mod momentum;

pub use constant::ConstantSignal;
pub use crossover::MovingAverageCrossover;
pub use momentum::{MomentumSignal, MomentumWeights};

use crate::domain::{OrderRequest, PanelWindow};

pub trait Strategy: Send + Sync {
    fn name(&self) -> &str;

    /// Rows of history this strategy needs to produce a non-flat signal.
    fn min_history(&self) -> usize {
        0
    }

    fn decide(&self, window: &PanelWindow<'_>) -> OrderRequest;
}

/// Adapts a closure into a [`Strategy`].
pub struct FnStrategy<F> {
    name: String,
    f: F,
}

impl<F> FnStrategy<F>
where
    F: Fn(&PanelWindow<'_>) -> OrderRequest + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Strategy for FnStrategy<F>
where
    F: Fn(&PanelWindow<'_>) -> OrderRequest + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&self, window: &PanelWindow<'_>) -> OrderRequest {
        (self.f)(window)
    }
}

/// `-1`, `0` or `1` by the sign of `x`; NaN maps to 0.
pub(crate) fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

//! Time-series momentum.
//!
//! `MomentumSignal` goes long instruments whose close rose over the last
//! `period` rows and short those that fell. `MomentumWeights` trades the
//! same directions in weighted mode, allocating in proportion to the size
//! of each instrument's move.

use super::{sign, Strategy};
use crate::domain::{OrderRequest, PanelWindow};
use crate::indicators::{Indicator, Momentum};

/// Relative move per instrument over the window, `None` without enough rows.
fn relative_moves(window: &PanelWindow<'_>, momentum: &Momentum) -> Vec<Option<f64>> {
    let close = window.close();
    (0..close.cols())
        .map(|i| {
            let series = close.column(i);
            let diff = momentum.last(&series)?;
            let base = series[series.len() - 1 - momentum.lookback()];
            (base > 0.0).then(|| diff / base)
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct MomentumSignal {
    momentum: Momentum,
    name: String,
}

impl MomentumSignal {
    pub fn new(period: usize) -> Self {
        let momentum = Momentum::new(period);
        let name = format!("momentum_{}", momentum.lookback());
        Self { momentum, name }
    }
}

impl Strategy for MomentumSignal {
    fn name(&self) -> &str {
        &self.name
    }

    fn min_history(&self) -> usize {
        self.momentum.lookback() + 1
    }

    fn decide(&self, window: &PanelWindow<'_>) -> OrderRequest {
        let signal = relative_moves(window, &self.momentum)
            .into_iter()
            .map(|m| m.map_or(0.0, sign))
            .collect::<Vec<_>>();
        OrderRequest::signal(signal)
    }
}

#[derive(Debug, Clone)]
pub struct MomentumWeights {
    momentum: Momentum,
    /// Fraction of portfolio value to deploy.
    exposure: f64,
    name: String,
}

impl MomentumWeights {
    pub fn new(period: usize, exposure: f64) -> Self {
        let momentum = Momentum::new(period);
        let name = format!("momentum_weights_{}", momentum.lookback());
        Self {
            momentum,
            exposure: exposure.clamp(0.0, 1.0),
            name,
        }
    }
}

impl Strategy for MomentumWeights {
    fn name(&self) -> &str {
        &self.name
    }

    fn min_history(&self) -> usize {
        self.momentum.lookback() + 1
    }

    fn decide(&self, window: &PanelWindow<'_>) -> OrderRequest {
        let moves = relative_moves(window, &self.momentum);
        let signal: Vec<f64> = moves.iter().map(|m| m.map_or(0.0, sign)).collect();
        let strength: Vec<f64> = moves.iter().map(|m| m.map_or(0.0, f64::abs)).collect();
        let total: f64 = strength.iter().sum();
        let weights = if total > 0.0 {
            strength.iter().map(|s| self.exposure * s / total).collect()
        } else {
            vec![0.0; strength.len()]
        };
        OrderRequest::weighted(signal, weights)
    }
}

//! Fixed signal every day, for smoke runs and tests.

use super::Strategy;
use crate::domain::{OrderRequest, PanelWindow};

#[derive(Debug, Clone)]
pub struct ConstantSignal {
    value: f64,
    /// Equal weights summing to this fraction; `None` means signal mode.
    weighted: Option<f64>,
    name: String,
}

impl ConstantSignal {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            weighted: None,
            name: format!("constant_{value}"),
        }
    }

    /// Weighted variant: `value` on every instrument with `exposure` spread
    /// equally across them.
    pub fn weighted(value: f64, exposure: f64) -> Self {
        Self {
            value,
            weighted: Some(exposure),
            name: format!("constant_{value}_weighted"),
        }
    }
}

impl Strategy for ConstantSignal {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&self, window: &PanelWindow<'_>) -> OrderRequest {
        let n = window.instruments().len();
        let signal = vec![self.value; n];
        match self.weighted {
            None => OrderRequest::signal(signal),
            Some(exposure) => {
                let each = if n > 0 { exposure / n as f64 } else { 0.0 };
                OrderRequest::weighted(signal, vec![each; n])
            }
        }
    }
}

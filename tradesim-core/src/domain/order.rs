//! Daily orders: what a strategy asks for, and what the loop hands the executor.
//!
//! A strategy returns an [`OrderRequest`] with raw numbers. The loop validates
//! it into an [`OrderIntent`] and attaches quantities, producing an [`Order`].
//! Orders live for a single day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Validated per-instrument direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalIntent {
    /// Sell / hold short exposure (-1)
    Short,
    /// Hold nothing (0)
    Flat,
    /// Buy / hold long exposure (1)
    Long,
}

impl SignalIntent {
    /// Parse a raw signal value. Only exactly -1, 0 and 1 are accepted.
    pub fn from_value(value: f64) -> Option<Self> {
        if value == -1.0 {
            Some(SignalIntent::Short)
        } else if value == 0.0 {
            Some(SignalIntent::Flat)
        } else if value == 1.0 {
            Some(SignalIntent::Long)
        } else {
            None
        }
    }

    pub fn as_i64(&self) -> i64 {
        match self {
            SignalIntent::Short => -1,
            SignalIntent::Flat => 0,
            SignalIntent::Long => 1,
        }
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, SignalIntent::Flat)
    }
}

/// Which branch of the loop an order takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderMode {
    /// Direction only; the position moves fully to the signal every day.
    Signal,
    /// Capital allocation fractions sized against portfolio value.
    Weighted,
}

/// Raw strategy output for one day, one entry per instrument.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderRequest {
    Signal { signal: Vec<f64> },
    Weighted { signal: Vec<f64>, weights: Vec<f64> },
}

impl OrderRequest {
    pub fn signal(signal: impl Into<Vec<f64>>) -> Self {
        OrderRequest::Signal {
            signal: signal.into(),
        }
    }

    pub fn weighted(signal: impl Into<Vec<f64>>, weights: impl Into<Vec<f64>>) -> Self {
        OrderRequest::Weighted {
            signal: signal.into(),
            weights: weights.into(),
        }
    }

    pub fn mode(&self) -> OrderMode {
        match self {
            OrderRequest::Signal { .. } => OrderMode::Signal,
            OrderRequest::Weighted { .. } => OrderMode::Weighted,
        }
    }

    pub fn raw_signal(&self) -> &[f64] {
        match self {
            OrderRequest::Signal { signal } | OrderRequest::Weighted { signal, .. } => signal,
        }
    }

    /// Check the shape of the request and that every signal is -1, 0 or 1.
    pub fn validate_signal(
        &self,
        date: NaiveDate,
        instruments: &[String],
    ) -> Result<Vec<SignalIntent>, SimError> {
        let raw = self.raw_signal();
        check_len(date, "signal", instruments.len(), raw.len())?;
        if let OrderRequest::Weighted { weights, .. } = self {
            check_len(date, "weights", instruments.len(), weights.len())?;
        }
        raw.iter()
            .zip(instruments)
            .map(|(&value, instrument)| {
                SignalIntent::from_value(value).ok_or_else(|| SimError::InvalidSignal {
                    date,
                    instrument: instrument.clone(),
                    value,
                })
            })
            .collect()
    }
}

/// A validated weighted order, as handed to the sizer.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedOrder {
    pub signal: Vec<SignalIntent>,
    /// Non-negative and summing to at most 1.
    pub weights: Vec<f64>,
}

impl WeightedOrder {
    /// Validate weights and scale them down proportionally when they sum past 1.
    pub fn new(
        date: NaiveDate,
        instruments: &[String],
        signal: Vec<SignalIntent>,
        weights: Vec<f64>,
    ) -> Result<Self, SimError> {
        check_len(date, "weights", instruments.len(), weights.len())?;
        // `!(w >= 0.0)` also rejects NaN
        if let Some((instrument, &value)) = instruments
            .iter()
            .zip(&weights)
            .find(|(_, w)| !(**w >= 0.0))
        {
            return Err(SimError::InvalidWeight {
                date,
                instrument: instrument.clone(),
                value,
            });
        }
        Ok(Self {
            signal,
            weights: normalize_weights(weights),
        })
    }
}

/// Divide every weight by the total when the total exceeds 1; otherwise
/// return the weights unchanged.
pub fn normalize_weights(weights: Vec<f64>) -> Vec<f64> {
    let total: f64 = weights.iter().sum();
    if total > 1.0 {
        weights.into_iter().map(|w| w / total).collect()
    } else {
        weights
    }
}

/// Validated intent, dispatched by the loop.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderIntent {
    Signal { signal: Vec<SignalIntent> },
    Weighted(WeightedOrder),
}

impl OrderIntent {
    pub fn mode(&self) -> OrderMode {
        match self {
            OrderIntent::Signal { .. } => OrderMode::Signal,
            OrderIntent::Weighted(_) => OrderMode::Weighted,
        }
    }

    pub fn signal(&self) -> &[SignalIntent] {
        match self {
            OrderIntent::Signal { signal } => signal,
            OrderIntent::Weighted(order) => &order.signal,
        }
    }
}

/// The day's order as consumed by the executor.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub intent: OrderIntent,
    /// Shares to trade per instrument (positive buys, negative sells).
    pub quantity: Vec<i64>,
    /// Limit price placeholder; zero means "at the reference price".
    pub price: Vec<f64>,
}

impl Order {
    pub fn new(intent: OrderIntent, quantity: Vec<i64>) -> Self {
        let price = vec![0.0; quantity.len()];
        Self {
            intent,
            quantity,
            price,
        }
    }

    pub fn mode(&self) -> OrderMode {
        self.intent.mode()
    }
}

pub(crate) fn check_len(
    date: NaiveDate,
    what: &'static str,
    expected: usize,
    got: usize,
) -> Result<(), SimError> {
    if expected == got {
        Ok(())
    } else {
        Err(SimError::OrderShape {
            date,
            what,
            expected,
            got,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2010, 1, 4).unwrap()
    }

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("S{i}")).collect()
    }

    #[test]
    fn signal_values_parse_exactly() {
        assert_eq!(SignalIntent::from_value(1.0), Some(SignalIntent::Long));
        assert_eq!(SignalIntent::from_value(-1.0), Some(SignalIntent::Short));
        assert_eq!(SignalIntent::from_value(0.0), Some(SignalIntent::Flat));
        assert_eq!(SignalIntent::from_value(-0.0), Some(SignalIntent::Flat));
        assert_eq!(SignalIntent::from_value(0.5), None);
        assert_eq!(SignalIntent::from_value(2.0), None);
        assert_eq!(SignalIntent::from_value(f64::NAN), None);
    }

    #[test]
    fn validate_signal_reports_instrument() {
        let req = OrderRequest::signal(vec![1.0, 2.0]);
        match req.validate_signal(date(), &names(2)) {
            Err(SimError::InvalidSignal {
                instrument, value, ..
            }) => {
                assert_eq!(instrument, "S1");
                assert_eq!(value, 2.0);
            }
            other => panic!("expected InvalidSignal, got {other:?}"),
        }
    }

    #[test]
    fn validate_signal_checks_length() {
        let req = OrderRequest::weighted(vec![1.0, 1.0], vec![0.5]);
        assert!(matches!(
            req.validate_signal(date(), &names(2)),
            Err(SimError::OrderShape { what: "weights", .. })
        ));
    }

    #[test]
    fn negative_weight_rejected() {
        let err = WeightedOrder::new(
            date(),
            &names(2),
            vec![SignalIntent::Long; 2],
            vec![0.5, -0.1],
        );
        assert!(matches!(err, Err(SimError::InvalidWeight { value, .. }) if value == -0.1));
    }

    #[test]
    fn nan_weight_rejected() {
        let err = WeightedOrder::new(
            date(),
            &names(1),
            vec![SignalIntent::Long],
            vec![f64::NAN],
        );
        assert!(matches!(err, Err(SimError::InvalidWeight { .. })));
    }

    #[test]
    fn weights_over_one_are_scaled_down() {
        let w = normalize_weights(vec![0.6, 0.6, 0.8]);
        let total: f64 = w.iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!((w[0] - 0.3).abs() < 1e-12);
    }

    #[test]
    fn weights_at_or_below_one_are_untouched() {
        assert_eq!(normalize_weights(vec![0.2, 0.3]), vec![0.2, 0.3]);
        assert_eq!(normalize_weights(vec![0.5, 0.5]), vec![0.5, 0.5]);
    }

    #[test]
    fn order_price_placeholder_is_zero() {
        let order = Order::new(
            OrderIntent::Signal {
                signal: vec![SignalIntent::Long],
            },
            vec![1],
        );
        assert_eq!(order.price, vec![0.0]);
        assert_eq!(order.mode(), OrderMode::Signal);
    }
}

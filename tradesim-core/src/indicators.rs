//! Price-series indicators used by the built-in strategies.
//!
//! Each indicator maps a close series to a series of the same length, with
//! NaN wherever its lookback is not yet satisfied or a NaN input sits in the
//! window.

pub trait Indicator: Send + Sync {
    fn name(&self) -> &str;

    /// Bars needed before the first valid value.
    fn lookback(&self) -> usize;

    fn compute(&self, series: &[f64]) -> Vec<f64>;

    /// Most recent value, if valid.
    fn last(&self, series: &[f64]) -> Option<f64> {
        self.compute(series).last().copied().filter(|v| v.is_finite())
    }
}

/// Simple moving average. Lookback: period - 1.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        let period = period.max(1);
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, series: &[f64]) -> Vec<f64> {
        let n = series.len();
        let mut result = vec![f64::NAN; n];
        if n < self.period {
            return result;
        }

        let mut sum: f64 = series[..self.period].iter().sum();
        result[self.period - 1] = sum / self.period as f64;

        for i in self.period..n {
            let leaving = series[i - self.period];
            let entering = series[i];
            if leaving.is_nan() || entering.is_nan() || sum.is_nan() {
                // NaN poisons a running sum; rescan the window.
                sum = series[(i + 1 - self.period)..=i].iter().sum();
            } else {
                sum += entering - leaving;
            }
            result[i] = sum / self.period as f64;
        }
        result
    }
}

/// Lookback return: `series[t] - series[t - period]`. Lookback: period.
#[derive(Debug, Clone)]
pub struct Momentum {
    period: usize,
    name: String,
}

impl Momentum {
    pub fn new(period: usize) -> Self {
        let period = period.max(1);
        Self {
            period,
            name: format!("momentum_{period}"),
        }
    }
}

impl Indicator for Momentum {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, series: &[f64]) -> Vec<f64> {
        let mut result = vec![f64::NAN; series.len()];
        for i in self.period..series.len() {
            // NaN inputs propagate
            result[i] = series[i] - series[i - self.period];
        }
        result
    }
}

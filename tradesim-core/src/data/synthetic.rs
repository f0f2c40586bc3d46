//! Synthetic bars for demos and tests.
//!
//! A random walk from 100.0 on weekdays only. The per-symbol RNG seed is the
//! BLAKE3 hash of the base seed, exchange and symbol, so the same request
//! always produces the same prices.

use super::provider::{BarSource, DataError, RawBar};
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct SyntheticSource {
    seed: u64,
    /// Largest absolute daily return of the walk.
    max_move: f64,
}

impl SyntheticSource {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            max_move: 0.03,
        }
    }

    pub fn with_max_move(mut self, max_move: f64) -> Self {
        self.max_move = max_move.abs();
        self
    }

    fn rng_for(&self, exchange: &str, symbol: &str) -> StdRng {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.seed.to_le_bytes());
        hasher.update(exchange.as_bytes());
        hasher.update(b"/");
        hasher.update(symbol.as_bytes());
        StdRng::from_seed(*hasher.finalize().as_bytes())
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new(0)
    }
}

impl BarSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        exchange: &str,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError> {
        let mut rng = self.rng_for(exchange, symbol);
        let mut bars = Vec::new();
        let mut price = 100.0_f64;
        let mut current = start;

        while current <= end {
            if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                current += chrono::Duration::days(1);
                continue;
            }

            let daily_return: f64 = if self.max_move > 0.0 {
                rng.gen_range(-self.max_move..self.max_move)
            } else {
                0.0
            };
            let open = price;
            let close = price * (1.0 + daily_return);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(500_000..5_000_000u64);

            bars.push(RawBar {
                date: current,
                open,
                high,
                low,
                close,
                volume,
            });

            price = close;
            current += chrono::Duration::days(1);
        }

        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
    }

    #[test]
    fn deterministic_per_seed() {
        let (s, e) = range();
        let a = SyntheticSource::new(7).fetch("abcd", "SPY", s, e).unwrap();
        let b = SyntheticSource::new(7).fetch("abcd", "SPY", s, e).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn symbols_and_seeds_differ() {
        let (s, e) = range();
        let spy = SyntheticSource::new(7).fetch("abcd", "SPY", s, e).unwrap();
        let qqq = SyntheticSource::new(7).fetch("abcd", "QQQ", s, e).unwrap();
        let spy8 = SyntheticSource::new(8).fetch("abcd", "SPY", s, e).unwrap();
        assert_eq!(spy.len(), qqq.len());
        assert_ne!(spy[0].close, qqq[0].close);
        assert_ne!(spy[0].close, spy8[0].close);
    }

    #[test]
    fn weekdays_only_and_sane_ohlc() {
        let (s, e) = range();
        let bars = SyntheticSource::default().fetch("abcd", "X", s, e).unwrap();
        // January 2024 has 23 weekdays
        assert_eq!(bars.len(), 23);
        for bar in &bars {
            assert!(!matches!(bar.date.weekday(), Weekday::Sat | Weekday::Sun));
            assert!(bar.high >= bar.open.max(bar.close));
            assert!(bar.low <= bar.open.min(bar.close));
        }
    }

    #[test]
    fn zero_move_is_flat() {
        let (s, e) = range();
        let bars = SyntheticSource::new(1)
            .with_max_move(0.0)
            .fetch("abcd", "X", s, e)
            .unwrap();
        assert!(bars.iter().all(|b| b.open == 100.0 && b.close == 100.0));
    }
}

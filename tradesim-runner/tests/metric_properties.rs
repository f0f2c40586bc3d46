//! Property tests for run metrics.

use proptest::prelude::*;
use tradesim_runner::metrics::{max_drawdown, sharpe};
use tradesim_runner::RunMetrics;

fn arb_returns() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-5.0..5.0_f64, 2..60)
}

fn cumulative(daily: &[f64]) -> Vec<f64> {
    daily
        .iter()
        .scan(0.0, |acc, d| {
            *acc += d;
            Some(*acc)
        })
        .collect()
}

proptest! {
    // ── 1. Drawdown bounds ──

    #[test]
    fn drawdown_is_non_negative(daily in arb_returns()) {
        let total = cumulative(&daily);
        let dd = max_drawdown(&total);
        prop_assert!(dd >= 0.0);
        let worst = total.iter().copied().fold(0.0_f64, f64::min);
        prop_assert!(dd >= -worst - 1e-9, "drawdown {} below loss from start {}", dd, -worst);
    }

    #[test]
    fn rising_curve_has_no_drawdown(steps in prop::collection::vec(0.0..3.0_f64, 1..40)) {
        prop_assert_eq!(max_drawdown(&cumulative(&steps)), 0.0);
    }

    // ── 2. Sharpe scale invariance ──

    #[test]
    fn sharpe_ignores_scale(daily in arb_returns(), k in 0.5..10.0_f64) {
        let lo = daily.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = daily.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assume!(hi - lo > 1e-3);
        let scaled: Vec<f64> = daily.iter().map(|d| d * k).collect();
        let (a, b) = (sharpe(&daily), sharpe(&scaled));
        prop_assert!((a - b).abs() <= 1e-9 * a.abs().max(1.0), "{} vs {}", a, b);
    }

    // ── 3. Score selection ──

    #[test]
    fn score_follows_baseline_presence(daily in arb_returns(), shift in -1.0..1.0_f64) {
        let total = cumulative(&daily);
        let plain = RunMetrics::compute(&daily, &total, None);
        prop_assert_eq!(plain.score(), plain.total_pnl);
        prop_assert_eq!(plain.total_pnl, *total.last().unwrap());

        let baseline: Vec<f64> = daily.iter().map(|d| d * 0.5 + shift).collect();
        let scored = RunMetrics::compute(&daily, &total, Some(&baseline[..]));
        prop_assert_eq!(scored.score(), scored.sharpe_ratio);
        prop_assert!(scored.baseline_sharpe.is_some());
    }
}

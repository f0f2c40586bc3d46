//! Property tests for simulation invariants.
//!
//! Uses proptest to verify:
//! 1. Weight normalization: non-negative, summing to at most 1, proportions kept
//! 2. P&L accounting: TOTAL_PNL is the running sum of DAILY_PNL
//! 3. Signal mode: ORDER = SIGNAL − yesterday's POSITION, and the fill lands on it
//! 4. Causality: rewriting future prices never changes past rows, in either mode
//! 5. Weighted long-only runs never overdraw cash

use chrono::NaiveDate;
use proptest::prelude::*;
use tradesim_core::calendar::business_days;
use tradesim_core::domain::order::normalize_weights;
use tradesim_core::domain::{OrderRequest, Panel, PanelWindow, PriceTables, Table};
use tradesim_core::engine::{
    run_simulation, Lookback, MarginExecutor, SimulationConfig, SimulationReport,
};
use tradesim_core::sizers::TargetWeightSizer;
use tradesim_core::strategies::FnStrategy;

// ── Helpers ──────────────────────────────────────────────────────────

const INSTRUMENTS: usize = 2;

fn first_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2010, 1, 4).unwrap()
}

fn price_table(
    rows: &[[(f64, f64); INSTRUMENTS]],
    f: impl Fn(&(f64, f64)) -> f64,
) -> Table<f64> {
    Table::from_rows(rows.iter().map(|r| r.iter().map(&f).collect()).collect()).unwrap()
}

/// Panel from per-row (open, close) pairs, one pair per instrument.
fn build_panel(rows: &[[(f64, f64); INSTRUMENTS]]) -> Panel {
    let n = rows.len();
    let last = first_day() + chrono::Duration::days(n as i64 * 2 + 7);
    let dates: Vec<NaiveDate> = business_days(first_day(), last).into_iter().take(n).collect();
    let prices = PriceTables {
        open: price_table(rows, |p| p.0),
        high: price_table(rows, |p| p.0.max(p.1)),
        low: price_table(rows, |p| p.0.min(p.1)),
        close: price_table(rows, |p| p.1),
    };
    let instruments = (0..INSTRUMENTS).map(|i| format!("S{i}")).collect();
    Panel::new(dates, instruments, prices, 1_000_000.0).unwrap()
}

/// Run a strategy that plays back `signals[row]` on each panel row.
fn replay(panel: Panel, signals: &[[i8; INSTRUMENTS]], weighted: bool) -> SimulationReport {
    let start = panel.dates()[1];
    let end = *panel.dates().last().unwrap();
    let strategy = FnStrategy::new("replay", move |w: &PanelWindow<'_>| {
        let today = w.start_index() + w.len();
        let signal: Vec<f64> = signals[today].iter().map(|&s| s as f64).collect();
        if weighted {
            OrderRequest::weighted(signal, vec![0.4, 0.4])
        } else {
            OrderRequest::signal(signal)
        }
    });
    let config = SimulationConfig::new(start, end, Lookback::new(3).unwrap(), 1_000_000.0);
    run_simulation(
        panel,
        &config,
        &strategy,
        &TargetWeightSizer,
        &MarginExecutor::default(),
    )
    .unwrap()
}

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = f64> {
    (1.0..200.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_row() -> impl Strategy<Value = [(f64, f64); INSTRUMENTS]> {
    [(arb_price(), arb_price()), (arb_price(), arb_price())]
}

fn arb_signal() -> impl Strategy<Value = [i8; INSTRUMENTS]> {
    [-1i8..=1, -1i8..=1]
}

fn arb_run() -> impl Strategy<Value = (Vec<[(f64, f64); INSTRUMENTS]>, Vec<[i8; INSTRUMENTS]>)> {
    (2usize..25).prop_flat_map(|n| {
        (
            prop::collection::vec(arb_row(), n),
            prop::collection::vec(arb_signal(), n),
        )
    })
}

// ── 1. Weight Normalization ──────────────────────────────────────────

proptest! {
    #[test]
    fn normalized_weights_are_bounded(weights in prop::collection::vec(0.0..2.0_f64, 1..10)) {
        let total: f64 = weights.iter().sum();
        let normalized = normalize_weights(weights.clone());

        prop_assert_eq!(normalized.len(), weights.len());
        prop_assert!(normalized.iter().all(|w| *w >= 0.0));
        prop_assert!(normalized.iter().sum::<f64>() <= 1.0 + 1e-9);
        if total <= 1.0 {
            prop_assert_eq!(normalized, weights);
        } else {
            for (n, w) in normalized.iter().zip(&weights) {
                prop_assert!((n * total - w).abs() < 1e-9);
            }
        }
    }
}

// ── 2. P&L Accounting ────────────────────────────────────────────────

proptest! {
    #[test]
    fn total_pnl_is_running_sum((rows, signals) in arb_run()) {
        let report = replay(build_panel(&rows), &signals, false);
        let p = report.panel();
        let last = report.last_index.unwrap();

        for t in 1..=last {
            for i in 0..INSTRUMENTS {
                let expected = p.total_pnl().get(t - 1, i) + p.daily_pnl().get(t, i);
                prop_assert!((p.total_pnl().get(t, i) - expected).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn processed_days_strictly_increase((rows, signals) in arb_run()) {
        let report = replay(build_panel(&rows), &signals, false);
        prop_assert_eq!(report.processed_days.len(), rows.len() - 1);
        prop_assert!(report.processed_days.windows(2).all(|w| w[0] < w[1]));
    }
}

// ── 3. Signal Mode ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn signal_mode_moves_fully_to_signal((rows, signals) in arb_run()) {
        let report = replay(build_panel(&rows), &signals, false);
        let p = report.panel();

        for t in 1..rows.len() {
            for i in 0..INSTRUMENTS {
                let target = signals[t][i] as i64;
                prop_assert_eq!(p.order().get(t, i), target - p.position().get(t - 1, i));
                prop_assert_eq!(p.position().get(t, i), target);
                prop_assert_eq!(
                    p.filled_order().get(t, i),
                    p.position().get(t, i) - p.position().get(t - 1, i)
                );
                prop_assert_eq!(p.cost_to_trade().get(t, i), 0.0);
            }
        }
    }
}

// ── 4. Causality ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn future_prices_do_not_change_the_past(
        (rows, signals) in arb_run(),
        cut in 1usize..24,
        shift in 0.5..50.0_f64,
        weighted in any::<bool>(),
    ) {
        let cut = cut.min(rows.len() - 1);
        let mut altered = rows.clone();
        for row in altered.iter_mut().skip(cut + 1) {
            for (open, close) in row.iter_mut() {
                *open += shift;
                *close += shift;
            }
        }

        let a = replay(build_panel(&rows), &signals, weighted);
        let b = replay(build_panel(&altered), &signals, weighted);
        let (pa, pb) = (a.panel(), b.panel());

        for t in 0..=cut {
            prop_assert_eq!(pa.position().row(t), pb.position().row(t));
            prop_assert_eq!(pa.order().row(t), pb.order().row(t));
            prop_assert_eq!(pa.daily_pnl().row(t), pb.daily_pnl().row(t));
            prop_assert_eq!(pa.funds()[t], pb.funds()[t]);
            prop_assert_eq!(pa.margin()[t], pb.margin()[t]);
            prop_assert_eq!(pa.value()[t], pb.value()[t]);
            prop_assert_eq!(pa.cost_to_trade().row(t), pb.cost_to_trade().row(t));
        }
    }
}

// ── 5. Weighted Cash ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn weighted_long_only_never_overdraws(
        rows in prop::collection::vec(arb_row(), 2..25),
        flat_days in prop::collection::vec(any::<bool>(), 25),
    ) {
        let signals: Vec<[i8; INSTRUMENTS]> = flat_days
            .iter()
            .take(rows.len())
            .map(|&flat| if flat { [0, 1] } else { [1, 1] })
            .collect();
        let report = replay(build_panel(&rows), &signals, true);
        let p = report.panel();

        for t in 1..=report.last_index.unwrap() {
            prop_assert!(p.funds()[t] >= -1e-6, "funds {} on row {t}", p.funds()[t]);
            prop_assert!(p.margin()[t] == 0.0);
            prop_assert!(p.position().row(t).iter().all(|&q| q >= 0));
        }
        prop_assert!(!report.status.is_halted());
    }
}

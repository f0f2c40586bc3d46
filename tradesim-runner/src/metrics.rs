//! Performance metrics over a run's daily return series.
//!
//! Returns are in percent of the capital base: the configured budget for
//! weighted runs, one unit for signal runs (whose positions are single
//! shares, so P&L is already per unit). Every metric is a pure function of
//! the aggregate daily series and, when present, the baseline's.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tradesim_core::engine::SimulationReport;

const TRADING_DAYS: f64 = 252.0;

// ─── Return series ──────────────────────────────────────────────────

/// Percentage returns over the result window of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    pub dates: Vec<NaiveDate>,
    pub instruments: Vec<String>,
    /// `DAILY_PNL × 100 / base`, one row per date.
    pub instrument_daily: Vec<Vec<f64>>,
    /// Row sums of `instrument_daily`.
    pub daily: Vec<f64>,
    /// Row sums of `TOTAL_PNL × 100 / base`.
    pub total: Vec<f64>,
    pub positions: Vec<Vec<i64>>,
}

impl ReturnSeries {
    /// Capital base for percentage returns.
    pub fn capital_base(report: &SimulationReport, budget: f64) -> f64 {
        if report.is_weighted() {
            budget
        } else {
            1.0
        }
    }

    /// Extract the series from a finished run; empty if no day was processed.
    pub fn from_report(report: &SimulationReport, budget: f64) -> Self {
        let base = Self::capital_base(report, budget);
        let Some(window) = report.result_window() else {
            return Self {
                dates: Vec::new(),
                instruments: report.panel().instruments().to_vec(),
                instrument_daily: Vec::new(),
                daily: Vec::new(),
                total: Vec::new(),
                positions: Vec::new(),
            };
        };
        let instrument_daily: Vec<Vec<f64>> = window
            .daily_pnl()
            .rows_iter()
            .map(|row| row.iter().map(|p| p * 100.0 / base).collect())
            .collect();
        let daily = instrument_daily.iter().map(|r| r.iter().sum()).collect();
        let total = window
            .total_pnl()
            .rows_iter()
            .map(|row| row.iter().map(|p| p * 100.0 / base).sum())
            .collect();
        Self {
            dates: window.dates().to_vec(),
            instruments: window.instruments().to_vec(),
            instrument_daily,
            daily,
            total,
            positions: window.position().rows_iter().map(<[i64]>::to_vec).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

// ─── Aggregate metrics ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    /// Cumulative return on the last day, percent.
    pub total_pnl: f64,
    /// Mean daily return × 252.
    pub annual_return: f64,
    /// Daily standard deviation × √252.
    pub annual_vol: f64,
    /// Annualized Sharpe; of excess over the baseline when one is present.
    pub sharpe_ratio: f64,
    /// Largest peak-to-trough drop of the cumulative return, percentage points.
    pub max_drawdown: f64,
    pub baseline_sharpe: Option<f64>,
}

impl RunMetrics {
    /// `baseline`, when given, must be aligned with `daily`.
    pub fn compute(daily: &[f64], total: &[f64], baseline: Option<&[f64]>) -> Self {
        let sharpe_ratio = match baseline {
            Some(base) => {
                let excess: Vec<f64> = daily.iter().zip(base).map(|(d, b)| d - b).collect();
                sharpe(&excess)
            }
            None => sharpe(daily),
        };
        Self {
            total_pnl: total.last().copied().unwrap_or(0.0),
            annual_return: mean(daily) * TRADING_DAYS,
            annual_vol: std_dev(daily) * TRADING_DAYS.sqrt(),
            sharpe_ratio,
            max_drawdown: max_drawdown(total),
            baseline_sharpe: baseline.map(sharpe),
        }
    }

    /// Metric names and values in report order.
    pub fn named(&self) -> Vec<(&'static str, f64)> {
        let mut out = vec![
            ("Total Pnl", self.total_pnl),
            ("Annual Return", self.annual_return),
            ("Annual Vol", self.annual_vol),
            ("Sharpe Ratio", self.sharpe_ratio),
            ("Max Drawdown", self.max_drawdown),
        ];
        if let Some(b) = self.baseline_sharpe {
            out.push(("Baseline Sharpe", b));
        }
        out
    }

    /// Sharpe against the baseline when there is one, total return otherwise.
    pub fn score(&self) -> f64 {
        if self.baseline_sharpe.is_some() {
            self.sharpe_ratio
        } else {
            self.total_pnl
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Annualized Sharpe ratio of daily returns; 0 without variance.
pub fn sharpe(daily: &[f64]) -> f64 {
    let std = std_dev(daily);
    if std < 1e-15 {
        return 0.0;
    }
    mean(daily) / std * TRADING_DAYS.sqrt()
}

/// Largest drop from a running peak of a cumulative percentage curve.
///
/// The curve starts from zero, so an immediate loss counts as drawdown.
pub fn max_drawdown(cumulative: &[f64]) -> f64 {
    let mut peak = 0.0_f64;
    let mut max_dd = 0.0_f64;
    for &value in cumulative {
        peak = peak.max(value);
        max_dd = max_dd.max(peak - value);
    }
    max_dd
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation.
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Sharpe ──

    #[test]
    fn sharpe_of_constant_returns_is_zero() {
        assert_eq!(sharpe(&[0.5; 10]), 0.0);
        assert_eq!(sharpe(&[]), 0.0);
    }

    #[test]
    fn sharpe_known_value() {
        let r = [1.0, -1.0, 1.0, -1.0, 2.0];
        // mean 0.4, sample variance 7.2 / 4
        let expected = 0.4 / 1.8_f64.sqrt() * 252.0_f64.sqrt();
        assert!((sharpe(&r) - expected).abs() < 1e-12);
    }

    // ── Drawdown ──

    #[test]
    fn drawdown_from_peak() {
        assert!((max_drawdown(&[1.0, 5.0, 2.0, 4.0, -1.0, 3.0]) - 6.0).abs() < 1e-12);
        assert_eq!(max_drawdown(&[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(max_drawdown(&[-2.0]), 2.0);
    }

    // ── Aggregate ──

    #[test]
    fn score_depends_on_baseline() {
        let daily = [1.0, 0.5, -0.25, 0.75];
        let total = [1.0, 1.5, 1.25, 2.0];

        let plain = RunMetrics::compute(&daily, &total, None);
        assert_eq!(plain.score(), 2.0);
        assert_eq!(plain.named().len(), 5);
        assert_eq!(plain.named()[0], ("Total Pnl", 2.0));

        let base = [0.5, 0.5, 0.5, 0.5];
        let with_base = RunMetrics::compute(&daily, &total, Some(&base[..]));
        assert_eq!(with_base.score(), with_base.sharpe_ratio);
        assert_eq!(with_base.baseline_sharpe, Some(0.0));
        assert_eq!(with_base.named().last().map(|m| m.0), Some("Baseline Sharpe"));
        // excess returns differ from raw only by a constant: same spread, lower mean
        assert!(with_base.sharpe_ratio < plain.sharpe_ratio);
    }

    #[test]
    fn annualization() {
        let daily = [0.1, 0.3];
        let m = RunMetrics::compute(&daily, &[0.1, 0.4], None);
        assert!((m.annual_return - 0.2 * 252.0).abs() < 1e-9);
        let std = (0.02_f64).sqrt();
        assert!((m.annual_vol - std * 252.0_f64.sqrt()).abs() < 1e-9);
    }
}

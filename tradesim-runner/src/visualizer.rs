//! Result presentation.
//!
//! A [`Visualizer`] turns a finished run into something a person looks at.
//! [`TerminalSummary`] renders plain text: run facts, the metric table and a
//! sparkline of the cumulative return.

use std::fmt::Write;

use crate::runner::RunOutcome;

pub trait Visualizer: Send + Sync {
    fn name(&self) -> &str;

    fn render(&self, outcome: &RunOutcome) -> String;
}

/// Text summary for a terminal.
#[derive(Debug, Clone)]
pub struct TerminalSummary {
    /// Sparkline width in characters.
    pub width: usize,
}

impl Default for TerminalSummary {
    fn default() -> Self {
        Self { width: 60 }
    }
}

impl Visualizer for TerminalSummary {
    fn name(&self) -> &str {
        "terminal"
    }

    fn render(&self, outcome: &RunOutcome) -> String {
        let report = &outcome.report;
        let mut out = String::new();
        let _ = writeln!(out);
        let _ = writeln!(out, "=== Simulation Result ===");
        let _ = writeln!(out, "Run:            {}", outcome.run_id.short());
        let _ = writeln!(out, "Strategy:       {}", outcome.strategy);
        let _ = writeln!(
            out,
            "Instruments:    {}",
            outcome.config.run.instruments.join(", ")
        );
        if let (Some(first), Some(last)) = (outcome.series.dates.first(), outcome.series.dates.last())
        {
            let _ = writeln!(out, "Period:         {first} to {last}");
        }
        let _ = writeln!(
            out,
            "Days:           {} traded, {} without data",
            report.processed_days.len(),
            report.skipped_days.len()
        );
        let _ = writeln!(out, "Status:         {}", report.status.label());
        if let Some(value) = report.final_value.filter(|_| report.is_weighted()) {
            let _ = writeln!(out, "Final value:    {value:.2}");
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "--- Metrics ---");
        for (name, value) in outcome.metrics.named() {
            let _ = writeln!(out, "{:<16}{value:.4}", format!("{name}:"));
        }
        let _ = writeln!(out, "{:<16}{:.4}", "Score:", outcome.metrics.score());
        if let Some(baseline) = &outcome.baseline {
            let _ = writeln!(out, "Baseline:       {}", baseline.symbol);
        }

        if !outcome.series.total.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Cumulative return (%)");
            let _ = writeln!(out, "{}", sparkline(&outcome.series.total, self.width));
        }
        out
    }
}

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render `values` as at most `width` block characters, bucketing by mean.
pub fn sparkline(values: &[f64], width: usize) -> String {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || width == 0 {
        return String::new();
    }
    let buckets = finite.len().min(width);
    let points: Vec<f64> = (0..buckets)
        .map(|b| {
            let from = b * finite.len() / buckets;
            let to = ((b + 1) * finite.len() / buckets).max(from + 1);
            let chunk = &finite[from..to];
            chunk.iter().sum::<f64>() / chunk.len() as f64
        })
        .collect();

    let lo = points.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = points.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = hi - lo;
    points
        .iter()
        .map(|&p| {
            if span <= 0.0 {
                BARS[BARS.len() / 2]
            } else {
                let level = ((p - lo) / span * (BARS.len() - 1) as f64).round() as usize;
                BARS[level.min(BARS.len() - 1)]
            }
        })
        .collect()
}

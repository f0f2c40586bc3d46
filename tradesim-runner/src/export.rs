//! Result export: JSON score document, long-format panel CSV, artifact folders.
//!
//! The JSON document carries a `schema_version`; unknown versions are
//! rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tradesim_core::domain::{Field, PanelWindow};
use tradesim_core::engine::{RunStatus, SimulationReport};

use crate::config::{OutputFormat, RunConfig};
use crate::metrics::{ReturnSeries, RunMetrics};
use crate::runner::RunOutcome;

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

// ─── JSON result document ───────────────────────────────────────────

/// Per-day returns, positions and metrics of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultDocument {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub dates: Vec<String>,
    /// Aggregate daily return per date, percent.
    pub daily_pnl: Vec<f64>,
    /// Aggregate cumulative return per date, percent.
    pub total_pnl: Vec<f64>,
    pub stocks: Vec<String>,
    /// Daily return per date and instrument, percent.
    pub stock_pnl: Vec<Vec<f64>>,
    pub stock_position: Vec<Vec<i64>>,
    pub metrics: Vec<String>,
    pub metrics_values: Vec<f64>,
    pub score: f64,
    /// Benchmark the run was scored against.
    #[serde(default)]
    pub baseline: Option<String>,
}

impl ResultDocument {
    pub fn new(series: &ReturnSeries, metrics: &RunMetrics, baseline: Option<&str>) -> Self {
        let (names, values) = metrics.named().into_iter().unzip::<_, _, Vec<_>, Vec<_>>();
        Self {
            schema_version: SCHEMA_VERSION,
            dates: series.dates.iter().map(|d| d.to_string()).collect(),
            daily_pnl: series.daily.clone(),
            total_pnl: series.total.clone(),
            stocks: series.instruments.clone(),
            stock_pnl: series.instrument_daily.clone(),
            stock_position: series.positions.clone(),
            metrics: names.into_iter().map(str::to_string).collect(),
            metrics_values: values,
            score: metrics.score(),
            baseline: baseline.map(str::to_string),
        }
    }
}

pub fn export_json(doc: &ResultDocument) -> Result<String> {
    serde_json::to_string_pretty(doc).context("failed to serialize result document")
}

pub fn import_json(json: &str) -> Result<ResultDocument> {
    let doc: ResultDocument =
        serde_json::from_str(json).context("failed to deserialize result document")?;
    if doc.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            doc.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(doc)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// One row per (date, instrument) with every panel field. Portfolio-level
/// fields repeat on each instrument's row.
///
/// Columns: DATE, INSTRUMENT, then [`Field::ALL`] in order.
pub fn export_panel_csv(report: &SimulationReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["DATE", "INSTRUMENT"];
    header.extend(Field::ALL.iter().map(Field::name));
    wtr.write_record(&header)?;

    if let Some(window) = report.result_window() {
        for (row, date) in window.dates().iter().enumerate() {
            let date = date.to_string();
            for (col, instrument) in window.instruments().iter().enumerate() {
                let mut record = vec![date.clone(), instrument.clone()];
                record.extend(Field::ALL.iter().map(|&f| cell(&window, f, row, col)));
                wtr.write_record(&record)?;
            }
        }
    }

    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

fn cell(window: &PanelWindow<'_>, field: Field, row: usize, col: usize) -> String {
    if let Some(table) = window.float_field(field) {
        return format!("{:.6}", table.get(row, col));
    }
    match field {
        Field::Position => window.position().get(row, col).to_string(),
        Field::Order => window.order().get(row, col).to_string(),
        Field::FilledOrder => window.filled_order().get(row, col).to_string(),
        Field::Funds => format!("{:.6}", window.funds()[row]),
        Field::Margin => format!("{:.6}", window.margin()[row]),
        Field::Value => format!("{:.6}", window.value()[row]),
        _ => String::new(),
    }
}

// ─── Artifacts ──────────────────────────────────────────────────────

/// Provenance written next to every exported result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: String,
    pub timestamp: DateTime<Utc>,
    pub strategy: String,
    pub dataset_hash: String,
    pub status: RunStatus,
    pub processed_days: usize,
    pub skipped_days: usize,
    pub final_value: Option<f64>,
    pub score: f64,
    pub config: RunConfig,
}

impl RunManifest {
    pub fn new(outcome: &RunOutcome) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            run_id: outcome.run_id.to_string(),
            timestamp: Utc::now(),
            strategy: outcome.strategy.clone(),
            dataset_hash: outcome.dataset_hash.to_string(),
            status: outcome.report.status,
            processed_days: outcome.report.processed_days.len(),
            skipped_days: outcome.report.skipped_days.len(),
            final_value: outcome.report.final_value,
            score: outcome.metrics.score(),
            config: outcome.config.clone(),
        }
    }
}

/// Write `manifest.json` plus `result.json` or `panel.csv` into
/// `{output_dir}/{run_id_prefix}_{timestamp}/`. Returns the folder.
pub fn save_artifacts(outcome: &RunOutcome, output_dir: &Path) -> Result<PathBuf> {
    let manifest = RunManifest::new(outcome);
    let dirname = format!(
        "{}_{}",
        outcome.run_id.short(),
        manifest.timestamp.format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    match outcome.config.output.format {
        OutputFormat::Json => {
            let doc = ResultDocument::new(
                &outcome.series,
                &outcome.metrics,
                outcome.baseline.as_ref().map(|b| b.symbol.as_str()),
            );
            write(&run_dir.join("result.json"), &export_json(&doc)?)?;
        }
        OutputFormat::Csv => {
            write(&run_dir.join("panel.csv"), &export_panel_csv(&outcome.report)?)?;
        }
    }

    let json =
        serde_json::to_string_pretty(&manifest).context("failed to serialize run manifest")?;
    write(&run_dir.join("manifest.json"), &json)?;
    Ok(run_dir)
}

/// Load the result document of a JSON artifact folder.
pub fn load_result(dir: &Path) -> Result<ResultDocument> {
    let path = dir.join("result.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

fn write(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series() -> ReturnSeries {
        ReturnSeries {
            dates: vec![
                NaiveDate::from_ymd_opt(2010, 1, 5).unwrap(),
                NaiveDate::from_ymd_opt(2010, 1, 6).unwrap(),
            ],
            instruments: vec!["AAA".into(), "BBB".into()],
            instrument_daily: vec![vec![1.0, -0.5], vec![0.25, 0.25]],
            daily: vec![0.5, 0.5],
            total: vec![0.5, 1.0],
            positions: vec![vec![1, -1], vec![1, 0]],
        }
    }

    #[test]
    fn document_has_score_fields() {
        let s = series();
        let metrics = RunMetrics::compute(&s.daily, &s.total, None);
        let doc = ResultDocument::new(&s, &metrics, None);

        assert_eq!(doc.dates, vec!["2010-01-05", "2010-01-06"]);
        assert_eq!(doc.stocks, vec!["AAA", "BBB"]);
        assert_eq!(doc.metrics.len(), doc.metrics_values.len());
        assert_eq!(doc.metrics[0], "Total Pnl");
        assert_eq!(doc.score, 1.0);

        let json = export_json(&doc).unwrap();
        for key in [
            "\"dates\"",
            "\"daily_pnl\"",
            "\"total_pnl\"",
            "\"stock_pnl\"",
            "\"stock_position\"",
            "\"metrics_values\"",
            "\"score\"",
        ] {
            assert!(json.contains(key), "missing {key}");
        }
        let back = import_json(&json).unwrap();
        assert_eq!(back.dates, doc.dates);
        assert_eq!(back.stock_position, doc.stock_position);
        assert_eq!(back.metrics, doc.metrics);
    }

    #[test]
    fn future_schema_rejected() {
        let s = series();
        let metrics = RunMetrics::compute(&s.daily, &s.total, None);
        let mut doc = ResultDocument::new(&s, &metrics, None);
        doc.schema_version = SCHEMA_VERSION + 1;
        let json = export_json(&doc).unwrap();
        assert!(import_json(&json).is_err());
    }
}

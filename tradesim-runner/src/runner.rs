//! Run orchestration: config in, simulated panel plus metrics out.
//!
//! Two entry points:
//! - `run_from_config()`: picks the bar source named in `[data]`. Used by the CLI.
//! - `run_with_provider()`: takes any provider. Used by tests and callers that
//!   bring their own data.

use log::{info, warn};
use thiserror::Error;

use tradesim_core::data::{
    BaselineProvider, BaselineSeries, CsvSource, DataError, DataSource, MarketDataProvider,
    PanelLoader, ParquetSource, SyntheticSource,
};
use tradesim_core::engine::{run_simulation, MarginExecutor, SimulationReport};
use tradesim_core::fingerprint::{DatasetHash, RunId};
use tradesim_core::sizers::TargetWeightSizer;
use tradesim_core::strategies::Strategy;
use tradesim_core::SimError;

use crate::config::{ConfigError, RunConfig};
use crate::factory::{create_strategy, FactoryError};
use crate::metrics::{ReturnSeries, RunMetrics};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("strategy error: {0}")]
    Strategy(#[from] FactoryError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("simulation error: {0}")]
    Simulation(#[from] SimError),
}

/// Everything produced by one run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: RunId,
    pub dataset_hash: DatasetHash,
    pub strategy: String,
    pub config: RunConfig,
    pub report: SimulationReport,
    pub series: ReturnSeries,
    /// Benchmark closes over the result dates; weighted runs only.
    pub baseline: Option<BaselineSeries>,
    pub metrics: RunMetrics,
}

/// Run with the bar source configured in `[data]`.
pub fn run_from_config(config: &RunConfig) -> Result<RunOutcome, RunError> {
    let dir = config.data.dir.clone();
    match config.data.source {
        DataSource::Csv => run_with_provider(config, &PanelLoader::new(CsvSource::new(dir))),
        DataSource::Parquet => {
            run_with_provider(config, &PanelLoader::new(ParquetSource::new(dir)))
        }
        DataSource::Synthetic => run_with_provider(
            config,
            &PanelLoader::new(SyntheticSource::new(config.data.seed)),
        ),
    }
}

/// Load the panel, simulate, then score against the baseline when the run
/// ended in weighted mode.
///
/// A missing baseline is not fatal: the run is scored without it.
pub fn run_with_provider<P>(config: &RunConfig, provider: &P) -> Result<RunOutcome, RunError>
where
    P: MarketDataProvider + BaselineProvider,
{
    config.validate()?;
    let strategy = create_strategy(&config.strategy)?;
    let request = config.data_request()?;
    if let Some(needed) = history_shortfall(strategy.as_ref(), request.lookback) {
        warn!(
            "{} needs {needed} rows of history but the lookback is {}; it will stay flat",
            strategy.name(),
            request.lookback
        );
    }
    let panel = provider.load_data(&request)?;

    let dataset_hash = DatasetHash::of(&panel);
    let run_id = config.run_id(Some(&dataset_hash))?;
    info!(
        "run {}: {} on {} instruments, dataset {}",
        run_id.short(),
        strategy.name(),
        request.instruments.len(),
        &dataset_hash.0[..dataset_hash.0.len().min(12)]
    );

    let executor = MarginExecutor::new(config.costs.cost_model());
    let report = run_simulation(
        panel,
        &config.simulation_config()?,
        strategy.as_ref(),
        &TargetWeightSizer,
        &executor,
    )?;

    let series = ReturnSeries::from_report(&report, config.run.budget);
    let baseline = match &report.baseline_index {
        Some(index) if !series.is_empty() => {
            match provider.baseline(&config.run.exchange, index, &series.dates) {
                Ok(baseline) => Some(baseline),
                Err(e) => {
                    warn!("baseline {index} unavailable, scoring without it: {e}");
                    None
                }
            }
        }
        _ => None,
    };
    let baseline_returns = baseline.as_ref().map(BaselineSeries::daily_returns_pct);
    let metrics = RunMetrics::compute(&series.daily, &series.total, baseline_returns.as_deref());

    Ok(RunOutcome {
        run_id,
        dataset_hash,
        strategy: strategy.name().to_string(),
        config: config.clone(),
        report,
        series,
        baseline,
        metrics,
    })
}

/// Rows the strategy needs when the lookback window is too short to hold them.
fn history_shortfall(strategy: &dyn Strategy, lookback: usize) -> Option<usize> {
    let needed = strategy.min_history();
    (lookback < needed).then_some(needed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StrategyConfig;
    use chrono::NaiveDate;

    fn synthetic_config(strategy: StrategyConfig) -> RunConfig {
        let mut config = RunConfig::default();
        config.run.instruments = vec!["AAA".into(), "BBB".into()];
        config.run.start_date = NaiveDate::from_ymd_opt(2012, 1, 2).unwrap();
        config.run.end_date = NaiveDate::from_ymd_opt(2012, 3, 30).unwrap();
        config.run.lookback = 10;
        config.data.source = DataSource::Synthetic;
        config.strategy = strategy;
        config
    }

    #[test]
    fn signal_run_has_no_baseline() {
        let outcome = run_from_config(&synthetic_config(StrategyConfig::Momentum { period: 5 }))
            .unwrap();
        assert!(outcome.report.status.is_terminal());
        assert!(outcome.baseline.is_none());
        assert!(outcome.metrics.baseline_sharpe.is_none());
        assert_eq!(outcome.metrics.score(), outcome.metrics.total_pnl);
        assert_eq!(outcome.series.dates.len(), outcome.report.processed_days.len());
    }

    #[test]
    fn weighted_run_scores_against_baseline() {
        let outcome = run_from_config(&synthetic_config(StrategyConfig::MomentumWeights {
            period: 5,
            exposure: 0.9,
        }))
        .unwrap();
        let baseline = outcome.baseline.as_ref().unwrap();
        assert_eq!(baseline.symbol, "SPX");
        assert_eq!(baseline.dates, outcome.series.dates);
        assert!(outcome.metrics.baseline_sharpe.is_some());
        assert_eq!(outcome.metrics.score(), outcome.metrics.sharpe_ratio);
    }

    #[test]
    fn same_config_same_run_id() {
        let config = synthetic_config(StrategyConfig::MaCrossover { fast: 3, slow: 8 });
        let a = run_from_config(&config).unwrap();
        let b = run_from_config(&config).unwrap();
        assert_eq!(a.run_id, b.run_id);
        assert_eq!(a.dataset_hash, b.dataset_hash);
        assert_eq!(a.series, b.series);
    }

    #[test]
    fn short_lookback_is_reported() {
        use tradesim_core::strategies::{ConstantSignal, MomentumSignal};

        let momentum = MomentumSignal::new(10);
        assert_eq!(history_shortfall(&momentum, 5), Some(11));
        assert_eq!(history_shortfall(&momentum, 11), None);
        assert_eq!(history_shortfall(&ConstantSignal::new(1.0), 0), None);
    }

    #[test]
    fn bad_strategy_params_fail_before_loading() {
        let mut config = synthetic_config(StrategyConfig::Momentum { period: 0 });
        config.data.source = DataSource::Csv;
        config.data.dir = "/nonexistent".into();
        assert!(matches!(
            run_from_config(&config),
            Err(RunError::Strategy(FactoryError::ZeroPeriod { .. }))
        ));
    }
}

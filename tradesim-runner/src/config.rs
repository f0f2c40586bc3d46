//! TOML run configuration.
//!
//! Every section is optional; a missing section or key takes the default
//! shown below.
//!
//! ```toml
//! [run]
//! exchange = "abcd"
//! instruments = ["AAA", "BBB"]
//! start_date = "2010-01-01"
//! end_date = "2014-12-31"
//! lookback = 20
//! budget = 1000000.0
//! base_index = "SPX"
//! verbose = false
//!
//! [data]
//! source = "csv"          # csv | parquet | synthetic
//! dir = "data"
//! seed = 42
//!
//! [strategy]
//! type = "momentum"       # constant | momentum | ma_crossover | momentum_weights
//! [strategy.params]
//! period = 10
//!
//! [costs]
//! commission_bps = 0.0
//!
//! [output]
//! format = "csv"          # csv | json
//! dir = "results"
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tradesim_core::data::{DataRequest, DataSource};
use tradesim_core::engine::{CostModel, Lookback, SimulationConfig, DEFAULT_BASE_INDEX};
use tradesim_core::fingerprint::{DatasetHash, RunId};
use tradesim_core::SimError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Simulation(#[from] SimError),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Complete, reproducible description of one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub run: RunSection,
    pub data: DataConfig,
    pub strategy: StrategyConfig,
    pub costs: CostConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RunSection {
    pub exchange: String,
    pub instruments: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Kept signed so a negative value surfaces as an invalid lookback
    /// rather than a parse error.
    pub lookback: i64,
    pub budget: f64,
    pub base_index: String,
    pub verbose: bool,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            exchange: "abcd".into(),
            instruments: Vec::new(),
            start_date: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2014, 12, 31).unwrap_or_default(),
            lookback: 20,
            budget: 1_000_000.0,
            base_index: DEFAULT_BASE_INDEX.into(),
            verbose: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    pub source: DataSource,
    pub dir: PathBuf,
    /// Seed for the synthetic source.
    pub seed: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: DataSource::Csv,
            dir: PathBuf::from("data"),
            seed: 42,
        }
    }
}

/// Which built-in strategy to run, with its parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "params", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// The same signal every day; weighted when `exposure` is set.
    Constant {
        signal: f64,
        #[serde(default)]
        exposure: Option<f64>,
    },
    /// Sign of the move over `period` days.
    Momentum { period: usize },
    /// Fast/slow moving average crossover.
    MaCrossover { fast: usize, slow: usize },
    /// Weighted momentum: weights proportional to the size of the move.
    MomentumWeights { period: usize, exposure: f64 },
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig::Momentum { period: 10 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CostConfig {
    /// Commission per side in basis points, charged on weighted days.
    pub commission_bps: f64,
}

impl CostConfig {
    pub fn cost_model(&self) -> CostModel {
        CostModel::new(self.commission_bps)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Csv,
            dir: PathBuf::from("results"),
        }
    }
}

impl RunConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let run = &self.run;
        Lookback::new(run.lookback)?;
        if run.instruments.is_empty() {
            return Err(ConfigError::Invalid("no instruments to trade".into()));
        }
        if run.start_date > run.end_date {
            return Err(ConfigError::Invalid(format!(
                "start date {} is after end date {}",
                run.start_date, run.end_date
            )));
        }
        if !(run.budget.is_finite() && run.budget > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "budget must be positive, got {}",
                run.budget
            )));
        }
        if !(self.costs.commission_bps.is_finite() && self.costs.commission_bps >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "commission_bps must be non-negative, got {}",
                self.costs.commission_bps
            )));
        }
        Ok(())
    }

    pub fn simulation_config(&self) -> Result<SimulationConfig, ConfigError> {
        let run = &self.run;
        let mut config = SimulationConfig::new(
            run.start_date,
            run.end_date,
            Lookback::new(run.lookback)?,
            run.budget,
        );
        config.base_index = run.base_index.clone();
        config.verbose = run.verbose;
        Ok(config)
    }

    pub fn data_request(&self) -> Result<DataRequest, ConfigError> {
        let run = &self.run;
        Ok(DataRequest {
            exchange: run.exchange.clone(),
            instruments: run.instruments.clone(),
            start: run.start_date,
            end: run.end_date,
            lookback: Lookback::new(run.lookback)?.get(),
            budget: run.budget,
        })
    }

    /// Deterministic id over this config and, once loaded, the dataset.
    ///
    /// Output settings are left out: the same run written as CSV or JSON
    /// gets the same id.
    pub fn run_id(&self, dataset: Option<&DatasetHash>) -> Result<RunId, ConfigError> {
        let canonical = serde_json::to_vec(&(
            &self.run,
            &self.data.source,
            &self.data.seed,
            &self.strategy,
            &self.costs,
        ))?;
        Ok(RunId::new(&canonical, dataset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
[run]
exchange = "nyse"
instruments = ["AAA", "BBB"]
start_date = "2012-03-01"
end_date = "2012-06-29"
lookback = 5
budget = 50000.0
verbose = true

[data]
source = "synthetic"
seed = 7

[strategy]
type = "ma_crossover"
[strategy.params]
fast = 5
slow = 20

[costs]
commission_bps = 2.5

[output]
format = "json"
dir = "out"
"#;

    #[test]
    fn parses_every_section() {
        let config = RunConfig::from_toml(FULL).unwrap();
        assert_eq!(config.run.exchange, "nyse");
        assert_eq!(config.run.instruments, vec!["AAA", "BBB"]);
        assert_eq!(config.run.lookback, 5);
        assert_eq!(config.run.base_index, "SPX");
        assert_eq!(config.data.source, DataSource::Synthetic);
        assert_eq!(config.data.dir, PathBuf::from("data"));
        assert_eq!(
            config.strategy,
            StrategyConfig::MaCrossover { fast: 5, slow: 20 }
        );
        assert_eq!(config.costs.commission_bps, 2.5);
        assert_eq!(config.output.format, OutputFormat::Json);

        let sim = config.simulation_config().unwrap();
        assert_eq!(sim.lookback.get(), 5);
        assert!(sim.verbose);
    }

    #[test]
    fn defaults_fill_missing_sections() {
        let config = RunConfig::from_toml("[run]\ninstruments = [\"AAA\"]\n").unwrap();
        assert_eq!(config.run.budget, 1_000_000.0);
        assert_eq!(config.run.exchange, "abcd");
        assert_eq!(
            config.run.start_date,
            NaiveDate::from_ymd_opt(2010, 1, 1).unwrap()
        );
        assert_eq!(config.strategy, StrategyConfig::Momentum { period: 10 });
        assert_eq!(config.output.format, OutputFormat::Csv);
        assert_eq!(config.costs.commission_bps, 0.0);
    }

    #[test]
    fn negative_lookback_is_invalid_lookback() {
        let err =
            RunConfig::from_toml("[run]\ninstruments = [\"AAA\"]\nlookback = -2\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Simulation(SimError::InvalidLookback { value: -2 })
        ));
    }

    #[test]
    fn rejects_bad_ranges_and_unknown_keys() {
        assert!(matches!(
            RunConfig::from_toml("[run]\ninstruments = []\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            RunConfig::from_toml(
                "[run]\ninstruments = [\"A\"]\nstart_date = \"2012-01-02\"\nend_date = \"2011-01-03\"\n"
            ),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            RunConfig::from_toml("[run]\ninstruments = [\"A\"]\nbudgte = 5.0\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn run_id_ignores_output_settings() {
        let a = RunConfig::from_toml(FULL).unwrap();
        let mut b = a.clone();
        b.output.format = OutputFormat::Csv;
        assert_eq!(a.run_id(None).unwrap(), b.run_id(None).unwrap());

        b.run.lookback = 6;
        assert_ne!(a.run_id(None).unwrap(), b.run_id(None).unwrap());

        let hash = DatasetHash("abc".into());
        assert_ne!(a.run_id(None).unwrap(), a.run_id(Some(&hash)).unwrap());
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = RunConfig::from_file(Path::new("/nonexistent/run.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}

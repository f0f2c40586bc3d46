//! tradesim runner: configuration, data wiring, scoring and export.
//!
//! This crate builds on `tradesim-core` to provide:
//! - TOML run configuration with defaults and validation
//! - Strategy construction from config
//! - Single-run orchestration over CSV, Parquet or synthetic data
//! - Metrics against an optional baseline index
//! - JSON / CSV result export and a terminal summary

pub mod config;
pub mod export;
pub mod factory;
pub mod metrics;
pub mod runner;
pub mod visualizer;

pub use config::{ConfigError, OutputFormat, RunConfig, StrategyConfig};
pub use export::{save_artifacts, ResultDocument, RunManifest, SCHEMA_VERSION};
pub use factory::{create_strategy, FactoryError};
pub use metrics::{ReturnSeries, RunMetrics};
pub use runner::{run_from_config, run_with_provider, RunError, RunOutcome};
pub use visualizer::{TerminalSummary, Visualizer};

//! tradesim CLI: run a simulation and print the business-day calendar.
//!
//! Commands:
//! - `run`: simulate from a TOML config file and/or command-line flags
//! - `calendar`: list the business days between two dates

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;
use tradesim_core::calendar::business_days;
use tradesim_core::data::DataSource;
use tradesim_runner::{
    run_from_config, save_artifacts, OutputFormat, RunConfig, StrategyConfig, TerminalSummary,
    Visualizer,
};

#[derive(Parser)]
#[command(name = "tradesim", about = "tradesim: day-by-day portfolio simulation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation. Flags override values from --config.
    Run(RunArgs),
    /// Print the business days (Mon-Fri) between two dates.
    Calendar {
        /// First date (YYYY-MM-DD).
        #[arg(long)]
        start: String,

        /// Last date (YYYY-MM-DD), inclusive.
        #[arg(long)]
        end: String,
    },
}

#[derive(clap::Args, Default)]
struct RunArgs {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Instruments to trade, comma separated or repeated.
    #[arg(long, value_delimiter = ',')]
    instruments: Vec<String>,

    /// Exchange directory under the data dir.
    #[arg(long)]
    exchange: Option<String>,

    /// Start date (YYYY-MM-DD).
    #[arg(long)]
    start: Option<String>,

    /// End date (YYYY-MM-DD).
    #[arg(long)]
    end: Option<String>,

    /// Days of history passed to the strategy.
    #[arg(long, allow_negative_numbers = true)]
    lookback: Option<i64>,

    /// Starting capital.
    #[arg(long)]
    budget: Option<f64>,

    /// Strategy as name[:param[:param]], e.g. momentum:10, ma_crossover:10:50,
    /// momentum_weights:20:0.9, constant:1 or constant:1:0.5.
    #[arg(long)]
    strategy: Option<String>,

    /// Commission in basis points of traded notional.
    #[arg(long)]
    commission_bps: Option<f64>,

    /// Bar source: csv, parquet or synthetic.
    #[arg(long)]
    source: Option<String>,

    /// Data directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Seed for the synthetic source.
    #[arg(long)]
    seed: Option<u64>,

    /// Result format: csv or json.
    #[arg(long)]
    format: Option<String>,

    /// Output directory for run artifacts.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Also log a per-day detail block: prices, orders, positions, costs,
    /// funds, margin, pnl and value.
    #[arg(long, default_value_t = false)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run_cmd(args),
        Commands::Calendar { start, end } => calendar_cmd(&start, &end),
    }
}

fn run_cmd(args: RunArgs) -> Result<()> {
    let config = build_config(args)?;
    info!(
        "simulating {} from {} to {}",
        config.run.instruments.join(","),
        config.run.start_date,
        config.run.end_date
    );

    let outcome = run_from_config(&config).context("simulation failed")?;
    print!("{}", TerminalSummary::default().render(&outcome));

    let run_dir = save_artifacts(&outcome, &config.output.dir)?;
    println!("Artifacts saved to: {}", run_dir.display());
    Ok(())
}

fn calendar_cmd(start: &str, end: &str) -> Result<()> {
    let start = parse_date(start)?;
    let end = parse_date(end)?;
    if start > end {
        bail!("--start {start} is after --end {end}");
    }
    for day in business_days(start, end) {
        println!("{day}");
    }
    Ok(())
}

/// Config file (or defaults) with every given flag applied on top.
fn build_config(args: RunArgs) -> Result<RunConfig> {
    let mut config = match &args.config {
        Some(path) => RunConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => RunConfig::default(),
    };

    let run = &mut config.run;
    if !args.instruments.is_empty() {
        run.instruments = args.instruments;
    }
    if let Some(exchange) = args.exchange {
        run.exchange = exchange;
    }
    if let Some(start) = args.start.as_deref() {
        run.start_date = parse_date(start)?;
    }
    if let Some(end) = args.end.as_deref() {
        run.end_date = parse_date(end)?;
    }
    if let Some(lookback) = args.lookback {
        run.lookback = lookback;
    }
    if let Some(budget) = args.budget {
        run.budget = budget;
    }
    run.verbose |= args.verbose;

    if let Some(strategy) = args.strategy.as_deref() {
        config.strategy = parse_strategy(strategy)?;
    }
    if let Some(bps) = args.commission_bps {
        config.costs.commission_bps = bps;
    }
    if let Some(source) = args.source.as_deref() {
        config.data.source = parse_source(source)?;
    }
    if let Some(dir) = args.data_dir {
        config.data.dir = dir;
    }
    if let Some(seed) = args.seed {
        config.data.seed = seed;
    }
    if let Some(format) = args.format.as_deref() {
        config.output.format = parse_format(format)?;
    }
    if let Some(dir) = args.output_dir {
        config.output.dir = dir;
    }

    config.validate()?;
    Ok(config)
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
}

fn parse_strategy(text: &str) -> Result<StrategyConfig> {
    let mut parts = text.split(':');
    let name = parts.next().unwrap_or_default();
    let params: Vec<&str> = parts.collect();

    let period = |i: usize| -> Result<usize> {
        let raw = params
            .get(i)
            .with_context(|| format!("strategy '{name}' is missing parameter {}", i + 1))?;
        raw.parse::<usize>()
            .with_context(|| format!("invalid integer '{raw}' for strategy '{name}'"))
    };
    let number = |i: usize| -> Result<Option<f64>> {
        params
            .get(i)
            .map(|raw| {
                raw.parse::<f64>()
                    .with_context(|| format!("invalid number '{raw}' for strategy '{name}'"))
            })
            .transpose()
    };

    let (config, arity) = match name {
        "constant" => (
            StrategyConfig::Constant {
                signal: number(0)?.unwrap_or(1.0),
                exposure: number(1)?,
            },
            2,
        ),
        "momentum" => (StrategyConfig::Momentum { period: period(0)? }, 1),
        "ma_crossover" => (
            StrategyConfig::MaCrossover {
                fast: period(0)?,
                slow: period(1)?,
            },
            2,
        ),
        "momentum_weights" => (
            StrategyConfig::MomentumWeights {
                period: period(0)?,
                exposure: number(1)?.unwrap_or(1.0),
            },
            2,
        ),
        _ => bail!(
            "unknown strategy '{name}'. Valid: constant, momentum, ma_crossover, momentum_weights"
        ),
    };
    if params.len() > arity {
        bail!("strategy '{name}' takes at most {arity} parameters, got {}", params.len());
    }
    Ok(config)
}

fn parse_source(s: &str) -> Result<DataSource> {
    Ok(match s {
        "csv" => DataSource::Csv,
        "parquet" => DataSource::Parquet,
        "synthetic" => DataSource::Synthetic,
        _ => bail!("unknown data source '{s}'. Valid: csv, parquet, synthetic"),
    })
}

fn parse_format(s: &str) -> Result<OutputFormat> {
    Ok(match s {
        "csv" => OutputFormat::Csv,
        "json" => OutputFormat::Json,
        _ => bail!("unknown output format '{s}'. Valid: csv, json"),
    })
}

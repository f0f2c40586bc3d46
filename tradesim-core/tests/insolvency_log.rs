//! The insolvency halt is reported through the `log` facade.
//!
//! Kept in its own test binary: a logger can only be installed once per process.

use std::sync::Mutex;

use chrono::NaiveDate;
use log::{Level, LevelFilter, Log, Metadata, Record};
use tradesim_core::domain::{Panel, PriceTables, Table};
use tradesim_core::engine::{run_simulation, Lookback, MarginExecutor, SimulationConfig};
use tradesim_core::sizers::TargetWeightSizer;
use tradesim_core::strategies::ConstantSignal;

struct Capture {
    lines: Mutex<Vec<(Level, String)>>,
}

impl Log for Capture {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: Capture = Capture {
    lines: Mutex::new(Vec::new()),
};

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2010, 1, day).unwrap()
}

#[test]
fn halt_logs_warning_and_final_value() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Info);

    // Jan 4..=7; the Jan 6 close wipes out a fully invested book.
    let open = Table::from_rows(vec![vec![10.0], vec![10.0], vec![10.0], vec![10.0]]).unwrap();
    let close = Table::from_rows(vec![vec![10.0], vec![10.0], vec![0.0], vec![10.0]]).unwrap();
    let prices = PriceTables {
        open: open.clone(),
        high: open,
        low: close.clone(),
        close,
    };
    let panel = Panel::new(
        vec![d(4), d(5), d(6), d(7)],
        vec!["AAA".into()],
        prices,
        100.0,
    )
    .unwrap();

    let config = SimulationConfig::new(d(5), d(7), Lookback::new(1).unwrap(), 100.0);
    let report = run_simulation(
        panel,
        &config,
        &ConstantSignal::weighted(1.0, 1.0),
        &TargetWeightSizer,
        &MarginExecutor::default(),
    )
    .unwrap();
    assert!(report.status.is_halted());
    assert_eq!(report.processed_days, vec![d(5), d(6)]);

    let lines = LOGGER.lines.lock().unwrap();
    assert!(lines
        .iter()
        .any(|(level, msg)| *level == Level::Warn && msg.contains("insolvent")));
    assert!(lines
        .iter()
        .any(|(_, msg)| msg.starts_with("Trading date: 06 Jan 2010")));
    assert!(lines
        .iter()
        .any(|(_, msg)| msg.starts_with("Final portfolio value:")));
    // nothing traded after the halt
    assert!(!lines
        .iter()
        .any(|(_, msg)| msg.starts_with("Trading date: 07 Jan 2010")));
}

//! tradesim core: daily panel, simulation loop, orders, sizing, execution.
//!
//! This crate contains the heart of the simulator:
//! - Domain types (panel tables, orders, account state)
//! - Day-by-day simulation loop with strict write-once accounting
//! - Order sizer and executor traits with default implementations
//! - Bar sources (CSV, Parquet, synthetic) and panel construction
//! - Strategy trait and a few built-in strategies

pub mod calendar;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod indicators;
pub mod sizers;
pub mod strategies;

pub use error::SimError;

//! Market data: bar sources, alignment and panel construction.

pub mod align;
pub mod csv_source;
pub mod loader;
pub mod parquet;
pub mod provider;
pub mod synthetic;

pub use align::{align_symbols, AlignedBars};
pub use csv_source::CsvSource;
pub use loader::PanelLoader;
pub use parquet::ParquetSource;
pub use provider::{
    BarSource, BaselineProvider, BaselineSeries, DataError, DataRequest, DataSource,
    MarketDataProvider, RawBar,
};
pub use synthetic::SyntheticSource;

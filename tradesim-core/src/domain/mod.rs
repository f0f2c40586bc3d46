//! Domain types: panel tables, orders, account state.

pub mod account;
pub mod order;
pub mod panel;
pub mod table;

pub use account::AccountState;
pub use order::{
    normalize_weights, Order, OrderIntent, OrderMode, OrderRequest, SignalIntent, WeightedOrder,
};
pub use panel::{DayRow, Field, Panel, PanelWindow, PriceTables};
pub use table::{Table, TableView};

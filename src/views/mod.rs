//! Presentation adapters.
//!
//! Each adapter is a pure function of its input and yields a render-ready
//! view model. Empty input always produces an explicit no-data state.

pub mod chart;
pub mod table;
pub mod tabs;

pub use chart::{ChartKind, ChartSpec, ChartView, chart_view};
pub use table::{SortColumn, SortOrder, TablePage, TableRow, TableState, TableView, ValueCell};
pub use tabs::Tab;

/// Message shown in place of an empty chart or table.
pub const NO_DATA_MESSAGE: &str = "No emissions data available.";

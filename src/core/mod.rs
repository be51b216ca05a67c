//! Core dashboard logic: tables, filtering, selection and chart composition

pub mod cache;
pub mod chart;
pub mod config;
pub mod cot;
pub mod dashboard;
pub mod error;
pub mod log;
pub mod range;
pub mod series;
pub mod source;

// Re-export main types for cleaner imports
pub use chart::ChartSpec;
pub use cot::CotTable;
pub use dashboard::{Dashboard, Selection};
pub use error::DashError;
pub use range::{Bounds, DateInterval};
pub use series::{Observation, Series};
pub use source::{CachingTableSource, FjallTableSource, TableSource, Tables};

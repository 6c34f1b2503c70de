//! Core data structures: interest series, trend tables and labelled rows.

mod record;
mod time_series;
mod trend_table;

pub use record::{LifetimeLabel, TrainingRow};
pub use time_series::TimeSeries;
pub use trend_table::TrendTable;

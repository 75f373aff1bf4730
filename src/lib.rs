//! Sales performance reporting engine.
//!
//! Loads daily per-department sales sheets into a [`Dataset`] and computes
//! the numbers behind a performance dashboard: KPIs, period comparisons,
//! day/week/month rollups, cumulative trends, goal attainment, productivity
//! ratios and weekday heatmaps. Every computation takes the dataset by
//! shared reference and returns plain data.

pub mod cumulative;
pub mod dataset;
pub mod error;
pub mod goals;
pub mod heatmap;
pub mod loader;
pub mod logging;
pub mod output;
pub mod period;
pub mod reports;
pub mod rollup;
pub mod summary;
pub mod table;
pub mod types;
pub mod util;

pub use dataset::Dataset;
pub use error::{ReportError, Result};
pub use period::Period;
pub use types::{Department, Metric, Record, Unit};

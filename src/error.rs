use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No source files given")]
    NoSources,

    #[error("Dataset is empty: no valid rows in {0} source(s)")]
    EmptyDataset(usize),

    #[error("Invalid period: start {start} is after end {end}")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },

    #[error("Invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Unknown value type: {0} (expected converted/환산 or premium/보험료)")]
    UnknownValueType(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;

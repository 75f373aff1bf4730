use csv::ReaderBuilder;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::dataset::Dataset;
use crate::error::{ReportError, Result};
use crate::types::{Department, RawRow, Record};
use crate::util::{parse_date_safe, parse_f64_safe};

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub sources: usize,
    pub total_rows: usize,
    pub loaded_rows: usize,
    /// Rows whose date could not be read (or that failed to deserialize).
    pub parse_errors: usize,
    pub unknown_departments: usize,
}

impl LoadReport {
    fn absorb(&mut self, other: &LoadReport) {
        self.sources += other.sources;
        self.total_rows += other.total_rows;
        self.loaded_rows += other.loaded_rows;
        self.parse_errors += other.parse_errors;
        self.unknown_departments += other.unknown_departments;
    }
}

/// Validate one sheet row. Blank numeric cells count as 0.
fn clean_row(row: RawRow, report: &mut LoadReport) -> Option<Record> {
    let date = match parse_date_safe(row.date.as_deref()) {
        Some(d) => d,
        None => {
            report.parse_errors += 1;
            return None;
        }
    };
    let department = match row.department.as_deref().and_then(Department::parse) {
        Some(d) => d,
        None => {
            report.unknown_departments += 1;
            tracing::warn!(
                department = row.department.as_deref().unwrap_or(""),
                %date,
                "skipping row with unknown department"
            );
            return None;
        }
    };
    Some(Record {
        date,
        department,
        count: parse_f64_safe(row.count.as_deref()).unwrap_or(0.0),
        premium: parse_f64_safe(row.premium.as_deref()).unwrap_or(0.0),
        converted: parse_f64_safe(row.converted.as_deref()).unwrap_or(0.0),
        headcount: parse_f64_safe(row.headcount.as_deref()).unwrap_or(0.0),
        monthly_goal: parse_f64_safe(row.monthly_goal.as_deref()),
    })
}

/// Read one delimited source. `source` only labels log lines.
pub fn read_records<R: Read>(reader: R, source: &str) -> Result<(Vec<Record>, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).trim(csv::Trim::All).from_reader(reader);
    let mut report = LoadReport { sources: 1, ..LoadReport::default() };
    let mut records = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(source, error = %e, "unreadable row");
                report.parse_errors += 1;
                continue;
            }
        };
        if let Some(record) = clean_row(row, &mut report) {
            records.push(record);
        }
    }
    report.loaded_rows = records.len();
    tracing::info!(
        source,
        rows = report.total_rows,
        loaded = report.loaded_rows,
        "read source"
    );
    Ok((records, report))
}

pub fn load_source(path: &Path) -> Result<(Vec<Record>, LoadReport)> {
    // Sheet exports may carry a UTF-8 BOM; the csv reader strips it.
    let file = std::fs::File::open(path)?;
    read_records(file, &path.display().to_string())
}

/// Load every source and merge them into one dataset.
pub fn load_sources(paths: &[PathBuf]) -> Result<(Dataset, LoadReport)> {
    if paths.is_empty() {
        return Err(ReportError::NoSources);
    }
    let mut all = Vec::new();
    let mut report = LoadReport::default();
    for path in paths {
        let (records, r) = load_source(path)?;
        all.extend(records);
        report.absorb(&r);
    }
    if all.is_empty() {
        return Err(ReportError::EmptyDataset(report.sources));
    }
    if report.parse_errors + report.unknown_departments > 0 {
        tracing::warn!(
            parse_errors = report.parse_errors,
            unknown_departments = report.unknown_departments,
            "some rows were skipped"
        );
    }
    Ok((Dataset::new(all), report))
}

use std::path::Path;

use crate::dataset::Dataset;
use crate::error::Result;
use crate::output;
use crate::period::{self, Period};
use crate::types::{Department, DetailRow, Record};
use crate::util::format_plain;

/// Records for the selected departments inside `period`, ordered by date
/// then department. `None` when no department is selected.
pub fn detail_records<'a>(
    dataset: &'a Dataset,
    departments: &[Department],
    period: &Period,
) -> Option<Vec<&'a Record>> {
    if departments.is_empty() {
        return None;
    }
    let mut rows = period::filter_departments(dataset.records(), period, departments);
    rows.sort_by(|a, b| a.date.cmp(&b.date).then(a.department.cmp(&b.department)));
    Some(rows)
}

pub fn to_detail_row(r: &Record) -> DetailRow {
    DetailRow {
        date: r.date.format("%Y-%m-%d").to_string(),
        department: r.department.label().to_string(),
        count: format_plain(r.count),
        premium: format_plain(r.premium),
        converted: format_plain(r.converted),
        headcount: format_plain(r.headcount),
        monthly_goal: r.monthly_goal.map(format_plain).unwrap_or_default(),
    }
}

/// Write the detail table as CSV; returns the number of data rows.
pub fn export_detail(path: &Path, records: &[&Record]) -> Result<usize> {
    let rows: Vec<DetailRow> = records.iter().map(|r| to_detail_row(r)).collect();
    output::write_csv(path, &rows)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "exported detail table");
    Ok(rows.len())
}

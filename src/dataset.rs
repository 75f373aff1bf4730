use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::period::{self, Period};
use crate::types::{Department, Record, Unit};
use crate::util::month_start;

/// The merged, read-only record set every computation runs against.
///
/// Records are kept sorted by `(date, department)`.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(mut records: Vec<Record>) -> Dataset {
        records.sort_by(|a, b| a.date.cmp(&b.date).then(a.department.cmp(&b.department)));
        Dataset { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.first()?;
        let last = self.records.last()?;
        Some((first.date, last.date))
    }

    /// Departments that appear anywhere in the data, in display order.
    pub fn departments(&self) -> Vec<Department> {
        let set: BTreeSet<Department> = self.records.iter().map(|r| r.department).collect();
        set.into_iter().collect()
    }

    pub fn select(&self, period: &Period, unit: Unit) -> Vec<&Record> {
        period::filter(&self.records, period, unit)
    }

    /// Month-to-date of the latest record, clipped to the earliest record.
    pub fn default_period(&self) -> Option<Period> {
        let (min, max) = self.date_bounds()?;
        let start = month_start(max).max(min);
        Some(Period { start, end: max })
    }

    /// Every date that has data.
    pub fn full_period(&self) -> Option<Period> {
        let (min, max) = self.date_bounds()?;
        Some(Period { start: min, end: max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(date: NaiveDate, department: Department) -> Record {
        Record {
            date,
            department,
            count: 1.0,
            premium: 0.0,
            converted: 0.0,
            headcount: 0.0,
            monthly_goal: None,
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn sorts_and_reports_bounds() {
        let ds = Dataset::new(vec![
            rec(d(2024, 2, 10), Department::Legend),
            rec(d(2024, 1, 20), Department::Gold1),
            rec(d(2024, 2, 10), Department::Alpha),
        ]);
        assert_eq!(ds.date_bounds(), Some((d(2024, 1, 20), d(2024, 2, 10))));
        assert_eq!(ds.records()[1].department, Department::Alpha);
        assert_eq!(
            ds.departments(),
            vec![Department::Alpha, Department::Gold1, Department::Legend]
        );
    }

    #[test]
    fn default_period_is_month_to_date_clipped_to_data() {
        let ds = Dataset::new(vec![
            rec(d(2024, 2, 5), Department::Alpha),
            rec(d(2024, 2, 20), Department::Alpha),
        ]);
        let p = ds.default_period().unwrap();
        assert_eq!(p.start, d(2024, 2, 5));
        assert_eq!(p.end, d(2024, 2, 20));

        let ds = Dataset::new(vec![
            rec(d(2024, 1, 5), Department::Alpha),
            rec(d(2024, 2, 20), Department::Alpha),
        ]);
        assert_eq!(ds.default_period().unwrap().start, d(2024, 2, 1));
        assert!(Dataset::default().default_period().is_none());
    }
}

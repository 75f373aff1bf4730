//! Closed date intervals and the record filters built on them.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::fmt;

use crate::error::{ReportError, Result};
use crate::types::{Department, Record, Unit};
use crate::util::{month_start, week_monday};

/// A closed interval `[start, end]` of calendar days, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Period> {
        if start > end {
            return Err(ReportError::InvalidPeriod { start, end });
        }
        Ok(Period { start, end })
    }

    pub fn single(day: NaiveDate) -> Period {
        Period { start: day, end: day }
    }

    /// Number of days in the interval, both ends included.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// The interval of the same length ending the day before `start`.
    pub fn previous(&self) -> Period {
        let end = self.start - Duration::days(1);
        let start = end - Duration::days(self.len_days() - 1);
        Period { start, end }
    }

    pub fn contains(&self, d: NaiveDate) -> bool {
        self.start <= d && d <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..self.len_days()).map(move |i| start + Duration::days(i))
    }

    /// From the Monday of `base`'s week up to `base`.
    pub fn week_to_date(base: NaiveDate) -> Period {
        Period { start: week_monday(base), end: base }
    }

    /// The full Monday..Sunday week before `base`'s week.
    pub fn previous_week(base: NaiveDate) -> Period {
        let this_monday = week_monday(base);
        Period {
            start: this_monday - Duration::days(7),
            end: this_monday - Duration::days(1),
        }
    }

    /// From the first of `base`'s month up to `base`.
    pub fn month_to_date(base: NaiveDate) -> Period {
        Period { start: month_start(base), end: base }
    }

    /// The whole calendar month before `base`'s month.
    pub fn previous_month(base: NaiveDate) -> Period {
        let last = month_start(base) - Duration::days(1);
        Period { start: month_start(last), end: last }
    }

    /// `YY.MM.DD~YY.MM.DD`, the way period titles are written.
    pub fn label(&self) -> String {
        format!(
            "{}~{}",
            self.start.format("%y.%m.%d"),
            self.end.format("%y.%m.%d")
        )
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Records dated inside `period` that belong to `unit`.
///
/// An empty result is normal; every aggregation treats it as all-zero.
pub fn filter<'a>(records: &'a [Record], period: &Period, unit: Unit) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|r| period.contains(r.date) && unit.matches(r.department))
        .collect()
}

/// Records dated inside `period` whose department is in `departments`.
pub fn filter_departments<'a>(
    records: &'a [Record],
    period: &Period,
    departments: &[Department],
) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|r| period.contains(r.date) && departments.contains(&r.department))
        .collect()
}

//! Day / week / month rollups with gap filling.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::dataset::Dataset;
use crate::period::Period;
use crate::types::{Department, Metric, Record, Unit};
use crate::util::{is_weekday, month_start, next_month_start, week_monday};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [Granularity::Day, Granularity::Week, Granularity::Month];

    pub fn name(self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
        }
    }

    /// Bucket a date falls into, or `None` when the granularity ignores it
    /// (weekends in weekly rollups).
    pub fn bucket_of(self, d: NaiveDate) -> Option<NaiveDate> {
        match self {
            Granularity::Day => Some(d),
            Granularity::Week if is_weekday(d) => Some(week_monday(d)),
            Granularity::Week => None,
            Granularity::Month => Some(month_start(d)),
        }
    }

    pub fn bucket_label(self, bucket: NaiveDate) -> String {
        match self {
            Granularity::Day | Granularity::Week => bucket.format("%m-%d").to_string(),
            Granularity::Month => bucket.format("%y-%m").to_string(),
        }
    }

    /// Every bucket start covering `period`, contiguous and in order.
    pub fn bucket_starts(self, period: &Period) -> Vec<NaiveDate> {
        match self {
            Granularity::Day => period.days().collect(),
            Granularity::Week => {
                let mut out = Vec::new();
                let mut monday = week_monday(period.start);
                while monday <= period.end {
                    out.push(monday);
                    monday += Duration::days(7);
                }
                out
            }
            Granularity::Month => {
                let mut out = Vec::new();
                let mut first = month_start(period.start);
                while first <= period.end {
                    out.push(first);
                    first = next_month_start(first);
                }
                out
            }
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How empty buckets are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    /// Bar views: an empty bucket is a zero bar.
    Zero,
    /// Line views: zero buckets are treated as missing and interpolated.
    Interpolate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub start: NaiveDate,
    pub label: String,
    pub value: f64,
}

/// Sum `metric` over `records` into the buckets of `period`.
///
/// Records outside `period` are ignored; missing buckets are filled
/// according to `fill`, so the output always has one entry per bucket.
pub fn rollup(
    records: &[&Record],
    period: &Period,
    granularity: Granularity,
    metric: Metric,
    fill: Fill,
) -> Vec<Bucket> {
    let mut sums: HashMap<NaiveDate, f64> = HashMap::new();
    for r in records.iter().filter(|r| period.contains(r.date)) {
        if let Some(key) = granularity.bucket_of(r.date) {
            *sums.entry(key).or_insert(0.0) += metric.value(r);
        }
    }

    let starts = granularity.bucket_starts(period);
    let raw: Vec<f64> = starts
        .iter()
        .map(|s| sums.get(s).copied().unwrap_or(0.0))
        .collect();
    let values = match fill {
        Fill::Zero => raw,
        Fill::Interpolate => interpolate_gaps(&raw),
    };

    starts
        .into_iter()
        .zip(values)
        .map(|(start, value)| Bucket {
            start,
            label: granularity.bucket_label(start),
            value,
        })
        .collect()
}

/// Replace zero entries by linear interpolation between the surrounding
/// non-zero entries.
///
/// Leading zeros stay zero; trailing zeros take the last non-zero value.
pub fn interpolate_gaps(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    let mut last: Option<usize> = None;
    for (i, &v) in values.iter().enumerate() {
        if v == 0.0 {
            continue;
        }
        if let Some(p) = last {
            let gap = i - p;
            if gap > 1 {
                let step = (v - values[p]) / gap as f64;
                for (k, slot) in out.iter_mut().enumerate().take(i).skip(p + 1) {
                    *slot = values[p] + step * (k - p) as f64;
                }
            }
        }
        last = Some(i);
    }
    if let Some(p) = last {
        for slot in out.iter_mut().skip(p + 1) {
            *slot = values[p];
        }
    }
    out
}

#[derive(Debug, Clone, Serialize)]
pub struct DepartmentSeries {
    pub department: Department,
    pub buckets: Vec<Bucket>,
}

/// One interpolated line per department present in the dataset, for
/// side-by-side department comparison.
pub fn rollup_by_department(
    dataset: &Dataset,
    period: &Period,
    granularity: Granularity,
    metric: Metric,
) -> Vec<DepartmentSeries> {
    dataset
        .departments()
        .into_iter()
        .map(|department| {
            let records = dataset.select(period, Unit::Dept(department));
            DepartmentSeries {
                department,
                buckets: rollup(&records, period, granularity, metric, Fill::Interpolate),
            }
        })
        .collect()
}

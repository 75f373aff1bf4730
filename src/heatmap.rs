//! Department × weekday heatmap.

use chrono::{Datelike, Weekday};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::dataset::Dataset;
use crate::period::Period;
use crate::types::{Department, Metric, Record, Unit};
use crate::util::average;

pub const NORMALIZATION_EPSILON: f64 = 1e-8;

pub const WEEKDAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

#[derive(Debug, Clone, Serialize)]
pub struct HeatmapLine {
    pub department: Department,
    /// Mean per weekday, Monday first.
    pub means: [f64; 5],
    /// `means` min-max scaled into `[0, 1]`.
    pub normalized: [f64; 5],
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekdayHeatmap {
    pub metric: Metric,
    pub lines: Vec<HeatmapLine>,
}

/// Mean of `metric` per department and weekday.
///
/// Zero-valued records are left out of the mean; a weekday with no
/// non-zero record reports 0. Weekend records are ignored.
pub fn weekday_means(records: &[&Record], metric: Metric) -> BTreeMap<Department, [f64; 5]> {
    let mut samples: BTreeMap<Department, [Vec<f64>; 5]> = BTreeMap::new();
    for r in records {
        let idx = r.date.weekday().num_days_from_monday() as usize;
        if idx >= WEEKDAYS.len() {
            continue;
        }
        let slots = samples.entry(r.department).or_default();
        let v = metric.value(r);
        if v != 0.0 {
            slots[idx].push(v);
        }
    }
    samples
        .into_iter()
        .map(|(dept, slots)| {
            let mut means = [0.0; 5];
            for (mean, values) in means.iter_mut().zip(slots.iter()) {
                *mean = average(values);
            }
            (dept, means)
        })
        .collect()
}

/// `(v - min) / (max - min + ε)` across one row.
pub fn normalize_row(values: &[f64; 5]) -> [f64; 5] {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut out = [0.0; 5];
    for (o, v) in out.iter_mut().zip(values.iter()) {
        *o = (v - min) / (max - min + NORMALIZATION_EPSILON);
    }
    out
}

pub fn weekday_heatmap(dataset: &Dataset, period: &Period, metric: Metric) -> WeekdayHeatmap {
    let records = dataset.select(period, Unit::All);
    let lines = weekday_means(&records, metric)
        .into_iter()
        .map(|(department, means)| HeatmapLine {
            department,
            means,
            normalized: normalize_row(&means),
        })
        .collect();
    WeekdayHeatmap { metric, lines }
}

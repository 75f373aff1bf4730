//! Running totals for a period and the period right before it.

use chrono::NaiveDate;
use serde::Serialize;

use crate::dataset::Dataset;
use crate::period::Period;
use crate::rollup::{rollup, Fill, Granularity};
use crate::types::{Department, Metric, Unit};

/// Current-period running total with the previous period's running total
/// aligned by day offset.
#[derive(Debug, Clone, Serialize)]
pub struct CumulativeComparison {
    pub metric: Metric,
    pub period: Period,
    pub previous_period: Period,
    pub dates: Vec<NaiveDate>,
    pub current: Vec<f64>,
    /// `None` where the previous period has no entry for an offset, so a
    /// line chart shows a gap instead of a drop to zero.
    pub previous: Vec<Option<f64>>,
}

impl CumulativeComparison {
    pub fn current_total(&self) -> f64 {
        self.current.last().copied().unwrap_or(0.0)
    }

    pub fn previous_total(&self) -> f64 {
        self.previous.iter().rev().find_map(|v| *v).unwrap_or(0.0)
    }
}

pub fn running_total(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

/// Zero-filled daily sums of `metric` for `unit` over `period`.
pub fn daily_totals(dataset: &Dataset, period: &Period, unit: Unit, metric: Metric) -> Vec<f64> {
    let records = dataset.select(period, unit);
    rollup(&records, period, Granularity::Day, metric, Fill::Zero)
        .into_iter()
        .map(|b| b.value)
        .collect()
}

/// Pad or truncate `series` to `len` entries, padding with `None`.
pub fn align(series: &[f64], len: usize) -> Vec<Option<f64>> {
    (0..len).map(|i| series.get(i).copied()).collect()
}

pub fn compare_with_previous(
    dataset: &Dataset,
    period: &Period,
    unit: Unit,
    metric: Metric,
) -> CumulativeComparison {
    let previous_period = period.previous();
    let current = running_total(&daily_totals(dataset, period, unit, metric));
    let previous_cum = running_total(&daily_totals(dataset, &previous_period, unit, metric));
    let previous = align(&previous_cum, current.len());

    tracing::debug!(
        %period,
        %previous_period,
        metric = metric.label(),
        "built cumulative comparison"
    );

    CumulativeComparison {
        metric,
        period: *period,
        previous_period,
        dates: period.days().collect(),
        current,
        previous,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DepartmentCumulative {
    pub department: Department,
    pub values: Vec<f64>,
}

/// Running totals over `period` for every department in the fixed list,
/// including departments with no records (all zeros).
pub fn cumulative_by_department(
    dataset: &Dataset,
    period: &Period,
    metric: Metric,
) -> Vec<DepartmentCumulative> {
    Department::ALL
        .iter()
        .map(|&department| DepartmentCumulative {
            department,
            values: running_total(&daily_totals(
                dataset,
                period,
                Unit::Dept(department),
                metric,
            )),
        })
        .collect()
}

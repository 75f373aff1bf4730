//! Headline KPIs, period-over-period cards, department totals and
//! productivity ratios.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;

use crate::dataset::Dataset;
use crate::period::Period;
use crate::types::{Department, Metric, Record, Unit};
use crate::util::{average, round_to, safe_ratio};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub count: f64,
    pub amount: f64,
    pub headcount: f64,
}

pub fn totals(records: &[&Record], amount: Metric) -> Totals {
    records.iter().fold(Totals::default(), |acc, r| Totals {
        count: acc.count + r.count,
        amount: acc.amount + amount.value(r),
        headcount: acc.headcount + r.headcount,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    pub period: Period,
    pub unit: Unit,
    pub metric: Metric,
    pub total_count: f64,
    pub total_amount: f64,
    /// Distinct dates that have at least one record.
    pub active_days: usize,
    pub avg_daily_count: f64,
    pub avg_daily_amount: f64,
}

/// Headline numbers for the selection, or `None` when it has no records.
pub fn kpi(dataset: &Dataset, period: &Period, unit: Unit, metric: Metric) -> Option<Kpi> {
    let records = dataset.select(period, unit);
    if records.is_empty() {
        return None;
    }
    let t = totals(&records, metric);
    let active_days = records.iter().map(|r| r.date).collect::<HashSet<_>>().len();
    Some(Kpi {
        period: *period,
        unit,
        metric,
        total_count: t.count,
        total_amount: t.amount,
        active_days,
        avg_daily_count: round_to(safe_ratio(t.count, active_days as f64), 2),
        avg_daily_amount: round_to(safe_ratio(t.amount, active_days as f64), 0),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub current_period: Period,
    pub previous_period: Period,
    pub current: Totals,
    pub previous: Totals,
}

impl Comparison {
    pub fn new(
        dataset: &Dataset,
        current_period: Period,
        previous_period: Period,
        unit: Unit,
        metric: Metric,
    ) -> Comparison {
        Comparison {
            current_period,
            previous_period,
            current: totals(&dataset.select(&current_period, unit), metric),
            previous: totals(&dataset.select(&previous_period, unit), metric),
        }
    }

    pub fn count_diff(&self) -> f64 {
        self.current.count - self.previous.count
    }

    pub fn amount_diff(&self) -> f64 {
        self.current.amount - self.previous.amount
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodComparisons {
    pub base: NaiveDate,
    /// `base` against the day before.
    pub day: Comparison,
    /// Week-to-date against the whole previous week.
    pub week: Comparison,
    /// Month-to-date against the whole previous month.
    pub month: Comparison,
}

pub fn period_comparisons(
    dataset: &Dataset,
    base: NaiveDate,
    unit: Unit,
    metric: Metric,
) -> PeriodComparisons {
    let today = Period::single(base);
    PeriodComparisons {
        base,
        day: Comparison::new(dataset, today, today.previous(), unit, metric),
        week: Comparison::new(
            dataset,
            Period::week_to_date(base),
            Period::previous_week(base),
            unit,
            metric,
        ),
        month: Comparison::new(
            dataset,
            Period::month_to_date(base),
            Period::previous_month(base),
            unit,
            metric,
        ),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Productivity {
    /// Contracts per active head, two decimals.
    pub contracts_per_head: f64,
    pub amount_per_contract: f64,
    pub amount_per_head: f64,
}

impl Productivity {
    pub fn from_totals(t: &Totals) -> Productivity {
        Productivity {
            contracts_per_head: round_to(safe_ratio(t.count, t.headcount), 2),
            amount_per_contract: round_to(safe_ratio(t.amount, t.count), 0),
            amount_per_head: round_to(safe_ratio(t.amount, t.headcount), 0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentTotal {
    pub department: Department,
    pub totals: Totals,
    /// Percent of the all-department count, one decimal.
    pub count_share: f64,
    pub amount_share: f64,
    pub productivity: Productivity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentBreakdown {
    pub period: Period,
    pub metric: Metric,
    pub departments: Vec<DepartmentTotal>,
    /// Mean count across the departments listed, one decimal.
    pub mean_count: f64,
    pub mean_amount: f64,
    /// Productivity of the selected unit as a whole.
    pub unit_productivity: Productivity,
}

/// Per-department totals, shares and productivity over `period` for the
/// departments that have records in it.
pub fn department_breakdown(
    dataset: &Dataset,
    period: &Period,
    unit: Unit,
    metric: Metric,
) -> DepartmentBreakdown {
    let all = dataset.select(period, Unit::All);
    let grand = totals(&all, metric);

    let mut present: Vec<Department> = all.iter().map(|r| r.department).collect();
    present.sort();
    present.dedup();

    let departments: Vec<DepartmentTotal> = present
        .into_iter()
        .map(|department| {
            let rows: Vec<&Record> = all
                .iter()
                .copied()
                .filter(|r| r.department == department)
                .collect();
            let t = totals(&rows, metric);
            DepartmentTotal {
                department,
                totals: t,
                count_share: round_to(safe_ratio(t.count, grand.count) * 100.0, 1),
                amount_share: round_to(safe_ratio(t.amount, grand.amount) * 100.0, 1),
                productivity: Productivity::from_totals(&t),
            }
        })
        .collect();

    let counts: Vec<f64> = departments.iter().map(|d| d.totals.count).collect();
    let amounts: Vec<f64> = departments.iter().map(|d| d.totals.amount).collect();
    let unit_totals = totals(&dataset.select(period, unit), metric);

    DepartmentBreakdown {
        period: *period,
        metric,
        mean_count: round_to(average(&counts), 1),
        mean_amount: round_to(average(&amounts), 0),
        departments,
        unit_productivity: Productivity::from_totals(&unit_totals),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn rec(date: NaiveDate, department: Department, count: f64, premium: f64, headcount: f64) -> Record {
        Record {
            date,
            department,
            count,
            premium,
            converted: premium / 10.0,
            headcount,
            monthly_goal: None,
        }
    }

    #[test]
    fn kpi_averages_over_active_days() {
        let ds = Dataset::new(vec![
            rec(d(2024, 1, 1), Department::Alpha, 3.0, 300.0, 5.0),
            rec(d(2024, 1, 1), Department::Gold1, 2.0, 200.0, 5.0),
            rec(d(2024, 1, 4), Department::Alpha, 2.0, 101.0, 5.0),
        ]);
        let p = Period::new(d(2024, 1, 1), d(2024, 1, 10)).unwrap();
        let k = kpi(&ds, &p, Unit::All, Metric::Premium).unwrap();
        assert_eq!(k.total_count, 7.0);
        assert_eq!(k.total_amount, 601.0);
        assert_eq!(k.active_days, 2);
        assert_eq!(k.avg_daily_count, 3.5);
        assert_eq!(k.avg_daily_amount, 301.0);
    }

    #[test]
    fn kpi_is_none_for_empty_selection() {
        let ds = Dataset::new(vec![rec(d(2024, 1, 1), Department::Alpha, 3.0, 300.0, 5.0)]);
        let p = Period::new(d(2024, 2, 1), d(2024, 2, 10)).unwrap();
        assert!(kpi(&ds, &p, Unit::All, Metric::Premium).is_none());
    }

    #[test]
    fn comparison_windows_follow_calendar() {
        // 2024-03-13 is a Wednesday.
        let ds = Dataset::new(vec![
            rec(d(2024, 3, 13), Department::Alpha, 4.0, 400.0, 1.0),
            rec(d(2024, 3, 12), Department::Alpha, 1.0, 100.0, 1.0),
            rec(d(2024, 3, 5), Department::Alpha, 6.0, 600.0, 1.0),
            rec(d(2024, 2, 20), Department::Alpha, 10.0, 1000.0, 1.0),
            rec(d(2024, 3, 13), Department::Gold1, 50.0, 5000.0, 1.0),
        ]);
        let cmp = period_comparisons(&ds, d(2024, 3, 13), Unit::Dept(Department::Alpha), Metric::Premium);
        assert_eq!(cmp.day.current.count, 4.0);
        assert_eq!(cmp.day.previous.count, 1.0);
        assert_eq!(cmp.day.count_diff(), 3.0);
        assert_eq!(cmp.week.current.count, 5.0);
        assert_eq!(cmp.week.previous.count, 6.0);
        assert_eq!(cmp.week.amount_diff(), -100.0);
        assert_eq!(cmp.month.current.count, 11.0);
        assert_eq!(cmp.month.previous.count, 10.0);
    }

    #[test]
    fn breakdown_shares_and_productivity() {
        let ds = Dataset::new(vec![
            rec(d(2024, 1, 2), Department::Alpha, 3.0, 3000.0, 2.0),
            rec(d(2024, 1, 2), Department::Legend, 1.0, 1000.0, 0.0),
        ]);
        let p = Period::new(d(2024, 1, 1), d(2024, 1, 31)).unwrap();
        let b = department_breakdown(&ds, &p, Unit::Dept(Department::Alpha), Metric::Premium);
        assert_eq!(b.departments.len(), 2);
        let alpha = &b.departments[0];
        assert_eq!(alpha.count_share, 75.0);
        assert_eq!(alpha.amount_share, 75.0);
        assert_eq!(alpha.productivity.contracts_per_head, 1.5);
        assert_eq!(alpha.productivity.amount_per_contract, 1000.0);
        assert_eq!(alpha.productivity.amount_per_head, 1500.0);
        let legend = &b.departments[1];
        assert_eq!(legend.productivity.contracts_per_head, 0.0);
        assert_eq!(legend.productivity.amount_per_head, 0.0);
        assert_eq!(b.mean_count, 2.0);
        assert_eq!(b.unit_productivity, alpha.productivity);
    }

    #[test]
    fn productivity_of_empty_totals_is_zero() {
        assert_eq!(Productivity::from_totals(&Totals::default()), Productivity::default());
    }
}

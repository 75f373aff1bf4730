//! Assembles every dashboard section for one query and flattens the
//! sections into printable / exportable rows.

use serde::Serialize;

use crate::cumulative::{self, CumulativeComparison, DepartmentCumulative};
use crate::dataset::Dataset;
use crate::goals::{self, GoalReport, GoalStatus};
use crate::heatmap::{self, WeekdayHeatmap};
use crate::period::Period;
use crate::rollup::{self, Bucket, DepartmentSeries, Fill, Granularity};
use crate::summary::{self, Comparison, DepartmentBreakdown, Kpi, PeriodComparisons};
use crate::types::{
    ComparisonRow, CumulativeRow, DepartmentRow, DepartmentTrendRow, GoalRow, HeatmapRow, KpiRow,
    Metric, RollupRow, Unit,
};
use crate::util::{format_diff, format_number};

/// One user selection: date range, unit and amount basis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DashboardQuery {
    pub period: Period,
    pub unit: Unit,
    pub metric: Metric,
}

#[derive(Debug, Clone, Serialize)]
pub struct RollupSet {
    pub granularity: Granularity,
    pub count: Vec<Bucket>,
    pub amount: Vec<Bucket>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DepartmentTrend {
    pub granularity: Granularity,
    pub count: Vec<DepartmentSeries>,
    pub amount: Vec<DepartmentSeries>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub query: DashboardQuery,
    pub kpi: Option<Kpi>,
    pub goals: GoalReport,
    pub comparisons: PeriodComparisons,
    pub rollups: Vec<RollupSet>,
    pub cumulative_count: CumulativeComparison,
    pub cumulative_amount: CumulativeComparison,
    pub breakdown: DepartmentBreakdown,
    pub department_trends: Vec<DepartmentTrend>,
    pub department_cumulative_count: Vec<DepartmentCumulative>,
    pub department_cumulative_amount: Vec<DepartmentCumulative>,
    pub count_heatmap: WeekdayHeatmap,
    pub amount_heatmap: WeekdayHeatmap,
}

pub fn build_dashboard(dataset: &Dataset, query: &DashboardQuery) -> Dashboard {
    let DashboardQuery { period, unit, metric } = *query;
    let selected = dataset.select(&period, unit);

    let rollups = Granularity::ALL
        .iter()
        .map(|&granularity| RollupSet {
            granularity,
            count: rollup::rollup(&selected, &period, granularity, Metric::Count, Fill::Zero),
            amount: rollup::rollup(&selected, &period, granularity, metric, Fill::Zero),
        })
        .collect();

    let department_trends = Granularity::ALL
        .iter()
        .map(|&granularity| DepartmentTrend {
            granularity,
            count: rollup::rollup_by_department(dataset, &period, granularity, Metric::Count),
            amount: rollup::rollup_by_department(dataset, &period, granularity, metric),
        })
        .collect();

    tracing::info!(
        %period,
        unit = unit.label(),
        metric = metric.label(),
        records = selected.len(),
        "building dashboard"
    );

    Dashboard {
        query: *query,
        kpi: summary::kpi(dataset, &period, unit, metric),
        goals: goals::monthly_goals(dataset, period.end),
        comparisons: summary::period_comparisons(dataset, period.end, unit, metric),
        rollups,
        cumulative_count: cumulative::compare_with_previous(dataset, &period, unit, Metric::Count),
        cumulative_amount: cumulative::compare_with_previous(dataset, &period, unit, metric),
        breakdown: summary::department_breakdown(dataset, &period, unit, metric),
        department_trends,
        department_cumulative_count: cumulative::cumulative_by_department(
            dataset,
            &period,
            Metric::Count,
        ),
        department_cumulative_amount: cumulative::cumulative_by_department(dataset, &period, metric),
        count_heatmap: heatmap::weekday_heatmap(dataset, &period, Metric::Count),
        amount_heatmap: heatmap::weekday_heatmap(dataset, &period, metric),
    }
}

pub fn kpi_rows(dash: &Dashboard) -> Vec<KpiRow> {
    let Some(k) = &dash.kpi else {
        return Vec::new();
    };
    let m = k.metric.label();
    vec![
        KpiRow { indicator: "총 건수".to_string(), value: format_number(k.total_count, 0) },
        KpiRow {
            indicator: "일평균 건수".to_string(),
            value: format_number(k.avg_daily_count, 2),
        },
        KpiRow {
            indicator: format!("총 {}", m),
            value: format!("{}원", format_number(k.total_amount, 0)),
        },
        KpiRow {
            indicator: format!("일평균 {}", m),
            value: format!("{}원", format_number(k.avg_daily_amount, 0)),
        },
        KpiRow { indicator: "실적 일수".to_string(), value: k.active_days.to_string() },
    ]
}

fn comparison_row(scope: &str, c: &Comparison) -> ComparisonRow {
    ComparisonRow {
        scope: scope.to_string(),
        current_period: c.current_period.label(),
        previous_period: c.previous_period.label(),
        count: format_number(c.current.count, 0),
        previous_count: format_number(c.previous.count, 0),
        count_diff: format_diff(c.count_diff()),
        amount: format_number(c.current.amount, 0),
        previous_amount: format_number(c.previous.amount, 0),
        amount_diff: format_diff(c.amount_diff()),
    }
}

pub fn comparison_rows(dash: &Dashboard) -> Vec<ComparisonRow> {
    let c = &dash.comparisons;
    vec![
        comparison_row("day", &c.day),
        comparison_row("week", &c.week),
        comparison_row("month", &c.month),
    ]
}

pub fn rollup_rows(dash: &Dashboard) -> Vec<RollupRow> {
    dash.rollups
        .iter()
        .flat_map(|set| {
            set.count.iter().zip(set.amount.iter()).map(move |(c, a)| RollupRow {
                granularity: set.granularity.name().to_string(),
                bucket: c.label.clone(),
                count: format_number(c.value, 0),
                amount: format_number(a.value, 0),
            })
        })
        .collect()
}

fn optional_number(v: Option<f64>) -> String {
    v.map(|v| format_number(v, 0)).unwrap_or_default()
}

pub fn cumulative_rows(dash: &Dashboard) -> Vec<CumulativeRow> {
    let count = &dash.cumulative_count;
    let amount = &dash.cumulative_amount;
    count
        .dates
        .iter()
        .enumerate()
        .map(|(i, date)| CumulativeRow {
            offset: i,
            date: date.format("%m-%d").to_string(),
            count: format_number(count.current[i], 0),
            previous_count: optional_number(count.previous.get(i).copied().flatten()),
            amount: format_number(amount.current.get(i).copied().unwrap_or(0.0), 0),
            previous_amount: optional_number(amount.previous.get(i).copied().flatten()),
        })
        .collect()
}

fn goal_row(status: &GoalStatus) -> GoalRow {
    GoalRow {
        unit: status.unit.label().to_string(),
        goal: format_number(status.goal, 0),
        accumulated: format_number(status.accumulated, 0),
        ratio: format!("{:.1}%", status.ratio),
        remaining: format_number(status.remaining, 0),
    }
}

/// Focus unit first, then the overall entry (unless it is the focus), then
/// every department.
pub fn goal_rows(dash: &Dashboard) -> Vec<GoalRow> {
    let focus = dash.goals.focus(dash.query.unit);
    let mut rows = vec![goal_row(focus)];
    if focus.unit != Unit::All {
        rows.push(goal_row(&dash.goals.overall));
    }
    rows.extend(
        dash.goals
            .departments
            .iter()
            .filter(|s| s.unit != focus.unit)
            .map(goal_row),
    );
    rows
}

/// Console message under the goal donut.
pub fn goal_message(status: &GoalStatus) -> String {
    if status.remaining > 0.0 {
        format!("목표 달성까지 {}원 남았습니다!", format_number(status.remaining, 0))
    } else {
        format!("{}원 초과 달성!", format_number(status.remaining.abs(), 0))
    }
}

pub fn department_rows(dash: &Dashboard) -> Vec<DepartmentRow> {
    dash.breakdown
        .departments
        .iter()
        .map(|d| DepartmentRow {
            department: d.department.label().to_string(),
            count: format_number(d.totals.count, 0),
            count_share: format_number(d.count_share, 1),
            amount: format_number(d.totals.amount, 0),
            amount_share: format_number(d.amount_share, 1),
            contracts_per_head: format_number(d.productivity.contracts_per_head, 2),
            amount_per_contract: format_number(d.productivity.amount_per_contract, 0),
            amount_per_head: format_number(d.productivity.amount_per_head, 0),
        })
        .collect()
}

/// Long-format rows for the department comparison lines and the
/// department cumulative lines.
pub fn department_trend_rows(dash: &Dashboard) -> Vec<DepartmentTrendRow> {
    let mut rows = Vec::new();
    for trend in &dash.department_trends {
        for (c, a) in trend.count.iter().zip(trend.amount.iter()) {
            for (cb, ab) in c.buckets.iter().zip(a.buckets.iter()) {
                rows.push(DepartmentTrendRow {
                    series: trend.granularity.name().to_string(),
                    bucket: cb.label.clone(),
                    department: c.department.label().to_string(),
                    count: format_number(cb.value, 1),
                    amount: format_number(ab.value, 0),
                });
            }
        }
    }
    let dates: Vec<_> = dash.query.period.days().collect();
    for (c, a) in dash
        .department_cumulative_count
        .iter()
        .zip(dash.department_cumulative_amount.iter())
    {
        for ((date, cv), av) in dates.iter().zip(c.values.iter()).zip(a.values.iter()) {
            rows.push(DepartmentTrendRow {
                series: "cumulative".to_string(),
                bucket: date.format("%m-%d").to_string(),
                department: c.department.label().to_string(),
                count: format_number(*cv, 0),
                amount: format_number(*av, 0),
            });
        }
    }
    rows
}

fn heatmap_lines(map: &WeekdayHeatmap) -> impl Iterator<Item = HeatmapRow> + '_ {
    map.lines.iter().map(move |line| {
        let v = line.normalized.map(|x| format!("{:.2}", x));
        HeatmapRow {
            metric: map.metric.label().to_string(),
            department: line.department.label().to_string(),
            mon: v[0].clone(),
            tue: v[1].clone(),
            wed: v[2].clone(),
            thu: v[3].clone(),
            fri: v[4].clone(),
        }
    })
}

pub fn heatmap_rows(dash: &Dashboard) -> Vec<HeatmapRow> {
    heatmap_lines(&dash.count_heatmap)
        .chain(heatmap_lines(&dash.amount_heatmap))
        .collect()
}

/// Compact numbers for `summary.json`.
#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
    pub unit: Unit,
    pub value_type: Metric,
    pub total_count: f64,
    pub total_amount: f64,
    pub active_days: usize,
    pub goal: f64,
    pub goal_accumulated: f64,
    pub goal_ratio: f64,
    pub goal_remaining: f64,
}

pub fn generate_summary(dash: &Dashboard) -> SummaryStats {
    let focus = dash.goals.focus(dash.query.unit);
    let (total_count, total_amount, active_days) = dash
        .kpi
        .as_ref()
        .map(|k| (k.total_count, k.total_amount, k.active_days))
        .unwrap_or((0.0, 0.0, 0));
    SummaryStats {
        start: dash.query.period.start,
        end: dash.query.period.end,
        unit: dash.query.unit,
        value_type: dash.query.metric,
        total_count,
        total_amount,
        active_days,
        goal: focus.goal,
        goal_accumulated: focus.accumulated,
        goal_ratio: focus.ratio,
        goal_remaining: focus.remaining,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Department, Record};
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn rec(date: NaiveDate, department: Department, count: f64, goal: f64) -> Record {
        Record {
            date,
            department,
            count,
            premium: count * 50_000.0,
            converted: count * 10_000.0,
            headcount: 2.0,
            monthly_goal: Some(goal),
        }
    }

    fn sample() -> Dataset {
        Dataset::new(vec![
            rec(d(2024, 5, 1), Department::Alpha, 2.0, 100_000.0),
            rec(d(2024, 5, 2), Department::Alpha, 4.0, 100_000.0),
            rec(d(2024, 5, 2), Department::Dream1, 3.0, 80_000.0),
            rec(d(2024, 5, 3), Department::Dream2, 1.0, 80_000.0),
            rec(d(2024, 4, 30), Department::Alpha, 5.0, 90_000.0),
        ])
    }

    #[test]
    fn dashboard_sections_line_up_with_period() {
        let ds = sample();
        let query = DashboardQuery {
            period: Period::new(d(2024, 5, 1), d(2024, 5, 3)).unwrap(),
            unit: Unit::All,
            metric: Metric::Converted,
        };
        let dash = build_dashboard(&ds, &query);

        let kpi = dash.kpi.as_ref().unwrap();
        assert_eq!(kpi.total_count, 10.0);
        assert_eq!(dash.rollups.len(), 3);
        assert_eq!(dash.rollups[0].count.len(), 3);
        assert_eq!(dash.cumulative_count.current, vec![2.0, 9.0, 10.0]);
        assert_eq!(dash.cumulative_count.previous.len(), 3);
        assert_eq!(dash.goals.overall.goal, 180_000.0);
        assert_eq!(dash.goals.overall.accumulated, 100_000.0);
        assert_eq!(cumulative_rows(&dash).len(), 3);
        assert_eq!(comparison_rows(&dash).len(), 3);
        assert_eq!(kpi_rows(&dash).len(), 5);
    }

    #[test]
    fn goal_rows_put_focus_first() {
        let ds = sample();
        let query = DashboardQuery {
            period: Period::new(d(2024, 5, 1), d(2024, 5, 3)).unwrap(),
            unit: Unit::Dept(Department::Dream2),
            metric: Metric::Premium,
        };
        let dash = build_dashboard(&ds, &query);
        let rows = goal_rows(&dash);
        assert_eq!(rows[0].unit, "드림2실");
        assert_eq!(rows[0].ratio, "50.0%");
        assert_eq!(rows[1].unit, "전체");
        assert_eq!(rows.len(), 7);

        let summary = generate_summary(&dash);
        assert_eq!(summary.goal_ratio, 50.0);
        assert_eq!(summary.total_count, 1.0);
    }

    #[test]
    fn goal_message_reports_shortfall_or_excess() {
        let ds = sample();
        let report = goals::monthly_goals(&ds, d(2024, 5, 3));
        assert_eq!(
            goal_message(&report.overall),
            "목표 달성까지 80,000원 남았습니다!"
        );
        let alpha = report.focus(Unit::Dept(Department::Alpha));
        assert_eq!(goal_message(alpha), "목표 달성까지 40,000원 남았습니다!");

        let over = GoalStatus {
            unit: Unit::All,
            goal: 100_000.0,
            accumulated: 125_000.0,
            ratio: 125.0,
            remaining: -25_000.0,
        };
        assert_eq!(goal_message(&over), "25,000원 초과 달성!");
    }

    #[test]
    fn empty_selection_still_builds_every_section() {
        let ds = sample();
        let query = DashboardQuery {
            period: Period::new(d(2024, 6, 1), d(2024, 6, 7)).unwrap(),
            unit: Unit::Dept(Department::Legend),
            metric: Metric::Converted,
        };
        let dash = build_dashboard(&ds, &query);
        assert!(dash.kpi.is_none());
        assert!(kpi_rows(&dash).is_empty());
        assert_eq!(dash.cumulative_amount.current, vec![0.0; 7]);
        assert!(rollup_rows(&dash).iter().all(|r| r.count == "0"));
    }
}

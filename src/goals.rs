//! Monthly goal attainment.
//!
//! Goals are stated in converted value (`목표환산`), so attainment always
//! accumulates [`Metric::Converted`]. Dream1 and Dream2 share a single goal:
//! each is measured on their joint total, and the overall goal counts that
//! shared goal once.

use chrono::NaiveDate;
use serde::Serialize;

use crate::dataset::Dataset;
use crate::period::Period;
use crate::types::{Department, Metric, Record, Unit};
use crate::util::{round_to, safe_ratio};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Attainment {
    /// Percent of goal reached, one decimal.
    pub ratio: f64,
    /// Negative when the goal is exceeded.
    pub remaining: f64,
}

pub fn attainment(accumulated: f64, goal: f64) -> Attainment {
    Attainment {
        ratio: round_to(safe_ratio(accumulated, goal) * 100.0, 1),
        remaining: goal - accumulated,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalStatus {
    pub unit: Unit,
    pub goal: f64,
    pub accumulated: f64,
    pub ratio: f64,
    pub remaining: f64,
}

impl GoalStatus {
    fn new(unit: Unit, goal: f64, accumulated: f64) -> GoalStatus {
        let a = attainment(accumulated, goal);
        GoalStatus {
            unit,
            goal,
            accumulated,
            ratio: a.ratio,
            remaining: a.remaining,
        }
    }

    /// Achieved / not-achieved split of a 100% donut.
    pub fn donut(&self) -> (f64, f64) {
        let achieved = self.ratio.min(100.0);
        (achieved, (100.0 - achieved).max(0.0))
    }

    pub fn exceeded(&self) -> bool {
        self.remaining <= 0.0 && self.goal > 0.0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalReport {
    pub window: Period,
    pub departments: Vec<GoalStatus>,
    pub overall: GoalStatus,
}

impl GoalReport {
    /// Status for `unit`; `All` (or a department missing from the report)
    /// yields the overall entry.
    pub fn focus(&self, unit: Unit) -> &GoalStatus {
        match unit {
            Unit::All => &self.overall,
            Unit::Dept(_) => self
                .departments
                .iter()
                .find(|s| s.unit == unit)
                .unwrap_or(&self.overall),
        }
    }
}

/// First goal value recorded for `department` in `records`, skipping blanks.
pub fn first_goal(records: &[&Record], department: Department) -> Option<f64> {
    records
        .iter()
        .filter(|r| r.department == department)
        .find_map(|r| r.monthly_goal)
}

fn accumulated(records: &[&Record], departments: &[Department]) -> f64 {
    records
        .iter()
        .filter(|r| departments.contains(&r.department))
        .map(|r| Metric::Converted.value(r))
        .sum()
}

/// Attainment for every department and overall, month-to-date at `base`.
pub fn monthly_goals(dataset: &Dataset, base: NaiveDate) -> GoalReport {
    let window = Period::month_to_date(base);
    let records = dataset.select(&window, Unit::All);

    let departments: Vec<GoalStatus> = Department::ALL
        .iter()
        .map(|&dept| match dept.merged_partner() {
            Some(partner) => {
                let goal = first_goal(&records, dept)
                    .or_else(|| first_goal(&records, partner))
                    .unwrap_or(0.0);
                let total = accumulated(&records, &[dept, partner]);
                GoalStatus::new(Unit::Dept(dept), goal, total)
            }
            None => {
                let goal = first_goal(&records, dept).unwrap_or(0.0);
                GoalStatus::new(Unit::Dept(dept), goal, accumulated(&records, &[dept]))
            }
        })
        .collect();

    // The shared Dream goal appears under both departments; count it once.
    let goal_sum: f64 = Department::ALL
        .iter()
        .filter_map(|&dept| first_goal(&records, dept))
        .sum();
    let duplicate = first_goal(&records, Department::Dream2).unwrap_or(0.0);
    let overall_total: f64 = records.iter().map(|r| Metric::Converted.value(r)).sum();
    let overall = GoalStatus::new(Unit::All, goal_sum - duplicate, overall_total);

    tracing::debug!(
        %window,
        goal = overall.goal,
        accumulated = overall.accumulated,
        "computed monthly goal attainment"
    );

    GoalReport {
        window,
        departments,
        overall,
    }
}

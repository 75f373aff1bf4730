use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use tabled::Tabled;

use crate::error::ReportError;

/// One row of a source sheet, before validation.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "날짜")]
    pub date: Option<String>,
    #[serde(rename = "부서")]
    pub department: Option<String>,
    #[serde(rename = "건수")]
    pub count: Option<String>,
    #[serde(rename = "보험료")]
    pub premium: Option<String>,
    #[serde(rename = "환산")]
    pub converted: Option<String>,
    #[serde(rename = "가동인원")]
    pub headcount: Option<String>,
    #[serde(rename = "목표환산")]
    pub monthly_goal: Option<String>,
}

/// The fixed set of sales departments, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Department {
    Alpha,
    Dream1,
    Dream2,
    Gold1,
    Gold2,
    Legend,
}

static DEPARTMENT_LOOKUP: Lazy<HashMap<String, Department>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for dept in Department::ALL {
        map.insert(dept.label().to_string(), dept);
        map.insert(dept.code().to_string(), dept);
    }
    map
});

impl Department {
    pub const ALL: [Department; 6] = [
        Department::Alpha,
        Department::Dream1,
        Department::Dream2,
        Department::Gold1,
        Department::Gold2,
        Department::Legend,
    ];

    /// Name as it appears in the source sheets.
    pub fn label(self) -> &'static str {
        match self {
            Department::Alpha => "알파실",
            Department::Dream1 => "드림1실",
            Department::Dream2 => "드림2실",
            Department::Gold1 => "골드1실",
            Department::Gold2 => "골드2실",
            Department::Legend => "레전드실",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Department::Alpha => "alpha",
            Department::Dream1 => "dream1",
            Department::Dream2 => "dream2",
            Department::Gold1 => "gold1",
            Department::Gold2 => "gold2",
            Department::Legend => "legend",
        }
    }

    /// The other half of a department pair that shares one monthly goal.
    pub fn merged_partner(self) -> Option<Department> {
        match self {
            Department::Dream1 => Some(Department::Dream2),
            Department::Dream2 => Some(Department::Dream1),
            _ => None,
        }
    }

    /// Accepts a sheet label or an ASCII code, case-insensitively for codes.
    pub fn parse(name: &str) -> Option<Department> {
        let name = name.trim();
        DEPARTMENT_LOOKUP
            .get(name)
            .or_else(|| DEPARTMENT_LOOKUP.get(&name.to_ascii_lowercase()))
            .copied()
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for Department {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Reporting scope: every department, or a single one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Unit {
    #[default]
    All,
    Dept(Department),
}

pub const ALL_UNITS_LABEL: &str = "전체";

impl Unit {
    /// Resolve a user-supplied unit name. Anything that is not a known
    /// department falls back to `All`.
    pub fn parse(name: &str) -> Unit {
        let trimmed = name.trim();
        if trimmed.is_empty() || trimmed == ALL_UNITS_LABEL || trimmed.eq_ignore_ascii_case("all") {
            return Unit::All;
        }
        match Department::parse(trimmed) {
            Some(dept) => Unit::Dept(dept),
            None => {
                tracing::warn!(unit = trimmed, "unknown department, reporting on all departments");
                Unit::All
            }
        }
    }

    pub fn matches(self, dept: Department) -> bool {
        match self {
            Unit::All => true,
            Unit::Dept(d) => d == dept,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Unit::All => ALL_UNITS_LABEL,
            Unit::Dept(d) => d.label(),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for Unit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Which numeric column an aggregation reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Count,
    Premium,
    Converted,
    Headcount,
}

impl Metric {
    pub fn value(self, r: &Record) -> f64 {
        match self {
            Metric::Count => r.count,
            Metric::Premium => r.premium,
            Metric::Converted => r.converted,
            Metric::Headcount => r.headcount,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Count => "건수",
            Metric::Premium => "보험료",
            Metric::Converted => "환산",
            Metric::Headcount => "가동인원",
        }
    }

    /// Resolve the amount basis a user picked. Only the two currency
    /// metrics are valid here.
    pub fn from_value_type(name: &str) -> Result<Metric, ReportError> {
        match name.trim() {
            "환산" => Ok(Metric::Converted),
            "보험료" => Ok(Metric::Premium),
            other if other.eq_ignore_ascii_case("converted") => Ok(Metric::Converted),
            other if other.eq_ignore_ascii_case("premium") => Ok(Metric::Premium),
            other => Err(ReportError::UnknownValueType(other.to_string())),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// A validated daily record for one department.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub date: NaiveDate,
    pub department: Department,
    pub count: f64,
    pub premium: f64,
    pub converted: f64,
    pub headcount: f64,
    /// Blank goal cells stay `None` so "first goal seen" skips them.
    pub monthly_goal: Option<f64>,
}

// ---- report rows (console preview + CSV export) ----

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct KpiRow {
    #[serde(rename = "Indicator")]
    #[tabled(rename = "Indicator")]
    pub indicator: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ComparisonRow {
    #[serde(rename = "Scope")]
    #[tabled(rename = "Scope")]
    pub scope: String,
    #[serde(rename = "Current")]
    #[tabled(rename = "Current")]
    pub current_period: String,
    #[serde(rename = "Previous")]
    #[tabled(rename = "Previous")]
    pub previous_period: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: String,
    #[serde(rename = "PrevCount")]
    #[tabled(rename = "PrevCount")]
    pub previous_count: String,
    #[serde(rename = "CountDiff")]
    #[tabled(rename = "CountDiff")]
    pub count_diff: String,
    #[serde(rename = "Amount")]
    #[tabled(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "PrevAmount")]
    #[tabled(rename = "PrevAmount")]
    pub previous_amount: String,
    #[serde(rename = "AmountDiff")]
    #[tabled(rename = "AmountDiff")]
    pub amount_diff: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RollupRow {
    #[serde(rename = "Granularity")]
    #[tabled(rename = "Granularity")]
    pub granularity: String,
    #[serde(rename = "Bucket")]
    #[tabled(rename = "Bucket")]
    pub bucket: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: String,
    #[serde(rename = "Amount")]
    #[tabled(rename = "Amount")]
    pub amount: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CumulativeRow {
    #[serde(rename = "Day")]
    #[tabled(rename = "Day")]
    pub offset: usize,
    #[serde(rename = "Date")]
    #[tabled(rename = "Date")]
    pub date: String,
    #[serde(rename = "CumCount")]
    #[tabled(rename = "CumCount")]
    pub count: String,
    #[serde(rename = "PrevCumCount")]
    #[tabled(rename = "PrevCumCount")]
    pub previous_count: String,
    #[serde(rename = "CumAmount")]
    #[tabled(rename = "CumAmount")]
    pub amount: String,
    #[serde(rename = "PrevCumAmount")]
    #[tabled(rename = "PrevCumAmount")]
    pub previous_amount: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct GoalRow {
    #[serde(rename = "Unit")]
    #[tabled(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "Goal")]
    #[tabled(rename = "Goal")]
    pub goal: String,
    #[serde(rename = "Accumulated")]
    #[tabled(rename = "Accumulated")]
    pub accumulated: String,
    #[serde(rename = "Attainment")]
    #[tabled(rename = "Attainment")]
    pub ratio: String,
    #[serde(rename = "Remaining")]
    #[tabled(rename = "Remaining")]
    pub remaining: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DepartmentRow {
    #[serde(rename = "Department")]
    #[tabled(rename = "Department")]
    pub department: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: String,
    #[serde(rename = "CountShare")]
    #[tabled(rename = "CountShare")]
    pub count_share: String,
    #[serde(rename = "Amount")]
    #[tabled(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "AmountShare")]
    #[tabled(rename = "AmountShare")]
    pub amount_share: String,
    #[serde(rename = "ContractsPerHead")]
    #[tabled(rename = "ContractsPerHead")]
    pub contracts_per_head: String,
    #[serde(rename = "AmountPerContract")]
    #[tabled(rename = "AmountPerContract")]
    pub amount_per_contract: String,
    #[serde(rename = "AmountPerHead")]
    #[tabled(rename = "AmountPerHead")]
    pub amount_per_head: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DepartmentTrendRow {
    #[serde(rename = "Series")]
    #[tabled(rename = "Series")]
    pub series: String,
    #[serde(rename = "Bucket")]
    #[tabled(rename = "Bucket")]
    pub bucket: String,
    #[serde(rename = "Department")]
    #[tabled(rename = "Department")]
    pub department: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: String,
    #[serde(rename = "Amount")]
    #[tabled(rename = "Amount")]
    pub amount: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct HeatmapRow {
    #[serde(rename = "Metric")]
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Department")]
    #[tabled(rename = "Department")]
    pub department: String,
    #[serde(rename = "Mon")]
    #[tabled(rename = "Mon")]
    pub mon: String,
    #[serde(rename = "Tue")]
    #[tabled(rename = "Tue")]
    pub tue: String,
    #[serde(rename = "Wed")]
    #[tabled(rename = "Wed")]
    pub wed: String,
    #[serde(rename = "Thu")]
    #[tabled(rename = "Thu")]
    pub thu: String,
    #[serde(rename = "Fri")]
    #[tabled(rename = "Fri")]
    pub fri: String,
}

/// Detail-table row, written with the source sheet's headers so an export
/// can be re-loaded as a source.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DetailRow {
    #[serde(rename = "날짜")]
    #[tabled(rename = "날짜")]
    pub date: String,
    #[serde(rename = "부서")]
    #[tabled(rename = "부서")]
    pub department: String,
    #[serde(rename = "건수")]
    #[tabled(rename = "건수")]
    pub count: String,
    #[serde(rename = "보험료")]
    #[tabled(rename = "보험료")]
    pub premium: String,
    #[serde(rename = "환산")]
    #[tabled(rename = "환산")]
    pub converted: String,
    #[serde(rename = "가동인원")]
    #[tabled(rename = "가동인원")]
    pub headcount: String,
    #[serde(rename = "목표환산")]
    #[tabled(rename = "목표환산")]
    pub monthly_goal: String,
}

// Command-line front end.
//
// - `report` loads the sheets, computes every dashboard section, prints a
//   markdown preview of each and writes one CSV per section plus JSON.
// - `table` exports the filtered detail table.
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use sales_report::loader::{self, LoadReport};
use sales_report::reports::{self, DashboardQuery};
use sales_report::types::ALL_UNITS_LABEL;
use sales_report::util::{format_int, format_number};
use sales_report::{logging, output, table, Dataset, Department, Metric, Period, ReportError, Unit};

#[derive(Parser)]
#[command(name = "sales-report")]
#[command(about = "Daily sales performance reports by department", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute every dashboard section for a period
    Report {
        /// Source sheet (CSV); repeat for each department sheet
        #[arg(long = "source", required = true)]
        sources: Vec<PathBuf>,
        /// First day, YYYY-MM-DD (default: first of the latest month)
        #[arg(long)]
        start: Option<String>,
        /// Last day, YYYY-MM-DD (default: latest date in the data)
        #[arg(long)]
        end: Option<String>,
        /// Department name or code; unknown names mean all departments
        #[arg(long, default_value = ALL_UNITS_LABEL)]
        unit: String,
        /// Amount basis: converted (환산) or premium (보험료)
        #[arg(long, default_value = "converted")]
        value_type: String,
        #[arg(long, default_value = "reports")]
        out_dir: PathBuf,
        /// Rows shown per preview table
        #[arg(long, default_value_t = 5)]
        preview: usize,
    },
    /// Export the detail table for some departments and dates
    Table {
        #[arg(long = "source", required = true)]
        sources: Vec<PathBuf>,
        /// Department to include; repeat for several (default: all present)
        #[arg(long = "dept")]
        departments: Vec<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long, default_value = "detail_table.csv")]
        out: PathBuf,
    },
}

fn parse_day(s: &str) -> Result<NaiveDate, ReportError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ReportError::InvalidDate(s.to_string()))
}

/// Resolve optional CLI dates against a fallback period.
fn resolve_period(
    start: Option<&str>,
    end: Option<&str>,
    fallback: Period,
) -> Result<Period, ReportError> {
    let start = start.map(parse_day).transpose()?.unwrap_or(fallback.start);
    let end = end.map(parse_day).transpose()?.unwrap_or(fallback.end);
    Period::new(start, end)
}

fn load(sources: &[PathBuf]) -> anyhow::Result<Dataset> {
    let (data, load_report): (Dataset, LoadReport) =
        loader::load_sources(sources).context("failed to load source sheets")?;
    println!(
        "Processing dataset... ({} rows read from {} source(s), {} loaded)",
        format_int(load_report.total_rows as u64),
        load_report.sources,
        format_int(load_report.loaded_rows as u64)
    );
    if load_report.parse_errors + load_report.unknown_departments > 0 {
        println!(
            "Note: {} rows skipped due to unreadable dates, {} due to unknown departments.",
            format_int(load_report.parse_errors as u64),
            format_int(load_report.unknown_departments as u64)
        );
    }
    println!();
    Ok(data)
}

fn emit<T>(out_dir: &Path, file: &str, title: &str, rows: &[T], preview: usize) -> anyhow::Result<()>
where
    T: Serialize + Tabled + Clone,
{
    let path = out_dir.join(file);
    output::write_csv(&path, rows).with_context(|| format!("failed to write {}", path.display()))?;
    println!("{}\n", title);
    output::preview_table_rows(rows, preview);
    println!("(Full table exported to {})\n", path.display());
    Ok(())
}

fn run_report(
    sources: &[PathBuf],
    start: Option<&str>,
    end: Option<&str>,
    unit: &str,
    value_type: &str,
    out_dir: &Path,
    preview: usize,
) -> anyhow::Result<()> {
    let metric = Metric::from_value_type(value_type)?;
    let unit = Unit::parse(unit);
    let data = load(sources)?;
    let fallback = data
        .default_period()
        .context("dataset has no dated records")?;
    let period = resolve_period(start, end, fallback)?;

    let query = DashboardQuery { period, unit, metric };
    let dash = reports::build_dashboard(&data, &query);
    let range = period.label();

    println!("Generating reports ({}, {}, {})...\n", unit, range, metric);

    emit(out_dir, "kpi.csv", &format!("KPI ({}, {})", unit, range), &reports::kpi_rows(&dash), preview)?;
    if dash.kpi.is_none() {
        println!("해당 기간에 데이터가 없습니다.\n");
    }

    let focus = dash.goals.focus(unit);
    println!(
        "Goal attainment {} ({}): {:.1}%  {}원 / {}원",
        dash.goals.window.end.format("%Y-%m"),
        focus.unit,
        focus.ratio,
        format_number(focus.accumulated, 0),
        format_number(focus.goal, 0)
    );
    println!("{}\n", reports::goal_message(focus));
    emit(out_dir, "goals.csv", "Goal attainment by department", &reports::goal_rows(&dash), 8)?;

    emit(
        out_dir,
        "comparisons.csv",
        &format!("Day / week / month vs previous ({}, base {})", unit, period.end),
        &reports::comparison_rows(&dash),
        3,
    )?;
    emit(out_dir, "rollups.csv", &format!("Rollups ({}, {})", unit, range), &reports::rollup_rows(&dash), preview)?;
    emit(
        out_dir,
        "cumulative.csv",
        &format!("Cumulative vs previous period ({}, {})", unit, range),
        &reports::cumulative_rows(&dash),
        preview,
    )?;
    emit(
        out_dir,
        "departments.csv",
        &format!("Department totals and productivity ({})", range),
        &reports::department_rows(&dash),
        Department::ALL.len(),
    )?;
    emit(
        out_dir,
        "department_trends.csv",
        &format!("Department trends ({})", range),
        &reports::department_trend_rows(&dash),
        preview,
    )?;
    emit(
        out_dir,
        "heatmap.csv",
        &format!("Normalized weekday heatmap ({})", range),
        &reports::heatmap_rows(&dash),
        2 * Department::ALL.len(),
    )?;

    let summary = reports::generate_summary(&dash);
    output::write_json(&out_dir.join("summary.json"), &summary)?;
    output::write_json(&out_dir.join("dashboard.json"), &dash)?;
    println!("Summary Stats (summary.json):");
    println!(
        "{{\"total_count\": {}, \"total_amount\": {}, \"goal_ratio\": {}}}\n",
        format_number(summary.total_count, 0),
        format_number(summary.total_amount, 0),
        format_number(summary.goal_ratio, 1)
    );
    Ok(())
}

fn run_table(
    sources: &[PathBuf],
    departments: &[String],
    start: Option<&str>,
    end: Option<&str>,
    out: &Path,
) -> anyhow::Result<()> {
    let data = load(sources)?;
    let fallback = data.full_period().context("dataset has no dated records")?;
    let period = resolve_period(start, end, fallback)?;

    let selected: Vec<Department> = if departments.is_empty() {
        data.departments()
    } else {
        departments
            .iter()
            .filter_map(|name| {
                let dept = Department::parse(name);
                if dept.is_none() {
                    tracing::warn!(department = name.as_str(), "ignoring unknown department");
                }
                dept
            })
            .collect()
    };

    let Some(rows) = table::detail_records(&data, &selected, &period) else {
        println!("필터를 선택하세요.");
        return Ok(());
    };
    if rows.is_empty() {
        println!("조회 결과가 없습니다.");
        return Ok(());
    }
    let written = table::export_detail(out, &rows)?;
    let preview: Vec<_> = rows.iter().map(|r| table::to_detail_row(r)).collect();
    output::preview_table_rows(&preview, 10);
    println!(
        "({} rows for {} exported to {})",
        format_int(written as u64),
        period.label(),
        out.display()
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            sources,
            start,
            end,
            unit,
            value_type,
            out_dir,
            preview,
        } => run_report(
            &sources,
            start.as_deref(),
            end.as_deref(),
            &unit,
            &value_type,
            &out_dir,
            preview,
        ),
        Commands::Table {
            sources,
            departments,
            start,
            end,
            out,
        } => run_table(&sources, &departments, start.as_deref(), end.as_deref(), &out),
    }
}

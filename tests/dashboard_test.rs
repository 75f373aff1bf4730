// Integration tests: multi-sheet loading, dashboard assembly and detail export.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use sales_report::loader;
use sales_report::reports::{self, DashboardQuery};
use sales_report::rollup::Granularity;
use sales_report::{logging, table, Department, Metric, Period, ReportError, Unit};

const HEADER: &str = "날짜,부서,건수,보험료,환산,가동인원,목표환산\n";

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn write_sheet(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut body = String::from(HEADER);
    for row in rows {
        body.push_str(row);
        body.push('\n');
    }
    fs::write(&path, body).unwrap();
    path
}

fn sheets(dir: &Path) -> Vec<PathBuf> {
    vec![
        write_sheet(
            dir,
            "alpha.csv",
            &[
                "2024-02-26,알파실,4,400000,40000,5,500000",
                "2024-03-01,알파실,2,200000,20000,5,500000",
                "2024-03-04,알파실,3,300000,30000,5,500000",
                "2024-03-05,알파실,0,0,0,5,500000",
            ],
        ),
        write_sheet(
            dir,
            "dream.csv",
            &[
                "2024-03-01,드림1실,1,100000,60000,2,100000",
                "2024-03-04,드림2실,1,100000,50000,2,100000",
            ],
        ),
        write_sheet(
            dir,
            "legend.csv",
            &[
                "2024-03-02,레전드실,5,500000,50000,0,",
                "broken,레전드실,1,1,1,1,1",
            ],
        ),
    ]
}

#[test]
fn loads_and_merges_every_sheet() {
    logging::init_test();
    let dir = tempfile::tempdir().unwrap();
    let (data, report) = loader::load_sources(&sheets(dir.path())).unwrap();

    assert_eq!(report.sources, 3);
    assert_eq!(report.total_rows, 8);
    assert_eq!(report.loaded_rows, 7);
    assert_eq!(report.parse_errors, 1);
    assert_eq!(data.len(), 7);
    assert_eq!(data.date_bounds(), Some((d(2024, 2, 26), d(2024, 3, 5))));
    assert_eq!(
        data.default_period().unwrap(),
        Period::new(d(2024, 3, 1), d(2024, 3, 5)).unwrap()
    );
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = vec![dir.path().join("nope.csv")];
    assert!(matches!(loader::load_sources(&missing), Err(ReportError::Io(_))));
}

#[test]
fn sheet_with_only_bad_rows_is_empty_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sheet(dir.path(), "bad.csv", &["x,알파실,1,1,1,1,1"]);
    assert!(matches!(
        loader::load_sources(&[path]),
        Err(ReportError::EmptyDataset(1))
    ));
}

#[test]
fn dashboard_over_loaded_sheets() {
    let dir = tempfile::tempdir().unwrap();
    let (data, _) = loader::load_sources(&sheets(dir.path())).unwrap();
    let query = DashboardQuery {
        period: data.default_period().unwrap(),
        unit: Unit::parse("not-a-team"),
        metric: Metric::from_value_type("환산").unwrap(),
    };
    let dash = reports::build_dashboard(&data, &query);

    assert_eq!(dash.query.unit, Unit::All);
    let kpi = dash.kpi.as_ref().unwrap();
    assert_eq!(kpi.total_count, 12.0);
    assert_eq!(kpi.total_amount, 210_000.0);
    // 03-03 has no rows.
    assert_eq!(kpi.active_days, 4);
    assert_eq!(kpi.avg_daily_count, 3.0);

    // Goals: Alpha 500,000 + the shared Dream goal 100,000 once; Legend blank.
    assert_eq!(dash.goals.overall.goal, 600_000.0);
    assert_eq!(dash.goals.overall.ratio, 35.0);
    let dream1 = dash.goals.focus(Unit::Dept(Department::Dream1));
    assert_eq!(dream1.accumulated, 110_000.0);
    assert_eq!(dream1.ratio, 110.0);

    // Five-day period: previous window is 02-25..02-29.
    assert_eq!(dash.cumulative_count.previous_period.start, d(2024, 2, 25));
    assert_eq!(dash.cumulative_count.current, vec![3.0, 8.0, 8.0, 12.0, 12.0]);
    assert_eq!(
        dash.cumulative_count.previous,
        vec![Some(0.0), Some(4.0), Some(4.0), Some(4.0), Some(4.0)]
    );

    let weekly = dash
        .rollups
        .iter()
        .find(|r| r.granularity == Granularity::Week)
        .unwrap();
    let weeks: Vec<(NaiveDate, f64)> = weekly.count.iter().map(|b| (b.start, b.value)).collect();
    // 03-02 (Saturday) is excluded from weekly buckets.
    assert_eq!(weeks, vec![(d(2024, 2, 26), 3.0), (d(2024, 3, 4), 4.0)]);

    // Alpha's only zero-valued weekday (Tuesday) still reports a 0 mean.
    let alpha = dash
        .count_heatmap
        .lines
        .iter()
        .find(|l| l.department == Department::Alpha)
        .unwrap();
    assert_eq!(alpha.means, [3.0, 0.0, 0.0, 0.0, 2.0]);
    assert_eq!(alpha.normalized[1], 0.0);
    assert!(dash
        .count_heatmap
        .lines
        .iter()
        .all(|l| l.department != Department::Legend));

    let out = tempfile::tempdir().unwrap();
    sales_report::output::write_json(&out.path().join("dashboard.json"), &dash).unwrap();
    let json = fs::read_to_string(out.path().join("dashboard.json")).unwrap();
    assert!(json.contains("\"unit\": \"전체\""));
}

#[test]
fn detail_export_reloads_as_a_source() {
    let dir = tempfile::tempdir().unwrap();
    let (data, _) = loader::load_sources(&sheets(dir.path())).unwrap();
    let period = Period::new(d(2024, 3, 1), d(2024, 3, 4)).unwrap();
    let rows = table::detail_records(&data, &[Department::Dream2, Department::Alpha], &period)
        .unwrap();
    assert_eq!(rows.len(), 3);

    let out = dir.path().join("export").join("detail.csv");
    assert_eq!(table::export_detail(&out, &rows).unwrap(), 3);

    let text = fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("날짜,부서,건수,보험료,환산,가동인원,목표환산"));

    let (reloaded, report) = loader::load_sources(&[out]).unwrap();
    assert_eq!(report.loaded_rows, 3);
    let originals: Vec<_> = rows.into_iter().cloned().collect();
    assert_eq!(reloaded.records(), originals.as_slice());
}

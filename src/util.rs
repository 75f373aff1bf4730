// Utility helpers for parsing, date arithmetic and number formatting.
//
// This module centralizes all the "dirty" sheet/number/date handling so the
// aggregation code can assume clean, typed values.
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in sheet exports.
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(",", "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a calendar day. Sheets mix `-`, `/` and `.` separators and some
/// exports append a time component, which is dropped.
pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// `numerator / denominator`, or 0 when the denominator is zero.
///
/// Sparse periods (no headcount, no contracts, no goal) must never produce
/// NaN or infinity in a report.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let r = numerator / denominator;
    if r.is_finite() {
        r
    } else {
        0.0
    }
}

pub fn round_to(v: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (v * factor).round() / factor
}

pub fn average(v: &[f64]) -> f64 {
    // Standard arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

pub fn is_weekday(d: NaiveDate) -> bool {
    !matches!(d.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Monday of the ISO week containing `d`.
pub fn week_monday(d: NaiveDate) -> NaiveDate {
    d - Duration::days(d.weekday().num_days_from_monday() as i64)
}

pub fn month_start(d: NaiveDate) -> NaiveDate {
    d.with_day(1).unwrap_or(d)
}

/// First day of the month after `d`'s month.
pub fn next_month_start(d: NaiveDate) -> NaiveDate {
    let (y, m) = if d.month() == 12 {
        (d.year() + 1, 1)
    } else {
        (d.year(), d.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1).unwrap_or(d)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus locale-aware thousands separators (`1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
    }
    if neg && res.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// Signed difference with an arrow, as shown on comparison cards.
pub fn format_diff(diff: f64) -> String {
    if diff > 0.0 {
        format!("▲ {}", format_number(diff, 0))
    } else if diff < 0.0 {
        format!("▼ {}", format_number(diff.abs(), 0))
    } else {
        "-".to_string()
    }
}

/// Plain (unseparated) rendering for export cells: integers without a
/// trailing `.0`, everything else as-is.
pub fn format_plain(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{:.0}", v)
    } else {
        v.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_numbers_with_separators() {
        assert_eq!(parse_f64_safe(Some(" 1,234,500 ")), Some(1_234_500.0));
        assert_eq!(parse_f64_safe(Some("12.5")), Some(12.5));
        assert_eq!(parse_f64_safe(Some("n/a")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn parses_mixed_date_formats() {
        assert_eq!(parse_date_safe(Some("2024-03-05")), Some(d(2024, 3, 5)));
        assert_eq!(parse_date_safe(Some("2024/03/05")), Some(d(2024, 3, 5)));
        assert_eq!(parse_date_safe(Some("2024.03.05")), Some(d(2024, 3, 5)));
        assert_eq!(parse_date_safe(Some("2024-03-05 00:00:00")), Some(d(2024, 3, 5)));
        assert_eq!(parse_date_safe(Some("yesterday")), None);
    }

    #[test]
    fn ratio_is_zero_on_zero_denominator() {
        assert_eq!(safe_ratio(10.0, 0.0), 0.0);
        assert_eq!(safe_ratio(10.0, 4.0), 2.5);
    }

    #[test]
    fn week_and_month_anchors() {
        // 2024-01-03 is a Wednesday.
        assert_eq!(week_monday(d(2024, 1, 3)), d(2024, 1, 1));
        assert_eq!(week_monday(d(2024, 1, 7)), d(2024, 1, 1));
        assert_eq!(month_start(d(2024, 2, 29)), d(2024, 2, 1));
        assert_eq!(next_month_start(d(2024, 12, 15)), d(2025, 1, 1));
        assert!(is_weekday(d(2024, 1, 5)));
        assert!(!is_weekday(d(2024, 1, 6)));
    }

    #[test]
    fn formats_with_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-50.0, 0), "-50");
        assert_eq!(format_number(-0.0, 1), "0.0");
        assert_eq!(format_diff(1500.0), "▲ 1,500");
        assert_eq!(format_diff(-3.0), "▼ 3");
        assert_eq!(format_diff(0.0), "-");
        assert_eq!(format_plain(150000.0), "150000");
        assert_eq!(format_plain(2.5), "2.5");
    }
}

/// hydro-1.net Hourly Export Client
///
/// Downloads the hourly water-level spreadsheet for a station and date
/// range from the Upper Northern Region Irrigation Hydrology Center, and
/// reads the saved file back into rows keyed by the sheet's header row.
/// The download is cached as-is; see `cache::Cache::save_export`.

use std::collections::HashSet;
use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};
use chrono::{Days, NaiveDate};
use serde_json::{Number, Value};

use crate::model::{FloodMapError, Row, TIMESTAMP_FORMAT};

pub const HYDRO_EXPORT_URL: &str = "https://hydro-1.net/Data/HD-04/houly/water_today_excel.php";

/// Days of history requested by default.
pub const DEFAULT_HISTORY_DAYS: i64 = 7;

/// Build the export URL for a station and inclusive date range.
///
/// Example:
///   https://hydro-1.net/Data/HD-04/houly/water_today_excel.php?station01=P.1&datestart=2024-10-17&dateend=2024-10-24
pub fn build_export_url(base: &str, station_code: &str, start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "{}?station01={}&datestart={}&dateend={}",
        base,
        station_code,
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d")
    )
}

/// The `(start, end)` range covering the last `days` days up to `today`.
/// Ranges reaching past the earliest representable date start there.
pub fn history_range(today: NaiveDate, days: i64) -> (NaiveDate, NaiveDate) {
    let back = Days::new(days.max(0).unsigned_abs());
    (today.checked_sub_days(back).unwrap_or(NaiveDate::MIN), today)
}

/// Download the export file.
pub fn fetch_export(client: &reqwest::blocking::Client, url: &str) -> Result<Vec<u8>, FloodMapError> {
    let response = client
        .get(url)
        .header("User-Agent", "Mozilla/5.0")
        .header("Accept", "application/vnd.ms-excel")
        .send()?;

    if !response.status().is_success() {
        return Err(FloodMapError::HttpError(response.status().as_u16()));
    }

    Ok(response.bytes()?.to_vec())
}

// ============================================================================
// Reading the export
// ============================================================================

/// Read the first sheet of a saved export into rows.
///
/// The first non-empty row supplies the column names; each following row
/// becomes one `Row`. Empty cells are left out of the row and rows with no
/// cells at all are skipped.
pub fn read_export(path: &Path) -> Result<Vec<Row>, FloodMapError> {
    if !path.exists() {
        return Err(FloodMapError::CacheError(format!("File not found: {}", path.display())));
    }

    let mut workbook =
        open_workbook_auto(path).map_err(|e| FloodMapError::ParseError(format!("{}: {}", path.display(), e)))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| FloodMapError::ParseError(format!("{}: workbook has no sheets", path.display())))?
        .map_err(|e| FloodMapError::ParseError(format!("{}: {}", path.display(), e)))?;

    Ok(rows_from_range(&range))
}

/// Convert a sheet range into rows, using its first non-empty row as the
/// header.
///
/// Blank header cells are named `__EMPTY`, and repeated names get a `_1`,
/// `_2`, ... suffix so no column is lost.
pub fn rows_from_range(range: &Range<Data>) -> Vec<Row> {
    let mut lines = range
        .rows()
        .skip_while(|cells| cells.iter().all(|c| matches!(c, Data::Empty)));

    let headers = match lines.next() {
        Some(cells) => header_names(cells),
        None => return Vec::new(),
    };

    lines
        .map(|cells| {
            headers
                .iter()
                .zip(cells)
                .filter_map(|(name, cell)| cell_value(cell).map(|v| (name.clone(), v)))
                .collect::<Row>()
        })
        .filter(|row| !row.is_empty())
        .collect()
}

fn header_names(cells: &[Data]) -> Vec<String> {
    let mut seen = HashSet::new();
    cells
        .iter()
        .map(|cell| {
            let base = match cell {
                Data::Empty => "__EMPTY".to_string(),
                other => other.to_string().trim().to_string(),
            };
            let mut name = base.clone();
            let mut n = 0;
            while !seen.insert(name.clone()) {
                n += 1;
                name = format!("{}_{}", base, n);
            }
            name
        })
        .collect()
}

/// JSON value of one cell. Dates are rendered as `DD/MM/YYYY HH:mm`.
fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::Int(i) => Some(Value::from(*i)),
        Data::Float(f) => Some(Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null)),
        Data::Bool(b) => Some(Value::Bool(*b)),
        Data::String(s) => Some(Value::String(s.clone())),
        Data::DateTime(dt) => Some(match dt.as_datetime() {
            Some(t) => Value::String(t.format(TIMESTAMP_FORMAT).to_string()),
            None => Number::from_f64(dt.as_f64()).map(Value::Number).unwrap_or(Value::Null),
        }),
        other => Some(Value::String(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Build an in-memory sheet from rows of cells, top-left at A1.
    fn sheet(cells: Vec<Vec<Data>>) -> Range<Data> {
        let height = cells.len() as u32;
        let width = cells.iter().map(Vec::len).max().unwrap_or(0) as u32;
        let mut range = Range::new((0, 0), (height - 1, width - 1));
        for (r, line) in cells.into_iter().enumerate() {
            for (c, cell) in line.into_iter().enumerate() {
                range.set_value((r as u32, c as u32), cell);
            }
        }
        range
    }

    fn text(s: &str) -> Data {
        Data::String(s.to_string())
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_export_url_contains_station_and_dates() {
        let url = build_export_url(HYDRO_EXPORT_URL, "P.1", d(2024, 10, 17), d(2024, 10, 24));
        assert_eq!(
            url,
            "https://hydro-1.net/Data/HD-04/houly/water_today_excel.php\
             ?station01=P.1&datestart=2024-10-17&dateend=2024-10-24"
        );
    }

    #[test]
    fn test_history_range_defaults_to_one_week() {
        let (start, end) = history_range(d(2024, 3, 3), DEFAULT_HISTORY_DAYS);
        assert_eq!(start, d(2024, 2, 25), "range should cross the leap-year February end");
        assert_eq!(end, d(2024, 3, 3));
    }

    #[test]
    fn test_negative_history_is_a_single_day() {
        let (start, end) = history_range(d(2024, 10, 24), -3);
        assert_eq!(start, end);
    }

    #[test]
    fn test_oversized_history_stops_at_earliest_date() {
        let (start, _) = history_range(d(2024, 10, 24), i64::MAX);
        assert_eq!(start, NaiveDate::MIN);
    }

    // --- Reading the export -------------------------------------------------

    #[test]
    fn test_sheet_rows_are_keyed_by_header() {
        let range = sheet(vec![
            vec![text("เวลา"), text("ระดับน้ำ(ม.)"), text("ปริมาณน้ำ(ลบ.ม./วิ)")],
            vec![text("24/10/2024 06:00"), Data::Float(3.4), Data::Int(120)],
            vec![text("24/10/2024 07:00"), text("3.42"), Data::Empty],
        ]);

        let rows = rows_from_range(&range);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("ระดับน้ำ(ม.)"), Some(&json!(3.4)));
        assert_eq!(rows[0].get("ปริมาณน้ำ(ลบ.ม./วิ)"), Some(&json!(120)));
        assert_eq!(rows[1].get("ระดับน้ำ(ม.)"), Some(&json!("3.42")));
        assert!(
            !rows[1].contains_key("ปริมาณน้ำ(ลบ.ม./วิ)"),
            "empty cells should be left out of the row"
        );

        let keys: Vec<&str> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["เวลา", "ระดับน้ำ(ม.)", "ปริมาณน้ำ(ลบ.ม./วิ)"], "column order is kept");
    }

    #[test]
    fn test_sheet_rows_feed_the_hydro_column_mapping() {
        use crate::analysis::series::{ColumnMapping, extract_readings};

        let range = sheet(vec![
            vec![Data::Empty, Data::Empty],
            vec![text("เวลา"), text("ระดับน้ำ(ม.)")],
            vec![text("24/10/2024 06:00"), Data::Float(3.4)],
            vec![Data::Empty, Data::Empty],
            vec![text("24/10/2024 07:00"), text("-")],
        ]);

        let readings = extract_readings(&rows_from_range(&range), &ColumnMapping::hydro_export());
        assert_eq!(readings.len(), 2, "leading and blank rows should be skipped");
        assert_eq!(readings[0].timestamp, "24/10/2024 06:00");
        assert_eq!(readings[0].value, Some(3.4));
        assert_eq!(readings[1].value, None);
    }

    #[test]
    fn test_blank_and_repeated_headers_get_unique_names() {
        let range = sheet(vec![
            vec![text("เวลา"), Data::Empty, text("เวลา")],
            vec![text("a"), text("b"), text("c")],
        ]);
        let rows = rows_from_range(&range);
        assert_eq!(rows[0].get("เวลา"), Some(&json!("a")));
        assert_eq!(rows[0].get("__EMPTY"), Some(&json!("b")));
        assert_eq!(rows[0].get("เวลา_1"), Some(&json!("c")));
    }

    #[test]
    fn test_empty_sheet_has_no_rows() {
        let range = sheet(vec![vec![Data::Empty]]);
        assert!(rows_from_range(&range).is_empty());
    }

    #[test]
    fn test_read_export_reports_missing_and_unreadable_files() {
        let dir = tempfile::tempdir().expect("temp dir");

        let missing = dir.path().join("data.xls");
        match read_export(&missing) {
            Err(FloodMapError::CacheError(msg)) => assert!(msg.starts_with("File not found"), "got: {}", msg),
            other => panic!("expected CacheError, got {:?}", other),
        }

        let garbage = dir.path().join("garbage.xls");
        std::fs::write(&garbage, b"<html>not a workbook</html>").expect("write");
        assert!(matches!(read_export(&garbage), Err(FloodMapError::ParseError(_))));
    }
}

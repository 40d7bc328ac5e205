//! Series extraction from heterogeneous tabular rows.
//!
//! Upstream data arrives as rows of `column name → raw value`, where values
//! may be JSON strings or numbers and columns may carry unit suffixes
//! (`ระดับน้ำ(ม.)`). The caller states which columns to read through a
//! `ColumnMapping`; nothing here guesses at column names.
//!
//! Rows whose level cannot be parsed are dropped from the numeric series.
//! Gaps are not preserved: indices compress.

use serde_json::Value;

use crate::model::{HYDRO_LEVEL_COLUMN, HYDRO_TIME_COLUMN, RID_LEVEL_FIELD, RID_TIME_FIELD};
use crate::model::{Reading, Row};

// ---------------------------------------------------------------------------
// Column selection
// ---------------------------------------------------------------------------

/// How a column is located within a row.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSelector {
    /// The key must equal this name.
    Exact(String),
    /// The first key containing this substring, in source column order.
    /// Matching is case- and encoding-sensitive; no normalization.
    Contains(String),
}

impl ColumnSelector {
    /// Returns the raw value of the selected column, if the row has one.
    pub fn select<'a>(&self, row: &'a Row) -> Option<&'a Value> {
        match self {
            ColumnSelector::Exact(name) => row.get(name),
            ColumnSelector::Contains(needle) => row
                .iter()
                .find(|(key, _)| key.contains(needle.as_str()))
                .map(|(_, value)| value),
        }
    }
}

/// Which columns of a row hold the timestamp and the water level.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMapping {
    pub time: ColumnSelector,
    pub level: ColumnSelector,
}

impl ColumnMapping {
    /// Columns of the hydro-1 hourly spreadsheet export.
    pub fn hydro_export() -> Self {
        Self {
            time: ColumnSelector::Exact(HYDRO_TIME_COLUMN.to_string()),
            level: ColumnSelector::Contains(HYDRO_LEVEL_COLUMN.to_string()),
        }
    }

    /// Fields of the RID hourly water-level web service.
    pub fn rid_service() -> Self {
        Self {
            time: ColumnSelector::Exact(RID_TIME_FIELD.to_string()),
            level: ColumnSelector::Exact(RID_LEVEL_FIELD.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Value parsing
// ---------------------------------------------------------------------------

/// Best-effort numeric parse of a raw cell.
///
/// Numbers are taken as-is. Strings are trimmed and their leading number
/// is read, so `"2.5 m"` gives 2.5. Strings without a leading number,
/// NaN and infinities, nulls, booleans, arrays and objects yield `None`.
pub fn parse_level(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => leading_number(s.trim()),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Parses the longest prefix of `s` of the form `[+-]digits[.digits][e[+-]digits]`.
fn leading_number(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = if matches!(bytes.first(), Some(b'+' | b'-')) { 1 } else { 0 };
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - (end + 1);
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_start = end + 1;
        if matches!(bytes.get(exp_start), Some(b'+' | b'-')) {
            exp_start += 1;
        }
        let exp_end = digits_from(exp_start);
        if exp_end > exp_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// Renders a timestamp cell as text. Missing or null cells become `""`.
fn cell_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Extracts the numeric level series from `rows`, in row order, dropping
/// every row whose level column is missing or unparsable.
pub fn extract_series(rows: &[Row], level: &ColumnSelector) -> Vec<f64> {
    rows.iter()
        .filter_map(|row| level.select(row).and_then(parse_level))
        .collect()
}

/// Converts every row into a `Reading`, keeping unparsable levels as `None`
/// so that timestamps stay aligned with the source rows.
pub fn extract_readings(rows: &[Row], mapping: &ColumnMapping) -> Vec<Reading> {
    rows.iter()
        .map(|row| Reading {
            timestamp: cell_text(mapping.time.select(row)),
            value: mapping.level.select(row).and_then(parse_level),
        })
        .collect()
}

/// The numeric series of a set of readings, unparsable entries removed.
pub fn series_from_readings(readings: &[Reading]) -> Vec<f64> {
    readings.iter().filter_map(|r| r.value).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

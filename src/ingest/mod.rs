/// Upstream data clients.
///
/// Submodules:
/// - `rid`: RID hourly water-level web service (JSON rows per station).
/// - `hydro`: hydro-1.net hourly spreadsheet export (raw file download).

pub mod hydro;
pub mod rid;

use serde_json::Value;

use crate::model::{FloodMapError, Row};

/// Pulls the row objects out of a decoded JSON document.
///
/// Accepts a top-level array of objects, or an object wrapping such an
/// array under any key (the first array-valued field is used). Non-object
/// array elements are skipped.
pub fn rows_from_value(value: Value) -> Result<Vec<Row>, FloodMapError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => map
            .into_iter()
            .find_map(|(_, v)| match v {
                Value::Array(items) => Some(items),
                _ => None,
            })
            .ok_or_else(|| FloodMapError::ParseError("no array of rows in response".to_string()))?,
        _ => {
            return Err(FloodMapError::ParseError(
                "expected an array of rows".to_string(),
            ));
        }
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(row) => Some(row),
            _ => None,
        })
        .collect())
}

/// Parses a JSON text into rows. See `rows_from_value`.
pub fn rows_from_json(text: &str) -> Result<Vec<Row>, FloodMapError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|_| FloodMapError::ParseError("Invalid JSON format.".to_string()))?;
    rows_from_value(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_array_of_rows() {
        let rows = rows_from_json(r#"[{"a": 1}, {"a": 2}]"#).expect("valid rows");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_wrapped_array_of_rows() {
        let rows = rows_from_json(r#"{"result": [{"a": 1}], "count": 1}"#).expect("valid rows");
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_non_object_elements_are_skipped() {
        let rows = rows_from_json(r#"[{"a": 1}, 3, "x", null]"#).expect("valid rows");
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_invalid_json_is_a_parse_error() {
        assert_eq!(
            rows_from_json("<html>"),
            Err(FloodMapError::ParseError("Invalid JSON format.".to_string()))
        );
    }

    #[test]
    fn test_scalar_document_is_a_parse_error() {
        assert!(matches!(rows_from_json("42"), Err(FloodMapError::ParseError(_))));
        assert!(matches!(rows_from_json(r#"{"a": 1}"#), Err(FloodMapError::ParseError(_))));
    }
}

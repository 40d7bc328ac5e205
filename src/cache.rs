/// Local cache for downloaded station data
///
/// Keeps the last hydro-1 export file and the last fetched rows per station
/// on disk, so a forecast can be re-run offline against the same data.
/// Rows are written in source column order.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::ingest::hydro::read_export;
use crate::ingest::rows_from_json;
use crate::model::{FloodMapError, Row};

/// File name of the cached hydro-1 export.
pub const EXPORT_FILE_NAME: &str = "data.xls";

/// Extensions read as spreadsheets rather than JSON rows.
const SPREADSHEET_EXTENSIONS: &[&str] = &["xls", "xlsx", "xlsm", "xlsb", "ods"];

/// On-disk cache rooted at a directory.
pub struct Cache {
    dir: PathBuf,
}

impl Cache {
    /// Create a cache rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the cached export file.
    pub fn export_path(&self) -> PathBuf {
        self.dir.join(EXPORT_FILE_NAME)
    }

    /// Path of the cached rows for a station, e.g. `rows_P.1.json`.
    pub fn rows_path(&self, station_code: &str) -> PathBuf {
        self.dir.join(format!("rows_{}.json", station_code))
    }

    /// Save the raw export bytes, replacing any previous file.
    pub fn save_export(&self, bytes: &[u8]) -> Result<PathBuf, FloodMapError> {
        let path = self.export_path();
        self.write(&path, bytes)?;
        Ok(path)
    }

    /// Read the cached export's first sheet into rows.
    pub fn load_export_rows(&self) -> Result<Vec<Row>, FloodMapError> {
        read_export(&self.export_path())
    }

    /// Save a station's rows as a JSON array.
    pub fn save_rows(&self, station_code: &str, rows: &[Row]) -> Result<PathBuf, FloodMapError> {
        let json = serde_json::to_vec_pretty(rows).map_err(|e| FloodMapError::CacheError(e.to_string()))?;
        let path = self.rows_path(station_code);
        self.write(&path, &json)?;
        Ok(path)
    }

    /// Load a station's cached rows.
    pub fn load_rows(&self, station_code: &str) -> Result<Vec<Row>, FloodMapError> {
        load_rows_file(&self.rows_path(station_code))
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), FloodMapError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| FloodMapError::CacheError(format!("{}: {}", self.dir.display(), e)))?;
        fs::write(path, bytes).map_err(|e| FloodMapError::CacheError(format!("{}: {}", path.display(), e)))
    }
}

/// Load rows from a file. Spreadsheets (`.xls`, `.xlsx`, `.ods`, ...) are
/// read from their first sheet; anything else must be JSON holding an
/// array of row objects.
pub fn load_rows_file(path: &Path) -> Result<Vec<Row>, FloodMapError> {
    if is_spreadsheet(path) {
        return read_export(path);
    }

    let bytes = read(path)?;
    let text = String::from_utf8(bytes)
        .map_err(|e| FloodMapError::CacheError(format!("{}: {}", path.display(), e)))?;
    rows_from_json(&text)
}

fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SPREADSHEET_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn read(path: &Path) -> Result<Vec<u8>, FloodMapError> {
    fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => FloodMapError::CacheError(format!("File not found: {}", path.display())),
        _ => FloodMapError::CacheError(format!("{}: {}", path.display(), e)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_rows() -> Vec<Row> {
        json!([
            {"เวลา": "24/10/2024 13:00", "ระดับน้ำ(ม.)": "3.18"},
            {"เวลา": "24/10/2024 14:00", "ระดับน้ำ(ม.)": 3.22},
        ])
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect()
    }

    #[test]
    fn test_rows_survive_save_and_load() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cache = Cache::new(dir.path().join("cache"));

        let path = cache.save_rows("P.1", &sample_rows()).expect("save should succeed");
        assert!(path.ends_with("rows_P.1.json"));
        assert_eq!(cache.load_rows("P.1").expect("load should succeed"), sample_rows());
    }

    #[test]
    fn test_export_bytes_are_saved_verbatim() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cache = Cache::new(dir.path());
        let bytes = [0xD0, 0xCF, 0x11, 0xE0, 0x00, 0xFF];

        let path = cache.save_export(&bytes).expect("save should succeed");
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some(EXPORT_FILE_NAME));
        assert_eq!(fs::read(&path).expect("file should exist"), bytes.to_vec());
    }

    #[test]
    fn test_missing_file_reports_not_found() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cache = Cache::new(dir.path());
        match cache.load_export_rows() {
            Err(FloodMapError::CacheError(msg)) => {
                assert!(msg.starts_with("File not found"), "got: {}", msg)
            }
            other => panic!("expected CacheError, got {:?}", other),
        }
    }

    #[test]
    fn test_load_rows_file_rejects_non_json() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("rows.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(load_rows_file(&path), Err(FloodMapError::ParseError(_))));
    }

    #[test]
    fn test_saved_rows_keep_column_order() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cache = Cache::new(dir.path());
        cache.save_rows("P.1", &sample_rows()).expect("save should succeed");

        let loaded = cache.load_rows("P.1").expect("load should succeed");
        let keys: Vec<&str> = loaded[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["เวลา", "ระดับน้ำ(ม.)"]);
    }

    #[test]
    fn test_spreadsheet_extensions_are_read_as_workbooks() {
        assert!(is_spreadsheet(Path::new("cache/data.xls")));
        assert!(is_spreadsheet(Path::new("export.XLSX")));
        assert!(!is_spreadsheet(Path::new("rows_P.1.json")));
        assert!(!is_spreadsheet(Path::new("data")));

        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("data.xls");
        fs::write(&path, "[]").unwrap();
        assert!(
            matches!(load_rows_file(&path), Err(FloodMapError::ParseError(_))),
            "a .xls file should not be parsed as JSON"
        );
    }
}

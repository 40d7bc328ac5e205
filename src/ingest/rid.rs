/// RID (Royal Irrigation Department) Hourly Water Level Client
///
/// Retrieves hourly water-level rows for a single gauge station from the
/// RID Hydrology Center web service. The service takes a JSON POST naming
/// the station code and answers with JSON rows, newest first.
///
/// Service: https://hyd-app-db.rid.go.th/webservice/SWOCService.svc

use serde::Serialize;
use serde_json::Value;

use crate::analysis::series::parse_level;
use crate::ingest::rows_from_json;
use crate::model::{FloodMapError, RID_LEVEL_FIELD, RID_TIME_FIELD, Row};

pub const RID_HOURLY_ENDPOINT: &str =
    "https://hyd-app-db.rid.go.th/webservice/SWOCService.svc/getHourlyWaterLevelFromStationCode";

// ============================================================================
// Request / Response Structures
// ============================================================================

/// Request body: `{"hydro": {"stationcode": "P.1"}}`
#[derive(Debug, Serialize)]
struct HourlyRequest<'a> {
    hydro: HydroQuery<'a>,
}

#[derive(Debug, Serialize)]
struct HydroQuery<'a> {
    stationcode: &'a str,
}

/// Current conditions at a station, taken from the newest row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationSnapshot {
    pub station_code: String,
    pub water_level_m: Option<f64>,
    pub discharge_cms: Option<f64>,  // Q, m³/s
    pub province: Option<String>,
    pub last_updated: Option<String>,
    pub ground_level_m: Option<f64>, // ZG
    pub bank_level_m: Option<f64>,   // braelevel
}

impl StationSnapshot {
    /// One-line station panel: discharge, province, ground and bank levels,
    /// last update. Missing values print as `N/A`.
    pub fn details(&self) -> String {
        let metres = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_else(|| "N/A".to_string());
        format!(
            "Q {} m³/s  province {}  ZG {} m  bank {} m  updated {}",
            metres(self.discharge_cms),
            self.province.as_deref().unwrap_or("N/A"),
            metres(self.ground_level_m),
            metres(self.bank_level_m),
            self.last_updated.as_deref().unwrap_or("N/A"),
        )
    }
}

// ============================================================================
// API Client Functions
// ============================================================================

/// Serializes the request body for a station.
pub fn build_request_body(station_code: &str) -> Result<String, FloodMapError> {
    let request = HourlyRequest {
        hydro: HydroQuery {
            stationcode: station_code,
        },
    };
    serde_json::to_string(&request).map_err(|e| FloodMapError::ParseError(e.to_string()))
}

/// Fetch hourly rows for a station, newest first.
///
/// # Parameters
/// - `client`: HTTP client
/// - `endpoint`: service URL (normally `RID_HOURLY_ENDPOINT`)
/// - `station_code`: RID station code (e.g., "P.1")
pub fn fetch_hourly_rows(
    client: &reqwest::blocking::Client,
    endpoint: &str,
    station_code: &str,
) -> Result<Vec<Row>, FloodMapError> {
    let body = build_request_body(station_code)?;

    let response = client
        .post(endpoint)
        .header("Content-Type", "application/json")
        .body(body)
        .send()?;

    if !response.status().is_success() {
        return Err(FloodMapError::HttpError(response.status().as_u16()));
    }

    let text = response.text()?;
    parse_hourly_response(station_code, &text)
}

/// Fetch the current conditions for a station.
pub fn fetch_snapshot(
    client: &reqwest::blocking::Client,
    endpoint: &str,
    station_code: &str,
) -> Result<StationSnapshot, FloodMapError> {
    let rows = fetch_hourly_rows(client, endpoint, station_code)?;
    snapshot_from_rows(station_code, &rows)
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse a service response body into rows.
///
/// An empty body means the station has nothing to report and yields
/// `NoDataAvailable`; a body that is not JSON yields
/// `ParseError("Invalid JSON format.")`.
pub fn parse_hourly_response(station_code: &str, text: &str) -> Result<Vec<Row>, FloodMapError> {
    if text.trim().is_empty() {
        return Err(FloodMapError::NoDataAvailable(station_code.to_string()));
    }
    rows_from_json(text)
}

/// Build the current-conditions snapshot from the newest (first) row.
pub fn snapshot_from_rows(station_code: &str, rows: &[Row]) -> Result<StationSnapshot, FloodMapError> {
    let latest = rows
        .first()
        .ok_or_else(|| FloodMapError::NoDataAvailable(station_code.to_string()))?;

    let number = |key: &str| latest.get(key).and_then(parse_level);
    let text = |key: &str| match latest.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    Ok(StationSnapshot {
        station_code: station_code.to_string(),
        water_level_m: number(RID_LEVEL_FIELD),
        discharge_cms: number("Q"),
        province: text("provincename"),
        last_updated: text(RID_TIME_FIELD),
        ground_level_m: number("ZG"),
        bank_level_m: number("braelevel"),
    })
}

/// The service lists rows newest first; the forecast wants them oldest
/// first.
pub fn chronological(mut rows: Vec<Row>) -> Vec<Row> {
    rows.reverse();
    rows
}

// ============================================================================
// Tests
// ============================================================================

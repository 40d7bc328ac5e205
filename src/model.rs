/// Reading, Prediction, Row, FloodThresholds, FloodMapError
/// core data structures and error handling
///
/// Core data types for the Ping River flood map service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic beyond formatting, no I/O, and only the
/// serialization dependencies needed to hand these types to the outside.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

/// Substring identifying the water-level column ("water level") in the
/// hydro-1 hourly export, e.g. `ระดับน้ำ(ม.)`.
pub const HYDRO_LEVEL_COLUMN: &str = "ระดับน้ำ";

/// Time column ("time") in the hydro-1 hourly export.
pub const HYDRO_TIME_COLUMN: &str = "เวลา";

/// Water-level field in RID web service rows.
pub const RID_LEVEL_FIELD: &str = "waterlevelvalue";

/// Timestamp field in RID web service rows.
pub const RID_TIME_FIELD: &str = "hourlydateString";

// ---------------------------------------------------------------------------
// Forecast constants
// ---------------------------------------------------------------------------

/// Number of hourly steps in a forecast.
pub const FORECAST_HORIZON: usize = 24;

/// Maximum number of recent samples the trend is computed over.
pub const TREND_WINDOW: usize = 24;

/// Peak-to-peak amplitude of the per-step jitter, in metres.
pub const JITTER_AMPLITUDE: f64 = 0.05;

/// Largest allowed change between consecutive predictions, in metres.
pub const MAX_STEP_DEVIATION: f64 = 0.1;

/// Timestamp written in place of a prediction time when the base
/// timestamp could not be parsed.
pub const INVALID_DATE: &str = "Invalid date";

/// Output format for prediction timestamps (`DD/MM/YYYY HH:mm`).
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M";

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// One tabular row as produced by a spreadsheet-to-JSON conversion or the
/// RID web service: column name → raw value.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// A single hourly observation taken from one source row.
///
/// `value` is `None` when the level column was missing or not numeric.
/// The timestamp is kept exactly as the source formatted it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub timestamp: String,
    pub value: Option<f64>,
}

/// A forecast water level for one future hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub timestamp: String, // DD/MM/YYYY HH:mm, or "Invalid date"
    pub value: f64,        // metres, rounded to 2 decimals
}

// ---------------------------------------------------------------------------
// Threshold types
// ---------------------------------------------------------------------------

/// Water levels, in metres, at which a station's flood status escalates.
///
///   level < warning            →  Normal
///   warning <= level < danger  →  Warning
///   level >= danger            →  Danger
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FloodThresholds {
    pub warning_level_m: f64,
    pub danger_level_m: f64,
}

impl Default for FloodThresholds {
    fn default() -> Self {
        Self {
            warning_level_m: 5.0,
            danger_level_m: 8.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching, caching or configuring station data.
///
/// The forecasting core never returns these: it degrades to sentinel values
/// instead.
#[derive(Debug, PartialEq)]
pub enum FloodMapError {
    /// Non-2xx HTTP response from an upstream service.
    HttpError(u16),
    /// The request could not be sent or the body could not be read.
    RequestFailed(String),
    /// The response body could not be deserialized.
    ParseError(String),
    /// The station code is not in the registry.
    StationNotFound(String),
    /// The station responded but with no usable rows.
    NoDataAvailable(String),
    /// The configuration file could not be read or parsed.
    ConfigError(String),
    /// Reading or writing the local cache failed.
    CacheError(String),
}

impl std::fmt::Display for FloodMapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FloodMapError::HttpError(code) => write!(f, "HTTP error: {}", code),
            FloodMapError::RequestFailed(msg) => write!(f, "Request failed: {}", msg),
            FloodMapError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            FloodMapError::StationNotFound(code) => write!(f, "Station not found: {}", code),
            FloodMapError::NoDataAvailable(code) => {
                write!(f, "No data available for station: {}", code)
            }
            FloodMapError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            FloodMapError::CacheError(msg) => write!(f, "Cache error: {}", msg),
        }
    }
}

impl std::error::Error for FloodMapError {}

impl From<reqwest::Error> for FloodMapError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FloodMapError::HttpError(status.as_u16()),
            None => FloodMapError::RequestFailed(err.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Short-horizon water-level projection.
//!
//! The forecast extends the last known level by the recent trend one hour
//! at a time, adds a small random jitter per step, and clamps each step to
//! a maximum deviation from the *previous predicted* value. Each rounded,
//! clamped value becomes the anchor for the next step, so single-step
//! volatility is bounded while cumulative drift over the horizon is not.
//!
//! # Clock and RNG injection
//! `generate_forecast` takes `today` (used only for time-only source
//! timestamps such as `"14:00 น."`) and the RNG as parameters, so tests can
//! pin both. `forecast_station_rows` is the convenience wrapper that uses
//! the local date and `thread_rng`.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rand::Rng;
use serde::Serialize;

use crate::analysis::series::{ColumnMapping, extract_readings, series_from_readings};
use crate::analysis::trend::estimate_trend;
use crate::model::{FORECAST_HORIZON, JITTER_AMPLITUDE, MAX_STEP_DEVIATION, TREND_WINDOW};
use crate::model::{INVALID_DATE, Prediction, Reading, Row, TIMESTAMP_FORMAT};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tunables for a forecast run. `Default` gives the hourly 24-step
/// forecast shown on the station page.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    /// Number of predictions produced.
    pub horizon: usize,
    /// Number of recent samples the trend is averaged over.
    pub trend_window: usize,
    /// Time between predictions.
    pub step: Duration,
    /// Peak-to-peak jitter amplitude; 0.0 makes the forecast deterministic.
    pub jitter_amplitude: f64,
    /// Largest change allowed between consecutive predictions.
    pub max_step_deviation: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon: FORECAST_HORIZON,
            trend_window: TREND_WINDOW,
            step: Duration::hours(1),
            jitter_amplitude: JITTER_AMPLITUDE,
            max_step_deviation: MAX_STEP_DEVIATION,
        }
    }
}

// ---------------------------------------------------------------------------
// Timestamp handling
// ---------------------------------------------------------------------------

/// Full date-time formats accepted for the last source timestamp.
const DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Suffix ("o'clock") on time-only readings such as `"14:00 น."`.
const THAI_HOUR_SUFFIX: &str = "น.";

/// Parses the last source timestamp into the forecast base time.
///
/// Time-only values (`"HH:mm น."`) are placed on `today`. RFC 3339 values
/// keep their local wall-clock time. Returns `None` when nothing matches.
pub fn parse_base_timestamp(raw: &str, today: NaiveDate) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(time) = raw.strip_suffix(THAI_HOUR_SUFFIX) {
        return NaiveTime::parse_from_str(time.trim(), "%H:%M")
            .ok()
            .map(|t| today.and_time(t));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Timestamp of the `step`-th prediction, or `"Invalid date"`.
fn step_timestamp(base: Option<NaiveDateTime>, step_size: Duration, step: usize) -> String {
    let offset = i32::try_from(step).ok().and_then(|n| step_size.checked_mul(n));
    base.zip(offset)
        .and_then(|(base, offset)| base.checked_add_signed(offset))
        .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| INVALID_DATE.to_string())
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Forecast generation
// ---------------------------------------------------------------------------

/// Projects `config.horizon` predictions from the end of `series`.
///
/// Always returns exactly `config.horizon` entries. An empty series is
/// anchored at 0.0. An unparsable `last_timestamp` gives every entry the
/// timestamp `"Invalid date"` while values are still produced.
pub fn generate_forecast<R: Rng + ?Sized>(
    series: &[f64],
    last_timestamp: &str,
    trend: f64,
    config: &ForecastConfig,
    today: NaiveDate,
    rng: &mut R,
) -> Vec<Prediction> {
    let base = parse_base_timestamp(last_timestamp, today);
    let max_change = config.max_step_deviation.abs();
    let mut running = series.last().copied().unwrap_or(0.0);

    (1..=config.horizon)
        .map(|step| {
            let jitter = rng.gen_range(-0.5_f64..0.5) * config.jitter_amplitude;
            let candidate = running + trend + jitter;
            let clamped = candidate.max(running - max_change).min(running + max_change);
            running = round_to_cents(clamped);

            Prediction {
                timestamp: step_timestamp(base, config.step, step),
                value: running,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Row pipeline
// ---------------------------------------------------------------------------

/// Everything derived from one station's rows in a forecast run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationForecast {
    pub readings: Vec<Reading>,
    pub series: Vec<f64>,
    pub trend: f64,
    pub predictions: Vec<Prediction>,
}

/// Extracts readings from chronologically ordered `rows`, estimates the
/// trend and generates the forecast.
///
/// The base timestamp is taken from the last *row*, whether or not its
/// level parsed.
pub fn forecast_rows<R: Rng + ?Sized>(
    rows: &[Row],
    mapping: &ColumnMapping,
    config: &ForecastConfig,
    today: NaiveDate,
    rng: &mut R,
) -> StationForecast {
    let readings = extract_readings(rows, mapping);
    let series = series_from_readings(&readings);
    let trend = estimate_trend(&series, config.trend_window);
    let last_timestamp = readings.last().map(|r| r.timestamp.as_str()).unwrap_or("");
    let predictions = generate_forecast(&series, last_timestamp, trend, config, today, rng);

    StationForecast {
        readings,
        series,
        trend,
        predictions,
    }
}

/// Convenience wrapper that uses the local date and a thread-local RNG.
/// Use `forecast_rows` in tests to keep them deterministic.
pub fn forecast_station_rows(
    rows: &[Row],
    mapping: &ColumnMapping,
    config: &ForecastConfig,
) -> StationForecast {
    let today = chrono::Local::now().date_naive();
    forecast_rows(rows, mapping, config, today, &mut rand::thread_rng())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Service configuration.
//!
//! Settings are read from a TOML file (default `floodmap.toml`), then
//! selected values are overridden from the environment. A `.env` file in
//! the working directory is loaded first, so overrides can live there.
//!
//! ```toml
//! default_station = "P.1"
//! history_days = 7
//! cache_dir = "cache"
//!
//! [forecast]
//! horizon = 24
//! jitter_amplitude = 0.05
//!
//! [thresholds."P.20"]
//! warning_level_m = 3.5
//! danger_level_m = 5.0
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::Deserialize;

use crate::analysis::forecast::ForecastConfig;
use crate::analysis::presentation::DEFAULT_PAGE_SIZE;
use crate::ingest::hydro::{DEFAULT_HISTORY_DAYS, HYDRO_EXPORT_URL};
use crate::ingest::rid::RID_HOURLY_ENDPOINT;
use crate::logging::LogLevel;
use crate::model::{FORECAST_HORIZON, JITTER_AMPLITUDE, MAX_STEP_DEVIATION, TREND_WINDOW};
use crate::model::{FloodMapError, FloodThresholds};
use crate::stations::Station;

/// One week; longer steps make no sense for an hourly series.
const MAX_STEP_MINUTES: i64 = 7 * 24 * 60;

pub const DEFAULT_CONFIG_PATH: &str = "floodmap.toml";

/// Environment variable naming an alternative config file.
pub const ENV_CONFIG_PATH: &str = "FLOODMAP_CONFIG";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub rid_endpoint: String,
    pub hydro_export_url: String,
    /// Station forecast when none is named on the command line.
    pub default_station: String,
    /// Days of history requested from the hydro export.
    pub history_days: i64,
    /// History table rows per page.
    pub page_size: usize,
    /// Seconds between refreshes in watch mode.
    pub refresh_interval_secs: u64,
    pub cache_dir: PathBuf,
    pub log_file: Option<String>,
    /// "debug", "info", "warn" or "error".
    pub log_level: String,
    pub forecast: ForecastSettings,
    /// Per-station threshold overrides, keyed by station code.
    pub thresholds: BTreeMap<String, FloodThresholds>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            rid_endpoint: RID_HOURLY_ENDPOINT.to_string(),
            hydro_export_url: HYDRO_EXPORT_URL.to_string(),
            default_station: "P.1".to_string(),
            history_days: DEFAULT_HISTORY_DAYS,
            page_size: DEFAULT_PAGE_SIZE,
            refresh_interval_secs: 60,
            cache_dir: PathBuf::from("cache"),
            log_file: None,
            log_level: "info".to_string(),
            forecast: ForecastSettings::default(),
            thresholds: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ForecastSettings {
    pub horizon: usize,
    pub trend_window: usize,
    pub jitter_amplitude: f64,
    pub max_step_deviation: f64,
    pub step_minutes: i64,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            horizon: FORECAST_HORIZON,
            trend_window: TREND_WINDOW,
            jitter_amplitude: JITTER_AMPLITUDE,
            max_step_deviation: MAX_STEP_DEVIATION,
            step_minutes: 60,
        }
    }
}

impl ForecastSettings {
    pub fn to_forecast_config(&self) -> ForecastConfig {
        ForecastConfig {
            horizon: self.horizon,
            trend_window: self.trend_window,
            step: Duration::minutes(self.step_minutes),
            jitter_amplitude: self.jitter_amplitude,
            max_step_deviation: self.max_step_deviation,
        }
    }
}

impl ServiceConfig {
    /// Thresholds for a station: the configured override, else the
    /// registry's values.
    pub fn thresholds_for(&self, station: &Station) -> FloodThresholds {
        self.thresholds
            .get(station.code)
            .cloned()
            .unwrap_or_else(|| station.thresholds.clone())
    }

    /// The configured minimum log level; unrecognised values mean Info.
    pub fn min_log_level(&self) -> LogLevel {
        match self.log_level.to_ascii_lowercase().as_str() {
            "debug" => LogLevel::Debug,
            "warn" | "warning" => LogLevel::Warning,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }

    fn validate(&self) -> Result<(), FloodMapError> {
        if self.refresh_interval_secs == 0 {
            return Err(FloodMapError::ConfigError("refresh_interval_secs must be at least 1".to_string()));
        }
        if self.forecast.horizon == 0 {
            return Err(FloodMapError::ConfigError("forecast.horizon must be at least 1".to_string()));
        }
        if !(1..=MAX_STEP_MINUTES).contains(&self.forecast.step_minutes) {
            return Err(FloodMapError::ConfigError(format!(
                "forecast.step_minutes must be between 1 and {}",
                MAX_STEP_MINUTES
            )));
        }
        let non_negative = |v: f64| v.is_finite() && v >= 0.0;
        if !non_negative(self.forecast.max_step_deviation) || !non_negative(self.forecast.jitter_amplitude) {
            return Err(FloodMapError::ConfigError(
                "forecast.max_step_deviation and forecast.jitter_amplitude must be non-negative".to_string(),
            ));
        }
        for (code, t) in &self.thresholds {
            if t.warning_level_m >= t.danger_level_m {
                return Err(FloodMapError::ConfigError(format!(
                    "thresholds.\"{}\": warning_level_m must be below danger_level_m",
                    code
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parse and validate a TOML config document.
pub fn parse_config(text: &str) -> Result<ServiceConfig, FloodMapError> {
    let config: ServiceConfig = toml::from_str(text).map_err(|e| FloodMapError::ConfigError(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Apply environment overrides. `lookup` is `std::env::var` in production
/// and a fixed map in tests.
pub fn apply_env_overrides<F>(config: &mut ServiceConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("FLOODMAP_RID_ENDPOINT") {
        config.rid_endpoint = v;
    }
    if let Some(v) = lookup("FLOODMAP_HYDRO_EXPORT_URL") {
        config.hydro_export_url = v;
    }
    if let Some(v) = lookup("FLOODMAP_CACHE_DIR") {
        config.cache_dir = PathBuf::from(v);
    }
    if let Some(v) = lookup("FLOODMAP_LOG_FILE") {
        config.log_file = Some(v);
    }
}

/// Load the service configuration.
///
/// Resolution order for the file: `path` argument, then `FLOODMAP_CONFIG`,
/// then `floodmap.toml`. An explicitly named file must exist; a missing
/// default file means built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig, FloodMapError> {
    dotenv::dotenv().ok();

    let explicit = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(ENV_CONFIG_PATH).ok().map(PathBuf::from));

    let mut config = match explicit {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| FloodMapError::ConfigError(format!("{}: {}", path.display(), e)))?;
            parse_config(&text)?
        }
        None => match std::fs::read_to_string(DEFAULT_CONFIG_PATH) {
            Ok(text) => parse_config(&text)?,
            Err(_) => ServiceConfig::default(),
        },
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

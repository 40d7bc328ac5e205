//! Flood status classification.
//!
//! Maps a station's current water level onto the status shown on the map
//! marker and in the station details panel.

use serde::Serialize;

use crate::model::FloodThresholds;

/// Flood status levels, in ascending order of severity. `Unknown` is used
/// when no usable level is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum FloodStatus {
    Unknown,
    Normal,
    Warning,
    Danger,
}

impl FloodStatus {
    /// Marker colour for this status.
    pub fn color(self) -> &'static str {
        match self {
            FloodStatus::Unknown => "blue",
            FloodStatus::Normal => "green",
            FloodStatus::Warning => "orange",
            FloodStatus::Danger => "red",
        }
    }

    /// Label shown next to "Flood Status".
    pub fn label(self) -> &'static str {
        match self {
            FloodStatus::Unknown => "Unknown",
            FloodStatus::Normal => "Normal",
            FloodStatus::Warning => "Warning",
            FloodStatus::Danger => "Danger",
        }
    }
}

impl std::fmt::Display for FloodStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A status change worth telling someone about.
#[derive(Debug, Clone, PartialEq)]
pub struct FloodAlert {
    pub status: FloodStatus,
    pub message: String,
}

/// Classifies a water level against a station's thresholds.
///
/// Boundaries are inclusive on the upper status: a level exactly at the
/// warning line is Warning, exactly at the danger line is Danger.
pub fn classify_level(level_m: Option<f64>, thresholds: &FloodThresholds) -> FloodStatus {
    match level_m {
        Some(level) if level.is_finite() => {
            if level >= thresholds.danger_level_m {
                FloodStatus::Danger
            } else if level >= thresholds.warning_level_m {
                FloodStatus::Warning
            } else {
                FloodStatus::Normal
            }
        }
        _ => FloodStatus::Unknown,
    }
}

/// Returns an alert when the level is at or above the warning line.
pub fn check_flood_level(
    station_code: &str,
    level_m: Option<f64>,
    thresholds: &FloodThresholds,
) -> Option<FloodAlert> {
    let status = classify_level(level_m, thresholds);
    if status < FloodStatus::Warning {
        return None;
    }

    let level = level_m.unwrap_or_default();
    let limit = match status {
        FloodStatus::Danger => thresholds.danger_level_m,
        _ => thresholds.warning_level_m,
    };
    Some(FloodAlert {
        status,
        message: format!(
            "{} at {}: {:.2} m is at or above the {:.2} m line",
            status, station_code, level, limit
        ),
    })
}

/// Formats a current water level for display: three decimals, or "N/A".
pub fn format_water_height(level_m: Option<f64>) -> String {
    match level_m {
        Some(level) if level.is_finite() => format!("{:.3}", level),
        _ => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ping() -> FloodThresholds {
        FloodThresholds::default()
    }

    #[test]
    fn test_levels_below_warning_are_normal() {
        assert_eq!(classify_level(Some(0.0), &ping()), FloodStatus::Normal);
        assert_eq!(classify_level(Some(4.99), &ping()), FloodStatus::Normal);
    }

    #[test]
    fn test_warning_band_is_inclusive_at_lower_edge() {
        assert_eq!(classify_level(Some(5.0), &ping()), FloodStatus::Warning);
        assert_eq!(classify_level(Some(7.99), &ping()), FloodStatus::Warning);
    }

    #[test]
    fn test_danger_starts_exactly_at_danger_line() {
        assert_eq!(classify_level(Some(8.0), &ping()), FloodStatus::Danger);
        assert_eq!(classify_level(Some(12.3), &ping()), FloodStatus::Danger);
    }

    #[test]
    fn test_missing_or_nan_level_is_unknown() {
        assert_eq!(classify_level(None, &ping()), FloodStatus::Unknown);
        assert_eq!(classify_level(Some(f64::NAN), &ping()), FloodStatus::Unknown);
        assert_eq!(FloodStatus::Unknown.color(), "blue");
    }

    #[test]
    fn test_status_colors_match_marker_scheme() {
        assert_eq!(FloodStatus::Normal.color(), "green");
        assert_eq!(FloodStatus::Warning.color(), "orange");
        assert_eq!(FloodStatus::Danger.color(), "red");
    }

    #[test]
    fn test_custom_thresholds_are_respected() {
        let t = FloodThresholds {
            warning_level_m: 3.7,
            danger_level_m: 4.2,
        };
        assert_eq!(classify_level(Some(4.0), &t), FloodStatus::Warning);
        assert_eq!(classify_level(Some(4.0), &ping()), FloodStatus::Normal);
    }

    #[test]
    fn test_alert_only_at_or_above_warning() {
        assert!(check_flood_level("P.1", Some(3.2), &ping()).is_none());
        assert!(check_flood_level("P.1", None, &ping()).is_none());

        let alert = check_flood_level("P.1", Some(8.4), &ping()).expect("8.4 m should alert");
        assert_eq!(alert.status, FloodStatus::Danger);
        assert!(alert.message.contains("P.1"), "message was: {}", alert.message);
        assert!(alert.message.contains("8.40"), "message was: {}", alert.message);
    }

    #[test]
    fn test_water_height_formatting() {
        assert_eq!(format_water_height(Some(3.14159)), "3.142");
        assert_eq!(format_water_height(None), "N/A");
    }
}

/// Station registry for the Ping River flood map service.
///
/// Defines the canonical list of RID gauge stations shown on the map,
/// along with their coordinates and flood-status thresholds. This is the
/// single source of truth for station codes; all other modules should
/// reference stations from here rather than hardcoding codes.

use crate::model::FloodThresholds;

// ---------------------------------------------------------------------------
// Station metadata
// ---------------------------------------------------------------------------

/// Metadata for a single river gauge station.
pub struct Station {
    /// RID station code, e.g. "P.1".
    pub code: &'static str,
    /// Official station name (Thai), including river and district.
    pub name: &'static str,
    /// WGS84 latitude.
    pub latitude: f64,
    /// WGS84 longitude.
    pub longitude: f64,
    /// Levels at which the station's status turns Warning / Danger.
    pub thresholds: FloodThresholds,
}

const PING_RIVER_THRESHOLDS: FloodThresholds = FloodThresholds {
    warning_level_m: 5.0,
    danger_level_m: 8.0,
};

/// All monitored Ping River stations, city gauge first.
///
/// Source: RID Hydrology Center (hyd-app-db.rid.go.th) station list.
pub static STATION_REGISTRY: &[Station] = &[
    Station {
        code: "P.1",
        name: "สถานี P.1 สะพานนวรัฐ แม่น้ำปิง ต.วัดเกต อ.เมือง จ.เชียงใหม่",
        latitude: 18.788450,
        longitude: 99.004095,
        thresholds: PING_RIVER_THRESHOLDS,
    },
    Station {
        code: "P.75",
        name: "สถานี P.75 บ้านแม่แต แม่น้ำปิง ต.แม่แฝกเก่า อ.สันทราย จ.เชียงใหม่",
        latitude: 19.007223200081377,
        longitude: 98.96455139541524,
        thresholds: PING_RIVER_THRESHOLDS,
    },
    Station {
        code: "P.20",
        name: "สถานี P.20 อ.เชียงดาว จ.เชียงใหม่",
        latitude: 19.369550704956055,
        longitude: 98.969100952148438,
        thresholds: PING_RIVER_THRESHOLDS,
    },
    Station {
        code: "P.67",
        name: "สถานี P.67 อ.สันทราย จ.เชียงใหม่",
        latitude: 18.933161,
        longitude: 99.033818,
        thresholds: PING_RIVER_THRESHOLDS,
    },
];

/// Returns the codes of all monitored stations.
pub fn all_station_codes() -> Vec<&'static str> {
    STATION_REGISTRY.iter().map(|s| s.code).collect()
}

/// Looks up a station by code. Returns `None` if not found.
pub fn find_station(code: &str) -> Option<&'static Station> {
    STATION_REGISTRY.iter().find(|s| s.code == code)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_station_codes_are_valid_rid_format() {
        // Ping River codes are "P." followed by a number.
        for station in STATION_REGISTRY {
            let number = station
                .code
                .strip_prefix("P.")
                .unwrap_or_else(|| panic!("code '{}' should start with 'P.'", station.code));
            assert!(
                !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()),
                "code '{}' should end in digits",
                station.code
            );
        }
    }

    #[test]
    fn test_no_duplicate_station_codes() {
        let mut seen = std::collections::HashSet::new();
        for station in STATION_REGISTRY {
            assert!(
                seen.insert(station.code),
                "duplicate station code '{}' found in STATION_REGISTRY",
                station.code
            );
        }
    }

    #[test]
    fn test_registry_contains_all_ping_river_stations() {
        let codes = all_station_codes();
        for expected in ["P.1", "P.75", "P.20", "P.67"] {
            assert!(codes.contains(&expected), "STATION_REGISTRY missing '{}'", expected);
        }
    }

    #[test]
    fn test_station_names_mention_their_code() {
        for station in STATION_REGISTRY {
            assert!(
                station.name.contains(station.code),
                "name '{}' should contain code '{}'",
                station.name,
                station.code
            );
        }
    }

    #[test]
    fn test_coordinates_are_in_chiang_mai_province() {
        for station in STATION_REGISTRY {
            assert!(
                (18.0..20.5).contains(&station.latitude) && (98.0..100.0).contains(&station.longitude),
                "station '{}' at ({}, {}) is outside Chiang Mai",
                station.code,
                station.latitude,
                station.longitude
            );
        }
    }

    #[test]
    fn test_thresholds_are_ordered() {
        for station in STATION_REGISTRY {
            assert!(
                station.thresholds.warning_level_m < station.thresholds.danger_level_m,
                "warning must be below danger for '{}'",
                station.code
            );
        }
    }

    #[test]
    fn test_find_station() {
        let station = find_station("P.1").expect("P.1 should be in registry");
        assert!(station.name.contains("สะพานนวรัฐ"));
        assert!(find_station("X.99").is_none());
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::classifier::Status;

/// A fixed monitoring location. Reference data, immutable after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Station {
    pub id: String,
    pub name: String,
    pub district: String,
    pub state: String,
    pub lat: f64,
    pub lon: f64,
}

/// One timestamped water-level measurement tied to a station.
///
/// The source collection is not pre-sorted and may contain duplicate
/// timestamps; consumers sort explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Reading {
    pub station_id: String,
    #[serde(with = "timestamp_format")]
    #[schema(value_type = String, example = "2024-01-01T06:00:00Z")]
    pub timestamp: DateTime<Utc>,
    pub water_level_m: f64,
}

/// Timestamp codec for the source data, which mixes RFC 3339 strings with
/// naive datetimes and bare dates (bare dates load as midnight UTC).
pub mod timestamp_format {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }

    pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(dt.with_timezone(&Utc));
        }
        for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            let naive = date.and_hms_opt(0, 0, 0).ok_or("invalid date")?;
            return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
        }
        Err(format!("unparseable timestamp '{}'", raw))
    }
}

/// Direction of the water level between the two most recent readings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Trend {
    Up,
    Down,
    Stable,
}

// API response DTOs (to avoid circular dependency between services and api modules)

/// Station list entry with its derived display fields
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StationSummary {
    pub id: String,
    pub name: String,
    pub district: String,
    pub state: String,
    pub lat: f64,
    pub lon: f64,
    pub current_level_m: Option<f64>,
    pub status: Status,
    pub status_color: String,
    pub reading_count: usize,
    pub trend: Trend,
}

/// One reading with its own classification, for tables and charts
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReadingPoint {
    #[serde(with = "timestamp_format")]
    #[schema(value_type = String)]
    pub timestamp: DateTime<Utc>,
    pub water_level_m: f64,
    pub status: Status,
}

/// Detail view model for a single station
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StationDetail {
    pub id: String,
    pub name: String,
    pub district: String,
    pub state: String,
    pub lat: f64,
    pub lon: f64,
    pub current_level_m: Option<f64>,
    pub status: Status,
    pub status_color: String,
    pub trend: Trend,
    pub reading_count: usize,
    #[schema(value_type = Option<String>)]
    pub last_updated: Option<DateTime<Utc>>,
    /// Last 10 readings, newest first
    pub recent_readings: Vec<ReadingPoint>,
}

/// Aggregate statistics over a windowed subset of readings.
///
/// An empty subset yields the all-zero value by convention so display code
/// never has to branch; zero here does not mean "no data was loaded".
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct WindowStatistics {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl WindowStatistics {
    pub fn zero() -> Self {
        Self {
            count: 0,
            min: 0.0,
            max: 0.0,
            mean: 0.0,
        }
    }
}

/// Windowed chart data for one station
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReadingHistory {
    pub station_id: String,
    pub window: String,
    pub strategy: String,
    pub statistics: WindowStatistics,
    /// Readings in ascending timestamp order
    pub readings: Vec<ReadingPoint>,
}

/// Dashboard key metrics over the whole fleet
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FleetSummary {
    pub total_stations: usize,
    /// Stations with any historical reading below the critical threshold
    pub critical_stations: usize,
    /// Mean water level across every reading in the snapshot
    pub average_level_m: f64,
    pub total_readings: usize,
    pub status_breakdown: StatusBreakdown,
}

/// Count of stations per current status
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StatusBreakdown {
    pub critical: usize,
    pub warning: usize,
    pub normal: usize,
    pub unknown: usize,
}

/// Distinct filter values for dropdowns
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FacetsResponse {
    pub states: Vec<String>,
    pub districts: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_timestamp_rfc3339() {
        let ts = timestamp_format::parse_timestamp("2024-03-05T12:30:00Z").unwrap();
        assert_eq!(ts.hour(), 12);
        assert_eq!(ts.day(), 5);
    }

    #[test]
    fn test_parse_timestamp_naive_datetime() {
        let ts = timestamp_format::parse_timestamp("2024-03-05T12:30:00").unwrap();
        assert_eq!(ts.minute(), 30);
    }

    #[test]
    fn test_parse_timestamp_bare_date() {
        let ts = timestamp_format::parse_timestamp("2024-01-01").unwrap();
        assert_eq!(ts.hour(), 0);
        assert_eq!(ts.year(), 2024);
    }

    #[test]
    fn test_parse_timestamp_garbage() {
        assert!(timestamp_format::parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_reading_deserializes_from_source_schema() {
        let json = r#"{"station_id": "ST001", "timestamp": "2024-01-01", "water_level_m": 10.5}"#;
        let reading: Reading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.station_id, "ST001");
        assert_eq!(reading.water_level_m, 10.5);
    }

    #[test]
    fn test_window_statistics_zero() {
        let stats = WindowStatistics::zero();
        assert_eq!(stats.count, 0);
        assert_eq!(stats.min, 0.0);
        assert_eq!(stats.max, 0.0);
        assert_eq!(stats.mean, 0.0);
    }
}

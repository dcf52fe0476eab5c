use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::store::models::{Reading, Station, Trend};

/// Minimum change between the two most recent readings to count as movement (meters)
pub const TREND_EPSILON_M: f64 = 0.1;

/// Immutable in-memory copy of the two source collections, shared across
/// handlers. Loaded once at startup; every derived number is recomputed from
/// it on request.
#[derive(Clone)]
pub struct DataSnapshot {
    stations: Arc<Vec<Station>>,
    readings: Arc<Vec<Reading>>,
    loaded_at: DateTime<Utc>,
}

impl DataSnapshot {
    pub fn new(stations: Vec<Station>, readings: Vec<Reading>) -> Self {
        debug!(
            "Building snapshot with {} stations and {} readings",
            stations.len(),
            readings.len()
        );
        Self {
            stations: Arc::new(stations),
            readings: Arc::new(readings),
            loaded_at: Utc::now(),
        }
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn find_station(&self, station_id: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.id == station_id)
    }

    /// Readings for one station, in original source order
    pub fn readings_for(&self, station_id: &str) -> Vec<&Reading> {
        self.readings
            .iter()
            .filter(|r| r.station_id == station_id)
            .collect()
    }

    /// Readings for one station, oldest first. Stable sort: readings sharing a
    /// timestamp keep their source order.
    pub fn readings_for_ascending(&self, station_id: &str) -> Vec<&Reading> {
        let mut readings = self.readings_for(station_id);
        readings.sort_by_key(|r| r.timestamp);
        readings
    }

    /// Readings for one station, newest first, same tie-break rule
    pub fn readings_for_descending(&self, station_id: &str) -> Vec<&Reading> {
        let mut readings = self.readings_for(station_id);
        readings.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        readings
    }

    /// Most recent reading for a station, or `None` when it has none
    pub fn find_latest(&self, station_id: &str) -> Option<&Reading> {
        self.readings_for_descending(station_id).into_iter().next()
    }

    pub fn latest_level(&self, station_id: &str) -> Option<f64> {
        self.find_latest(station_id).map(|r| r.water_level_m)
    }

    pub fn reading_count(&self, station_id: &str) -> usize {
        self.readings
            .iter()
            .filter(|r| r.station_id == station_id)
            .count()
    }

    /// Direction between the two most recent readings. Fewer than two readings
    /// is `Stable`.
    pub fn trend(&self, station_id: &str) -> Trend {
        let readings = self.readings_for_descending(station_id);
        if readings.len() < 2 {
            return Trend::Stable;
        }
        let delta = readings[0].water_level_m - readings[1].water_level_m;
        if delta > TREND_EPSILON_M {
            Trend::Up
        } else if delta < -TREND_EPSILON_M {
            Trend::Down
        } else {
            Trend::Stable
        }
    }

    /// Distinct states, sorted
    pub fn states(&self) -> Vec<String> {
        let mut states: Vec<String> = self.stations.iter().map(|s| s.state.clone()).collect();
        states.sort();
        states.dedup();
        states
    }

    /// Distinct districts, sorted; narrowed to one state when given
    pub fn districts(&self, state: Option<&str>) -> Vec<String> {
        let mut districts: Vec<String> = self
            .stations
            .iter()
            .filter(|s| state.map_or(true, |wanted| s.state == wanted))
            .map(|s| s.district.clone())
            .collect();
        districts.sort();
        districts.dedup();
        districts
    }
}

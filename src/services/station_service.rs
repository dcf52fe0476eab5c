use serde::Serialize;
use utoipa::ToSchema;

use crate::classifier::{classify, Status, CRITICAL_THRESHOLD_M};
use crate::filter::{filter_stations, window_readings, FilterCriteria, SeasonRange, TimeWindow, WindowStrategy};
use crate::store::{
    DataSnapshot, FacetsResponse, FleetSummary, Reading, ReadingHistory, ReadingPoint, Station,
    StationDetail, StationSummary, StatusBreakdown, WindowStatistics,
};

/// How many readings the detail view shows
const RECENT_READINGS: usize = 10;

/// Station list with its criteria-match count
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StationListResponse {
    pub total_stations: usize,
    pub matched_stations: usize,
    pub stations: Vec<StationSummary>,
}

/// Business logic for the station list, detail and dashboard views. Every
/// view goes through this service instead of reimplementing the predicates.
#[derive(Clone)]
pub struct StationService {
    snapshot: DataSnapshot,
    window_strategy: WindowStrategy,
    season: SeasonRange,
}

impl StationService {
    pub fn new(snapshot: DataSnapshot, window_strategy: WindowStrategy, season: SeasonRange) -> Self {
        Self {
            snapshot,
            window_strategy,
            season,
        }
    }

    /// Station list view: filtered summaries with derived display fields
    pub fn list_stations(&self, criteria: &FilterCriteria) -> StationListResponse {
        let matched = filter_stations(&self.snapshot, criteria);
        let stations: Vec<StationSummary> =
            matched.into_iter().map(|s| self.summarize(s)).collect();

        StationListResponse {
            total_stations: self.snapshot.stations().len(),
            matched_stations: stations.len(),
            stations,
        }
    }

    /// Detail view for one station; `None` when the id is unknown
    pub fn get_station_detail(&self, station_id: &str) -> Option<StationDetail> {
        let station = self.snapshot.find_station(station_id)?;
        let descending = self.snapshot.readings_for_descending(station_id);
        let latest = descending.first();
        let current_level = latest.map(|r| r.water_level_m);
        let status = classify(current_level);

        Some(StationDetail {
            id: station.id.clone(),
            name: station.name.clone(),
            district: station.district.clone(),
            state: station.state.clone(),
            lat: station.lat,
            lon: station.lon,
            current_level_m: current_level,
            status,
            status_color: status.color().to_string(),
            trend: self.snapshot.trend(station_id),
            reading_count: descending.len(),
            last_updated: latest.map(|r| r.timestamp),
            recent_readings: descending
                .iter()
                .take(RECENT_READINGS)
                .map(|r| Self::reading_point(r))
                .collect(),
        })
    }

    /// Windowed chart data for one station; `None` when the id is unknown.
    /// An existing station with no readings in the window yields an empty
    /// list plus zero statistics, which is a valid answer and not an error.
    pub fn get_reading_history(
        &self,
        station_id: &str,
        window: TimeWindow,
    ) -> Option<ReadingHistory> {
        self.snapshot.find_station(station_id)?;
        let ascending = self.snapshot.readings_for_ascending(station_id);
        let windowed = window_readings(&ascending, window, self.window_strategy, self.season);

        Some(ReadingHistory {
            station_id: station_id.to_string(),
            window: window.to_string(),
            strategy: self.window_strategy.to_string(),
            statistics: Self::window_statistics(&windowed),
            readings: windowed.iter().map(|r| Self::reading_point(r)).collect(),
        })
    }

    /// Dashboard key metrics over the whole fleet
    pub fn fleet_summary(&self) -> FleetSummary {
        let stations = self.snapshot.stations();
        let readings = self.snapshot.readings();

        let critical_stations = stations
            .iter()
            .filter(|station| {
                self.snapshot
                    .readings_for(&station.id)
                    .iter()
                    .any(|r| r.water_level_m < CRITICAL_THRESHOLD_M)
            })
            .count();

        let average_level_m = if readings.is_empty() {
            0.0
        } else {
            readings.iter().map(|r| r.water_level_m).sum::<f64>() / readings.len() as f64
        };

        let mut breakdown = StatusBreakdown {
            critical: 0,
            warning: 0,
            normal: 0,
            unknown: 0,
        };
        for station in stations {
            match classify(self.snapshot.latest_level(&station.id)) {
                Status::Critical => breakdown.critical += 1,
                Status::Warning => breakdown.warning += 1,
                Status::Normal => breakdown.normal += 1,
                Status::Unknown => breakdown.unknown += 1,
            }
        }

        FleetSummary {
            total_stations: stations.len(),
            critical_stations,
            average_level_m,
            total_readings: readings.len(),
            status_breakdown: breakdown,
        }
    }

    /// Distinct filter values for the dropdowns; districts narrowed to one
    /// state when given. An empty state string means no narrowing.
    pub fn facets(&self, state: Option<&str>) -> FacetsResponse {
        let state = state.filter(|s| !s.trim().is_empty());
        FacetsResponse {
            states: self.snapshot.states(),
            districts: self.snapshot.districts(state),
        }
    }

    /// Aggregate statistics over any reading subset. Empty input is the
    /// all-zero value by convention.
    pub fn window_statistics(readings: &[&Reading]) -> WindowStatistics {
        if readings.is_empty() {
            return WindowStatistics::zero();
        }

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for reading in readings {
            min = min.min(reading.water_level_m);
            max = max.max(reading.water_level_m);
            sum += reading.water_level_m;
        }

        WindowStatistics {
            count: readings.len(),
            min,
            max,
            mean: sum / readings.len() as f64,
        }
    }

    fn summarize(&self, station: &Station) -> StationSummary {
        let current_level = self.snapshot.latest_level(&station.id);
        let status = classify(current_level);

        StationSummary {
            id: station.id.clone(),
            name: station.name.clone(),
            district: station.district.clone(),
            state: station.state.clone(),
            lat: station.lat,
            lon: station.lon,
            current_level_m: current_level,
            status,
            status_color: status.color().to_string(),
            reading_count: self.snapshot.reading_count(&station.id),
            trend: self.snapshot.trend(&station.id),
        }
    }

    fn reading_point(reading: &Reading) -> ReadingPoint {
        ReadingPoint {
            timestamp: reading.timestamp,
            water_level_m: reading.water_level_m,
            status: classify(Some(reading.water_level_m)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Trend;
    use chrono::{TimeZone, Utc};

    fn station(id: &str) -> Station {
        Station {
            id: id.to_string(),
            name: format!("{} Station", id),
            district: "Varanasi".to_string(),
            state: "Uttar Pradesh".to_string(),
            lat: 25.3,
            lon: 83.0,
        }
    }

    fn reading(station_id: &str, day: u32, level: f64) -> Reading {
        Reading {
            station_id: station_id.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, day, 6, 0, 0).unwrap(),
            water_level_m: level,
        }
    }

    fn service(stations: Vec<Station>, readings: Vec<Reading>) -> StationService {
        StationService::new(
            DataSnapshot::new(stations, readings),
            WindowStrategy::FixedCount,
            SeasonRange::default(),
        )
    }

    #[test]
    fn test_window_statistics_empty_is_all_zero() {
        let stats = StationService::window_statistics(&[]);
        assert_eq!(stats, WindowStatistics::zero());
    }

    #[test]
    fn test_window_statistics_min_max_mean() {
        let a = reading("A", 1, 10.0);
        let b = reading("A", 2, 12.0);
        let stats = StationService::window_statistics(&[&a, &b]);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 12.0);
        assert_eq!(stats.mean, 11.0);
    }

    #[test]
    fn test_list_stations_summaries() {
        let svc = service(
            vec![station("A"), station("B")],
            vec![reading("A", 1, 10.2), reading("A", 2, 10.8)],
        );
        let response = svc.list_stations(&FilterCriteria::default());
        assert_eq!(response.total_stations, 2);
        assert_eq!(response.matched_stations, 2);

        let a = &response.stations[0];
        assert_eq!(a.current_level_m, Some(10.8));
        assert_eq!(a.status, Status::Critical);
        assert_eq!(a.status_color, "#ff4757");
        assert_eq!(a.reading_count, 2);
        assert_eq!(a.trend, Trend::Up);

        let b = &response.stations[1];
        assert_eq!(b.current_level_m, None);
        assert_eq!(b.status, Status::Unknown);
        assert_eq!(b.reading_count, 0);
    }

    #[test]
    fn test_detail_unknown_station_is_none() {
        let svc = service(vec![station("A")], vec![]);
        assert!(svc.get_station_detail("MISSING").is_none());
    }

    #[test]
    fn test_detail_station_without_readings() {
        let svc = service(vec![station("A")], vec![]);
        let detail = svc.get_station_detail("A").unwrap();
        assert_eq!(detail.status, Status::Unknown);
        assert_eq!(detail.current_level_m, None);
        assert!(detail.last_updated.is_none());
        assert!(detail.recent_readings.is_empty());
    }

    #[test]
    fn test_detail_recent_readings_newest_first_capped() {
        let readings: Vec<Reading> = (1..=15).map(|day| reading("A", day, 11.5)).collect();
        let svc = service(vec![station("A")], readings);
        let detail = svc.get_station_detail("A").unwrap();
        assert_eq!(detail.reading_count, 15);
        assert_eq!(detail.recent_readings.len(), 10);
        // Newest first
        let first = detail.recent_readings[0].timestamp;
        let second = detail.recent_readings[1].timestamp;
        assert!(first > second);
    }

    #[test]
    fn test_reading_history_unknown_station_is_none() {
        let svc = service(vec![station("A")], vec![]);
        assert!(svc
            .get_reading_history("MISSING", TimeWindow::SevenDays)
            .is_none());
    }

    #[test]
    fn test_reading_history_empty_station_zero_stats() {
        let svc = service(vec![station("A")], vec![]);
        let history = svc.get_reading_history("A", TimeWindow::SevenDays).unwrap();
        assert!(history.readings.is_empty());
        assert_eq!(history.statistics, WindowStatistics::zero());
        assert_eq!(history.window, "7days");
        assert_eq!(history.strategy, "fixed-count");
    }

    #[test]
    fn test_reading_history_ascending_with_stats() {
        let svc = service(
            vec![station("A")],
            vec![reading("A", 3, 12.0), reading("A", 1, 10.0), reading("A", 2, 11.0)],
        );
        let history = svc.get_reading_history("A", TimeWindow::SevenDays).unwrap();
        assert_eq!(history.readings.len(), 3);
        assert_eq!(history.readings[0].water_level_m, 10.0);
        assert_eq!(history.readings[2].water_level_m, 12.0);
        assert_eq!(history.statistics.mean, 11.0);
        assert_eq!(history.readings[0].status, Status::Critical);
        assert_eq!(history.readings[2].status, Status::Normal);
    }

    #[test]
    fn test_fleet_summary() {
        let svc = service(
            vec![station("A"), station("B"), station("C")],
            vec![
                // A: dipped critical once, currently normal
                reading("A", 1, 10.0),
                reading("A", 2, 12.5),
                // B: currently warning
                reading("B", 1, 11.5),
            ],
        );
        let summary = svc.fleet_summary();
        assert_eq!(summary.total_stations, 3);
        assert_eq!(summary.critical_stations, 1);
        assert_eq!(summary.total_readings, 3);
        assert!((summary.average_level_m - 34.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.status_breakdown.normal, 1);
        assert_eq!(summary.status_breakdown.warning, 1);
        assert_eq!(summary.status_breakdown.unknown, 1);
        assert_eq!(summary.status_breakdown.critical, 0);
    }

    #[test]
    fn test_facets_empty_state_means_no_narrowing() {
        let svc = service(vec![station("A")], vec![]);
        let facets = svc.facets(Some("  "));
        assert_eq!(facets.states, vec!["Uttar Pradesh"]);
        assert_eq!(facets.districts, vec!["Varanasi"]);
    }

    #[test]
    fn test_fleet_summary_empty_snapshot() {
        let svc = service(vec![], vec![]);
        let summary = svc.fleet_summary();
        assert_eq!(summary.total_stations, 0);
        assert_eq!(summary.average_level_m, 0.0);
    }
}

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::classifier::classify;
use crate::filter::{filter_alert_stations, AlertCriteria, AlertSeverity};
use crate::store::DataSnapshot;

/// One alert entry: a station whose history crossed a threshold, with its
/// current derived state attached
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AlertSummary {
    pub id: String,
    pub name: String,
    pub district: String,
    pub state: String,
    pub severity: AlertSeverity,
    pub current_level_m: Option<f64>,
    pub status: crate::classifier::Status,
    #[schema(value_type = Option<String>)]
    pub last_updated: Option<DateTime<Utc>>,
    pub reading_count: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AlertListResponse {
    /// Matching alerts before the limit is applied
    pub total_alerts: usize,
    pub alerts: Vec<AlertSummary>,
}

/// Alert list over the historical threshold predicate. The dashboard widget
/// requests the top 5; the alerts page requests everything.
#[derive(Clone)]
pub struct AlertService {
    snapshot: DataSnapshot,
}

impl AlertService {
    pub fn new(snapshot: DataSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn list_alerts(&self, criteria: &AlertCriteria, limit: Option<usize>) -> AlertListResponse {
        let matched = filter_alert_stations(&self.snapshot, criteria);
        let total_alerts = matched.len();

        let alerts = matched
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|(station, severity)| {
                let latest = self.snapshot.find_latest(&station.id);
                let current_level = latest.map(|r| r.water_level_m);
                AlertSummary {
                    id: station.id.clone(),
                    name: station.name.clone(),
                    district: station.district.clone(),
                    state: station.state.clone(),
                    severity,
                    current_level_m: current_level,
                    status: classify(current_level),
                    last_updated: latest.map(|r| r.timestamp),
                    reading_count: self.snapshot.reading_count(&station.id),
                }
            })
            .collect();

        AlertListResponse {
            total_alerts,
            alerts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Status;
    use crate::store::{Reading, Station};
    use chrono::TimeZone;

    fn station(id: &str, state: &str) -> Station {
        Station {
            id: id.to_string(),
            name: format!("{} Station", id),
            district: "Patna".to_string(),
            state: state.to_string(),
            lat: 25.6,
            lon: 85.1,
        }
    }

    fn reading(station_id: &str, day: u32, level: f64) -> Reading {
        Reading {
            station_id: station_id.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, day, 6, 0, 0).unwrap(),
            water_level_m: level,
        }
    }

    fn service() -> AlertService {
        AlertService::new(DataSnapshot::new(
            vec![
                station("A", "Bihar"),
                station("B", "Bihar"),
                station("C", "Odisha"),
                station("D", "Odisha"),
            ],
            vec![
                reading("A", 1, 10.5),
                reading("A", 2, 10.7),
                reading("B", 1, 11.5),
                reading("C", 1, 10.9),
                // D never crosses a threshold
                reading("D", 1, 12.5),
            ],
        ))
    }

    #[test]
    fn test_list_alerts_all() {
        let response = service().list_alerts(&AlertCriteria::default(), None);
        assert_eq!(response.total_alerts, 3);
        let ids: Vec<&str> = response.alerts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(response.alerts[0].severity, AlertSeverity::Critical);
        assert_eq!(response.alerts[1].severity, AlertSeverity::Warning);
    }

    #[test]
    fn test_list_alerts_attaches_current_state() {
        let response = service().list_alerts(&AlertCriteria::default(), None);
        let a = &response.alerts[0];
        assert_eq!(a.current_level_m, Some(10.7));
        assert_eq!(a.status, Status::Critical);
        assert_eq!(a.reading_count, 2);
        assert!(a.last_updated.is_some());
    }

    #[test]
    fn test_list_alerts_limit_keeps_total() {
        let response = service().list_alerts(&AlertCriteria::default(), Some(2));
        assert_eq!(response.total_alerts, 3);
        assert_eq!(response.alerts.len(), 2);
    }

    #[test]
    fn test_list_alerts_with_location_criteria() {
        let criteria = AlertCriteria {
            state: Some("Odisha".to_string()),
            ..Default::default()
        };
        let response = service().list_alerts(&criteria, None);
        assert_eq!(response.total_alerts, 1);
        assert_eq!(response.alerts[0].id, "C");
    }
}

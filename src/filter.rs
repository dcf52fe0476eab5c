use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::classifier::{classify, Status, CRITICAL_THRESHOLD_M, WARNING_THRESHOLD_M};
use crate::store::{DataSnapshot, Reading, Station};

/// Assumed sampling rate for the fixed-count window strategy
pub const READINGS_PER_DAY: usize = 4;

/// Criteria for the station list. All optional, combined with AND; an empty
/// string is "no constraint", not "match empty".
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    pub state: Option<String>,
    pub district: Option<String>,
    pub search: Option<String>,
    pub status: Option<Status>,
}

impl FilterCriteria {
    /// Build criteria from raw query values. Empty strings collapse to no
    /// constraint; an unrecognized status is an error for the caller to map.
    pub fn from_raw(
        state: Option<String>,
        district: Option<String>,
        search: Option<String>,
        status: Option<String>,
    ) -> Result<Self, String> {
        let status = match non_empty(status) {
            Some(raw) => Some(raw.parse::<Status>()?),
            None => None,
        };
        Ok(Self {
            state: non_empty(state),
            district: non_empty(district),
            search: non_empty(search),
            status,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Narrow the station list by the given criteria, preserving input order.
pub fn filter_stations<'a>(
    snapshot: &'a DataSnapshot,
    criteria: &FilterCriteria,
) -> Vec<&'a Station> {
    snapshot
        .stations()
        .iter()
        .filter(|station| {
            matches_location(station, &criteria.state, &criteria.district, &criteria.search)
                && criteria.status.map_or(true, |wanted| {
                    classify(snapshot.latest_level(&station.id)) == wanted
                })
        })
        .collect()
}

fn matches_location(
    station: &Station,
    state: &Option<String>,
    district: &Option<String>,
    search: &Option<String>,
) -> bool {
    if let Some(state) = state {
        if station.state != *state {
            return false;
        }
    }
    if let Some(district) = district {
        if station.district != *district {
            return false;
        }
    }
    if let Some(search) = search {
        let term = search.to_lowercase();
        let hit = station.name.to_lowercase().contains(&term)
            || station.district.to_lowercase().contains(&term)
            || station.state.to_lowercase().contains(&term);
        if !hit {
            return false;
        }
    }
    true
}

/// Two-level severity for the alerts view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Critical,
    Warning,
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertSeverity::Critical => write!(f, "critical"),
            AlertSeverity::Warning => write!(f, "warning"),
        }
    }
}

impl FromStr for AlertSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "critical" => Ok(AlertSeverity::Critical),
            "warning" => Ok(AlertSeverity::Warning),
            other => Err(format!("unrecognized severity '{}'", other)),
        }
    }
}

/// Criteria for the alerts view
#[derive(Debug, Clone, Default)]
pub struct AlertCriteria {
    pub state: Option<String>,
    pub district: Option<String>,
    pub search: Option<String>,
    pub severity: Option<AlertSeverity>,
}

impl AlertCriteria {
    pub fn from_raw(
        state: Option<String>,
        district: Option<String>,
        search: Option<String>,
        severity: Option<String>,
    ) -> Result<Self, String> {
        let severity = match non_empty(severity) {
            Some(raw) => Some(raw.parse::<AlertSeverity>()?),
            None => None,
        };
        Ok(Self {
            state: non_empty(state),
            district: non_empty(district),
            search: non_empty(search),
            severity,
        })
    }
}

/// Severity of a station for the alerts view, scanning the full reading
/// history rather than just the latest value. A station counts as critical if
/// any reading ever dipped below the critical line, and as warning if any
/// reading fell in the warning band and none below the critical line. This is
/// a different predicate from the latest-reading status used by
/// [`filter_stations`] and the two are intentionally not unified.
pub fn alert_severity(readings: &[&Reading]) -> Option<AlertSeverity> {
    let has_critical = readings
        .iter()
        .any(|r| r.water_level_m < CRITICAL_THRESHOLD_M);
    let has_warning = readings
        .iter()
        .any(|r| r.water_level_m >= CRITICAL_THRESHOLD_M && r.water_level_m < WARNING_THRESHOLD_M);

    if has_critical {
        Some(AlertSeverity::Critical)
    } else if has_warning {
        Some(AlertSeverity::Warning)
    } else {
        None
    }
}

/// Stations whose reading history crosses a threshold, narrowed by criteria.
/// No severity constraint means "critical or warning". Order preserved.
pub fn filter_alert_stations<'a>(
    snapshot: &'a DataSnapshot,
    criteria: &AlertCriteria,
) -> Vec<(&'a Station, AlertSeverity)> {
    snapshot
        .stations()
        .iter()
        .filter_map(|station| {
            let severity = alert_severity(&snapshot.readings_for(&station.id))?;
            if let Some(wanted) = criteria.severity {
                if severity != wanted {
                    return None;
                }
            }
            if !matches_location(station, &criteria.state, &criteria.district, &criteria.search) {
                return None;
            }
            Some((station, severity))
        })
        .collect()
}

/// Named sub-range of a station's reading history
#[derive(Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
pub enum TimeWindow {
    SevenDays,
    ThirtyDays,
    ThreeMonths,
    SixMonths,
    OneYear,
    Season,
}

impl TimeWindow {
    /// Window length in days; `None` for the season window, which selects by
    /// calendar month instead.
    pub fn days(&self) -> Option<i64> {
        match self {
            TimeWindow::SevenDays => Some(7),
            TimeWindow::ThirtyDays => Some(30),
            TimeWindow::ThreeMonths => Some(90),
            TimeWindow::SixMonths => Some(180),
            TimeWindow::OneYear => Some(365),
            TimeWindow::Season => None,
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TimeWindow::SevenDays => "7days",
            TimeWindow::ThirtyDays => "30days",
            TimeWindow::ThreeMonths => "3months",
            TimeWindow::SixMonths => "6months",
            TimeWindow::OneYear => "1year",
            TimeWindow::Season => "season",
        };
        write!(f, "{}", text)
    }
}

impl FromStr for TimeWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "7days" => Ok(TimeWindow::SevenDays),
            "30days" => Ok(TimeWindow::ThirtyDays),
            "3months" => Ok(TimeWindow::ThreeMonths),
            "6months" => Ok(TimeWindow::SixMonths),
            "1year" => Ok(TimeWindow::OneYear),
            "season" => Ok(TimeWindow::Season),
            other => Err(format!("unrecognized window '{}'", other)),
        }
    }
}

/// How a day-based window is applied. The dashboard variants disagreed on
/// this, so both are kept as named strategies and configuration picks one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowStrategy {
    /// Last N readings by position, N = days x assumed sampling rate
    FixedCount,
    /// Readings within the day range, anchored at the newest reading
    DateRange,
}

impl fmt::Display for WindowStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowStrategy::FixedCount => write!(f, "fixed-count"),
            WindowStrategy::DateRange => write!(f, "date-range"),
        }
    }
}

impl FromStr for WindowStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed-count" => Ok(WindowStrategy::FixedCount),
            "date-range" => Ok(WindowStrategy::DateRange),
            other => Err(format!("unrecognized window strategy '{}'", other)),
        }
    }
}

/// Inclusive month range for the season window. Wraps across the year end
/// when `start_month > end_month`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonRange {
    pub start_month: u32,
    pub end_month: u32,
}

impl Default for SeasonRange {
    fn default() -> Self {
        // June through September; regional variants use March-June instead,
        // which is why this is configuration and not a constant at use sites
        Self {
            start_month: 6,
            end_month: 9,
        }
    }
}

impl SeasonRange {
    pub fn new(start_month: u32, end_month: u32) -> Result<Self, String> {
        if !(1..=12).contains(&start_month) || !(1..=12).contains(&end_month) {
            return Err(format!(
                "season months must be 1-12, got {}-{}",
                start_month, end_month
            ));
        }
        Ok(Self {
            start_month,
            end_month,
        })
    }

    pub fn contains(&self, month: u32) -> bool {
        if self.start_month <= self.end_month {
            (self.start_month..=self.end_month).contains(&month)
        } else {
            month >= self.start_month || month <= self.end_month
        }
    }
}

/// Apply a named window to an ascending reading list.
pub fn window_readings<'a>(
    readings: &[&'a Reading],
    window: TimeWindow,
    strategy: WindowStrategy,
    season: SeasonRange,
) -> Vec<&'a Reading> {
    let days = match window.days() {
        Some(days) => days,
        None => {
            return readings
                .iter()
                .filter(|r| season.contains(r.timestamp.month()))
                .copied()
                .collect();
        }
    };

    match strategy {
        WindowStrategy::FixedCount => {
            let wanted = days as usize * READINGS_PER_DAY;
            let skip = readings.len().saturating_sub(wanted);
            readings[skip..].to_vec()
        }
        WindowStrategy::DateRange => match readings.last() {
            Some(newest) => {
                let cutoff = newest.timestamp - Duration::days(days);
                readings
                    .iter()
                    .filter(|r| r.timestamp >= cutoff)
                    .copied()
                    .collect()
            }
            None => Vec::new(),
        },
    }
}

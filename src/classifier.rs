use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Water level below this depth is critical (meters)
pub const CRITICAL_THRESHOLD_M: f64 = 11.0;
/// Water level below this depth (but at or above the critical line) is a warning (meters)
pub const WARNING_THRESHOLD_M: f64 = 12.0;

/// Derived classification of a station's water level against the fixed thresholds.
///
/// Never stored; recomputed from the latest reading on every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Status {
    Critical,
    Warning,
    Normal,
    Unknown,
}

impl Status {
    /// Fixed display color associated with each status
    pub fn color(&self) -> &'static str {
        match self {
            Status::Critical => "#ff4757",
            Status::Warning => "#ffa502",
            Status::Normal => "#2ed573",
            Status::Unknown => "#666666",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Status::Critical => "Critical",
            Status::Warning => "Warning",
            Status::Normal => "Normal",
            Status::Unknown => "Unknown",
        };
        write!(f, "{}", text)
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "critical" => Ok(Status::Critical),
            "warning" => Ok(Status::Warning),
            "normal" => Ok(Status::Normal),
            "unknown" => Ok(Status::Unknown),
            other => Err(format!("unrecognized status '{}'", other)),
        }
    }
}

/// Classify a water level measurement against the fixed thresholds.
///
/// Total over all inputs: a missing level is `Unknown`, never an error.
pub fn classify(level_m: Option<f64>) -> Status {
    match level_m {
        None => Status::Unknown,
        Some(level) if level < CRITICAL_THRESHOLD_M => Status::Critical,
        Some(level) if level < WARNING_THRESHOLD_M => Status::Warning,
        Some(_) => Status::Normal,
    }
}

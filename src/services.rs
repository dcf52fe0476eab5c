pub mod alert_service;
pub mod station_service;

pub use alert_service::AlertService;
pub use station_service::StationService;

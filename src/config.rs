use std::env;

use crate::filter::{SeasonRange, WindowStrategy};

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub stations_url: String,
    pub readings_url: String,
    pub window_strategy: WindowStrategy,
    pub season: SeasonRange,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            stations_url: env::var("STATIONS_URL")?,
            readings_url: env::var("READINGS_URL")?,
            window_strategy: env::var("WINDOW_STRATEGY")
                .unwrap_or_else(|_| "fixed-count".to_string())
                .parse()
                .unwrap_or(WindowStrategy::FixedCount),
            season: SeasonRange::new(
                env::var("SEASON_START_MONTH")
                    .unwrap_or_else(|_| "6".to_string())
                    .parse()
                    .unwrap_or(6),
                env::var("SEASON_END_MONTH")
                    .unwrap_or_else(|_| "9".to_string())
                    .parse()
                    .unwrap_or(9),
            )
            .unwrap_or_default(),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

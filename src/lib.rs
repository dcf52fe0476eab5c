pub mod api;
pub mod classifier;
pub mod config;
pub mod fetch_error;
pub mod fetcher;
pub mod filter;
pub mod services;
pub mod store;

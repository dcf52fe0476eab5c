use tower_http::trace::TraceLayer;
use tracing::{info, instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use groundwater_monitor_service::api::{create_router, AppState};
use groundwater_monitor_service::config::Config;
use groundwater_monitor_service::fetcher::SnapshotFetcher;
use groundwater_monitor_service::services::{AlertService, StationService};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing with environment filter support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,groundwater_monitor_service=debug")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;
    info!("Starting groundwater monitor service with config: {:?}", config);

    // Load the data snapshot: both collections fetched concurrently, and the
    // server only starts once both are in (never serve a partial load)
    info!("Loading station and reading collections...");
    let fetcher = SnapshotFetcher::new(config.stations_url.clone(), config.readings_url.clone());
    let snapshot = fetcher.fetch_snapshot().await?;
    info!(
        "Snapshot loaded at {}: {} stations, {} readings",
        snapshot.loaded_at(),
        snapshot.stations().len(),
        snapshot.readings().len()
    );

    // Create services
    let station_service =
        StationService::new(snapshot.clone(), config.window_strategy, config.season);
    let alert_service = AlertService::new(snapshot);

    // Create API router
    let app_state = AppState {
        station_service,
        alert_service,
    };
    let app = create_router(app_state).layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.server_addr();
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

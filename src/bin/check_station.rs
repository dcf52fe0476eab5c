use clap::Parser;

use groundwater_monitor_service::fetcher::SnapshotFetcher;
use groundwater_monitor_service::filter::{alert_severity, SeasonRange, TimeWindow, WindowStrategy};
use groundwater_monitor_service::services::StationService;

#[derive(Parser)]
#[command(name = "check-station")]
#[command(about = "Inspect one station's derived state from the live data files", long_about = None)]
struct Cli {
    /// Station ID to check
    station_id: String,

    /// URL of the stations collection
    #[arg(long, env)]
    stations_url: String,

    /// URL of the water-level readings collection
    #[arg(long, env)]
    readings_url: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let fetcher = SnapshotFetcher::new(cli.stations_url, cli.readings_url);
    let snapshot = fetcher.fetch_snapshot().await?;

    println!("Checking station {}...\n", cli.station_id);

    let severity = alert_severity(&snapshot.readings_for(&cli.station_id));
    let service = StationService::new(
        snapshot,
        WindowStrategy::FixedCount,
        SeasonRange::default(),
    );

    let detail = match service.get_station_detail(&cli.station_id) {
        Some(detail) => detail,
        None => {
            eprintln!("Station {} not found", cli.station_id);
            std::process::exit(1);
        }
    };

    println!("{} ({}, {})", detail.name, detail.district, detail.state);
    println!("  Location:      {:.4}, {:.4}", detail.lat, detail.lon);
    match detail.current_level_m {
        Some(level) => println!("  Current level: {:.2}m ({})", level, detail.status),
        None => println!("  Current level: no readings ({})", detail.status),
    }
    println!("  Trend:         {:?}", detail.trend);
    println!("  Readings:      {}", detail.reading_count);
    if let Some(updated) = detail.last_updated {
        println!("  Last updated:  {}", updated);
    }
    match severity {
        Some(severity) => println!("  Alert:         {} (historical threshold crossing)", severity),
        None => println!("  Alert:         none"),
    }

    println!("\nRecent readings:");
    for point in &detail.recent_readings {
        println!(
            "  {}: {:.2}m ({})",
            point.timestamp, point.water_level_m, point.status
        );
    }

    if let Some(history) = service.get_reading_history(&cli.station_id, TimeWindow::ThirtyDays) {
        let stats = &history.statistics;
        println!(
            "\n30-day window: {} readings, min {:.2}m, max {:.2}m, mean {:.2}m",
            stats.count, stats.min, stats.max, stats.mean
        );
    }

    Ok(())
}

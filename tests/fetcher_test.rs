// Tests for the snapshot fetcher against a mock upstream

use groundwater_monitor_service::fetch_error::FetchError;
use groundwater_monitor_service::fetcher::SnapshotFetcher;

const STATIONS_BODY: &str = include_str!("fixtures/stations.json");
const READINGS_BODY: &str = include_str!("fixtures/waterlevels.json");

fn fetcher_for(server: &mockito::Server) -> SnapshotFetcher {
    SnapshotFetcher::new(
        format!("{}/data/stations.json", server.url()),
        format!("{}/data/waterlevels.json", server.url()),
    )
}

#[tokio::test]
async fn test_fetch_snapshot_success() {
    let mut server = mockito::Server::new_async().await;

    let stations_mock = server
        .mock("GET", "/data/stations.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(STATIONS_BODY)
        .create_async()
        .await;
    let readings_mock = server
        .mock("GET", "/data/waterlevels.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(READINGS_BODY)
        .create_async()
        .await;

    let snapshot = fetcher_for(&server).fetch_snapshot().await.unwrap();

    assert_eq!(snapshot.stations().len(), 4);
    assert_eq!(snapshot.readings().len(), 7);
    assert_eq!(snapshot.reading_count("GW001"), 3);

    stations_mock.assert_async().await;
    readings_mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_snapshot_upstream_error_status() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("GET", "/data/stations.json")
        .with_status(500)
        .with_body("upstream broke")
        .create_async()
        .await;
    server
        .mock("GET", "/data/waterlevels.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(READINGS_BODY)
        .create_async()
        .await;

    let result = fetcher_for(&server).fetch_snapshot().await;

    match result {
        Err(FetchError::Status { status, url }) => {
            assert_eq!(status.as_u16(), 500);
            assert!(url.ends_with("/data/stations.json"));
        }
        other => panic!("Expected status error, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_fetch_readings_malformed_body() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("GET", "/data/waterlevels.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"not": "an array"}"#)
        .create_async()
        .await;

    let fetcher = SnapshotFetcher::new(
        format!("{}/data/stations.json", server.url()),
        format!("{}/data/waterlevels.json", server.url()),
    );
    let result = fetcher.fetch_readings().await;

    match result {
        Err(FetchError::Decode { collection, .. }) => assert_eq!(collection, "readings"),
        other => panic!("Expected decode error, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_fetch_stations_bad_timestamp_in_readings_is_rejected() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("GET", "/data/waterlevels.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[{ "station_id": "GW001", "timestamp": "yesterday", "water_level_m": 10.5 }]"#,
        )
        .create_async()
        .await;

    let fetcher = SnapshotFetcher::new(
        format!("{}/data/stations.json", server.url()),
        format!("{}/data/waterlevels.json", server.url()),
    );
    let result = fetcher.fetch_readings().await;

    assert!(matches!(result, Err(FetchError::Decode { .. })));
}

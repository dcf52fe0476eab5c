use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use crate::fetch_error::FetchError;
use crate::store::{DataSnapshot, Reading, Station};

/// Fetches the two static JSON collections that form the system's entire
/// input boundary.
#[derive(Clone)]
pub struct SnapshotFetcher {
    client: reqwest::Client,
    stations_url: String,
    readings_url: String,
}

impl SnapshotFetcher {
    pub fn new(stations_url: String, readings_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            stations_url,
            readings_url,
        }
    }

    #[instrument(skip(self), fields(url = %self.stations_url))]
    pub async fn fetch_stations(&self) -> Result<Vec<Station>, FetchError> {
        self.fetch_collection("stations", &self.stations_url).await
    }

    #[instrument(skip(self), fields(url = %self.readings_url))]
    pub async fn fetch_readings(&self) -> Result<Vec<Reading>, FetchError> {
        self.fetch_collection("readings", &self.readings_url).await
    }

    /// Fetch both collections and assemble the immutable snapshot.
    ///
    /// The two GETs are independent and run concurrently; aggregation never
    /// sees a partial load because either failure aborts the whole join.
    #[instrument(skip(self))]
    pub async fn fetch_snapshot(&self) -> Result<DataSnapshot, FetchError> {
        let (stations, readings) = tokio::try_join!(self.fetch_stations(), self.fetch_readings())?;
        info!(
            "Loaded snapshot: {} stations, {} readings",
            stations.len(),
            readings.len()
        );
        Ok(DataSnapshot::new(stations, readings))
    }

    async fn fetch_collection<T: DeserializeOwned>(
        &self,
        collection: &'static str,
        url: &str,
    ) -> Result<Vec<T>, FetchError> {
        debug!("Sending HTTP request for {} collection", collection);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        debug!("Received HTTP response with status: {}", status);

        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        debug!("Retrieved body for {}, size: {} bytes", collection, body.len());

        let records: Vec<T> = serde_json::from_str(&body).map_err(|e| FetchError::Decode {
            collection,
            message: e.to_string(),
        })?;
        debug!("Decoded {} {} records", records.len(), collection);
        Ok(records)
    }
}

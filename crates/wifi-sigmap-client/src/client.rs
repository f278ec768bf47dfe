//! Async client for the scan backend.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::warn;

use wifi_sigmap_core::{Emitter, GpsFix, SnapshotBundle};

use crate::dto::{
    DistanceStrengthResponse, SaveGpsRequest, ScanResponse, SnapshotBundleDto,
};
use crate::error::ClientError;

/// Per-request timeout. A slow backend must not stall the frame loop
/// for longer than this.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for the scan backend.
///
/// All calls are async and non-blocking. The `try_*` helpers implement
/// the fire-and-continue contract: failures are logged and downgraded
/// to `None` so the caller falls back to last-known state.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for a backend base URL such as
    /// `http://127.0.0.1:8000`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// The normalized backend base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET /api/wifi`: the current live scan.
    pub async fn fetch_scan(&self) -> Result<ScanResponse, ClientError> {
        let body = self
            .http
            .get(self.url("/api/wifi"))
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        decode(&body)
    }

    /// `POST /api/save_gps`: submit the observer's position. The
    /// acknowledgement body is ignored.
    pub async fn save_gps(&self, fix: GpsFix) -> Result<(), ClientError> {
        self.http
            .post(self.url("/api/save_gps"))
            .json(&SaveGpsRequest {
                lat: fix.lat,
                lon: fix.lon,
            })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// `GET /api/data`: the stored original and synthetic snapshots.
    pub async fn fetch_data(&self) -> Result<SnapshotBundleDto, ClientError> {
        let body = self
            .http
            .get(self.url("/api/data"))
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        decode(&body)
    }

    /// `POST /api/generate_copies`: ask the backend to regenerate the
    /// two synthetic snapshots. No body is consumed.
    pub async fn generate_copies(&self) -> Result<(), ClientError> {
        self.http
            .post(self.url("/api/generate_copies"))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// `GET /api/distance_strength` (or the all-clients variant): the
    /// distance/strength scatter points.
    pub async fn fetch_distance_strength(
        &self,
        all_clients: bool,
    ) -> Result<DistanceStrengthResponse, ClientError> {
        let path = if all_clients {
            "/api/all_distance_strength"
        } else {
            "/api/distance_strength"
        };
        let body = self
            .http
            .get(self.url(path))
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        decode(&body)
    }

    // ------------------------------------------------------------------
    // Fire-and-continue helpers for the frame loop
    // ------------------------------------------------------------------

    /// Fetch the live scan, or `None` on any failure.
    pub async fn try_fetch_scan(&self) -> Option<Vec<Emitter>> {
        match self.fetch_scan().await {
            Ok(scan) => Some(scan.into_emitters()),
            Err(error) => {
                warn!(%error, "scan fetch failed; keeping last snapshot");
                None
            }
        }
    }

    /// Fetch and assemble a complete snapshot bundle, or `None` when
    /// the fetch fails or fewer than three snapshots are stored.
    pub async fn try_fetch_bundle(&self) -> Option<SnapshotBundle> {
        match self.fetch_data().await {
            Ok(dto) => dto.into_bundle(),
            Err(error) => {
                warn!(%error, "snapshot bundle fetch failed");
                None
            }
        }
    }

    /// Submit a GPS fix, ignoring failures.
    pub async fn try_save_gps(&self, fix: GpsFix) {
        if let Err(error) = self.save_gps(fix).await {
            warn!(%error, "gps submission failed");
        }
    }
}

/// Decode a response body, mapping malformed JSON to
/// [`ClientError::Decode`].
fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ClientError> {
    Ok(serde_json::from_slice(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client = BackendClient::new("http://127.0.0.1:8000/").unwrap();
        assert_eq!(client.url("/api/wifi"), "http://127.0.0.1:8000/api/wifi");
    }

    #[test]
    fn malformed_body_reports_a_decode_error() {
        let result: Result<ScanResponse, ClientError> = decode(b"<html>busy</html>");
        assert!(matches!(result, Err(ClientError::Decode(_))));

        let ok: ScanResponse = decode(br#"{"networks": []}"#).unwrap();
        assert!(ok.networks.is_empty());
    }
}

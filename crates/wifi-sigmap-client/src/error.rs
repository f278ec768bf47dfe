//! Error types for the backend client.

use thiserror::Error;

/// Errors that can occur talking to the scan backend.
///
/// The frame loop downgrades every variant to a missing value and
/// carries on with last-known state.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP request failed (connection, timeout, or status error).
    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be decoded into the expected shape.
    #[error("backend response decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}

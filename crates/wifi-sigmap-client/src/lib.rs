//! # wifi-sigmap-client
//!
//! Async HTTP client for the external scan backend consumed by the
//! wifi-sigmap engine. The backend performs the actual wireless
//! scanning and stores the real plus synthetic vantage snapshots; this
//! crate only speaks its JSON wire shapes and converts them into core
//! domain types.
//!
//! Fetches are fire-and-continue: a failed or slow request is logged
//! and reported as a missing value, never as a fatal error.

#![warn(missing_docs)]

pub mod client;
pub mod dto;
pub mod error;

pub use client::BackendClient;
pub use dto::{
    DistanceStrengthPointDto, DistanceStrengthResponse, GpsFixDto, NetworkDto, ScanResponse,
    SnapshotBundleDto,
};
pub use error::ClientError;

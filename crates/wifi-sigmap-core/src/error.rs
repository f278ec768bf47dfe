//! Error types for the wifi-sigmap-core crate.

use thiserror::Error;

/// Errors that can occur in the localization and layout engine.
#[derive(Debug, Clone, Error)]
pub enum SigmapError {
    /// The BSSID MAC address bytes are invalid (must be exactly 6 bytes).
    #[error("invalid MAC address: expected 6 bytes, got {len}")]
    InvalidMac {
        /// The number of bytes that were provided.
        len: usize,
    },

    /// Failed to parse a MAC address string (expected `aa:bb:cc:dd:ee:ff`).
    #[error("failed to parse MAC address from '{input}': expected aa:bb:cc:dd:ee:ff")]
    MacParseFailed {
        /// The input string that could not be parsed.
        input: String,
    },

    /// A rolling analysis run is already collecting samples.
    #[error("a rolling analysis is already collecting; wait for it to finish or cancel it")]
    AnalysisInProgress,

    /// An obstacle attenuation factor is outside the open interval (0, 1).
    #[error("obstacle attenuation {value} is outside (0, 1)")]
    AttenuationOutOfRange {
        /// The invalid attenuation factor.
        value: f64,
    },
}

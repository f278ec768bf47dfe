//! RSSI to distance conversion via the log-distance path loss model.
//!
//! `d = 10 ^ ((P0 - RSSI) / (10 * n))` where `P0` is the reference RSSI
//! at one meter and `n` is the path loss exponent, both band-dependent.
//! The estimates are rough and intended for visualization, not ranging.

use serde::{Deserialize, Serialize};

use crate::domain::{Band, Emitter, EmitterId};

/// Band-specific constants for the log-distance path loss model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathLossParams {
    /// Reference RSSI at one meter, in dBm.
    pub reference_rssi_1m: f64,
    /// Path loss exponent (environment-dependent; ~2 free space, 2.5-4 indoor).
    pub exponent: f64,
}

/// Indoor 2.4 GHz constants; also the fallback for unknown bands.
pub const PATH_LOSS_2_4GHZ: PathLossParams = PathLossParams {
    reference_rssi_1m: -40.0,
    exponent: 2.2,
};

/// Indoor 5 GHz constants. 5 GHz attenuates faster through air and walls.
pub const PATH_LOSS_5GHZ: PathLossParams = PathLossParams {
    reference_rssi_1m: -47.0,
    exponent: 2.7,
};

/// Lower clamp on estimated distance, in meters.
pub const MIN_DISTANCE_M: f64 = 0.5;

/// Upper clamp on estimated distance, in meters.
pub const MAX_DISTANCE_M: f64 = 100.0;

/// The path loss constants for a band. Unknown bands fall back to the
/// 2.4 GHz row.
pub fn params_for(band: Band) -> PathLossParams {
    match band {
        Band::Band5GHz => PATH_LOSS_5GHZ,
        Band::Band2_4GHz | Band::Unknown => PATH_LOSS_2_4GHZ,
    }
}

/// Estimate the distance to an emitter in meters from its RSSI.
///
/// Pure and deterministic. The result is clamped to
/// [`MIN_DISTANCE_M`, `MAX_DISTANCE_M`] so extreme signal values cannot
/// produce degenerate outputs.
pub fn estimate_distance(rssi_dbm: f64, band: Band) -> f64 {
    let params = params_for(band);
    let d = 10f64.powf((params.reference_rssi_1m - rssi_dbm) / (10.0 * params.exponent));
    d.clamp(MIN_DISTANCE_M, MAX_DISTANCE_M)
}

/// One point of the distance/strength scatter view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceStrengthPoint {
    /// Network name, if broadcast.
    pub ssid: Option<String>,
    /// Hardware address of the emitter.
    pub bssid: EmitterId,
    /// Frequency band.
    pub band: Band,
    /// Raw RSSI in dBm.
    pub rssi: f64,
    /// Estimated distance in meters.
    pub distance: f64,
}

/// Map live networks to (distance, strength) points, sorted by distance
/// ascending for plotting.
pub fn prepare_distance_strength(networks: &[Emitter]) -> Vec<DistanceStrengthPoint> {
    let mut points: Vec<DistanceStrengthPoint> = networks
        .iter()
        .map(|n| DistanceStrengthPoint {
            ssid: n.ssid.clone(),
            bssid: n.id,
            band: n.band,
            rssi: n.rssi_dbm as f64,
            distance: estimate_distance(n.rssi_dbm as f64, n.band),
        })
        .collect();
    points.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    points
}

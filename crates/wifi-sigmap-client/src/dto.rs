//! Wire shapes for the scan backend's JSON endpoints.
//!
//! Field names match the backend exactly; conversions into core domain
//! types live here so the engine never sees raw wire data. Entries the
//! backend sends without a usable hardware address or signal reading
//! are skipped rather than rejected.

use serde::{Deserialize, Serialize};

use wifi_sigmap_core::{percent_to_rssi, Band, Emitter, EmitterId, GpsFix, SnapshotBundle};

/// One network entry from `/api/wifi` or a stored snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkDto {
    /// Hardware address string, `aa:bb:cc:dd:ee:ff`.
    pub bssid: String,
    /// Network name; absent or empty for hidden networks.
    #[serde(default)]
    pub ssid: Option<String>,
    /// Band label, `"2.4 GHz"` / `"5 GHz"`.
    #[serde(default)]
    pub band: Option<String>,
    /// Raw RSSI in dBm.
    #[serde(default)]
    pub rssi: Option<i32>,
    /// Windows-style signal percentage, fallback when `rssi` is absent.
    #[serde(default)]
    pub signal_percent: Option<u32>,
    /// 802.11 channel number, fallback when `band` is absent.
    #[serde(default)]
    pub channel: Option<u32>,
    /// Reported 802.11 standard label.
    #[serde(default)]
    pub wifi_standard: Option<String>,
    /// Authentication label.
    #[serde(default)]
    pub auth: Option<String>,
    /// Encryption label; some backend variants send this instead of `auth`.
    #[serde(default)]
    pub encryption: Option<String>,
}

impl NetworkDto {
    /// Convert into a domain emitter.
    ///
    /// Returns `None` when the hardware address does not parse or no
    /// signal reading is available at all.
    pub fn into_emitter(self) -> Option<Emitter> {
        let id = EmitterId::parse(&self.bssid).ok()?;
        let rssi_dbm = match (self.rssi, self.signal_percent) {
            (Some(rssi), _) => rssi,
            (None, Some(percent)) => percent_to_rssi(percent),
            (None, None) => return None,
        };

        let band = match self.band.as_deref() {
            Some(label) => Band::parse_label(label),
            None => self.channel.map(Band::from_channel).unwrap_or_default(),
        };

        Some(Emitter {
            id,
            ssid: self.ssid.filter(|s| !s.is_empty()),
            band,
            rssi_dbm,
            standard: self.wifi_standard,
            auth: self.auth.or(self.encryption),
        })
    }
}

/// Response shape of `/api/wifi` and of each stored `wifi_*` snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanResponse {
    /// The observed networks.
    #[serde(default)]
    pub networks: Vec<NetworkDto>,
}

impl ScanResponse {
    /// Convert every parseable entry into a domain emitter.
    pub fn into_emitters(self) -> Vec<Emitter> {
        self.networks
            .into_iter()
            .filter_map(NetworkDto::into_emitter)
            .collect()
    }
}

/// A stored GPS fix, `{lat, lon}` plus an ignored label.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GpsFixDto {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
}

impl From<GpsFixDto> for GpsFix {
    fn from(dto: GpsFixDto) -> Self {
        Self {
            lat: dto.lat,
            lon: dto.lon,
        }
    }
}

/// Response shape of `/api/data`: the real observation plus two
/// synthetic copies of both the GPS fix and the scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotBundleDto {
    /// The real GPS fix.
    #[serde(default)]
    pub gps_original: Option<GpsFixDto>,
    /// First synthetic GPS fix.
    #[serde(default)]
    pub gps_copy1: Option<GpsFixDto>,
    /// Second synthetic GPS fix.
    #[serde(default)]
    pub gps_copy2: Option<GpsFixDto>,
    /// The real scan.
    #[serde(default)]
    pub wifi_original: Option<ScanResponse>,
    /// First synthetic scan.
    #[serde(default)]
    pub wifi_copy1: Option<ScanResponse>,
    /// Second synthetic scan.
    #[serde(default)]
    pub wifi_copy2: Option<ScanResponse>,
}

impl SnapshotBundleDto {
    /// Assemble a full vantage-point bundle.
    ///
    /// Returns `None` unless all three GPS fixes and all three scans
    /// are present; multilateration needs the complete set.
    pub fn into_bundle(self) -> Option<SnapshotBundle> {
        let fixes = [
            self.gps_original?.into(),
            self.gps_copy1?.into(),
            self.gps_copy2?.into(),
        ];
        let scans = [
            self.wifi_original?.into_emitters(),
            self.wifi_copy1?.into_emitters(),
            self.wifi_copy2?.into_emitters(),
        ];
        Some(SnapshotBundle { fixes, scans })
    }
}

/// Request body for `POST /api/save_gps`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SaveGpsRequest {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
}

/// One point from `/api/distance_strength` or `/api/all_distance_strength`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceStrengthPointDto {
    /// Network name.
    #[serde(default)]
    pub ssid: Option<String>,
    /// Hardware address string.
    pub bssid: String,
    /// Band label.
    #[serde(default)]
    pub band: Option<String>,
    /// Raw RSSI in dBm.
    pub rssi: f64,
    /// Backend-estimated distance in meters.
    pub distance: f64,
}

/// Response shape of the distance/strength scatter endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DistanceStrengthResponse {
    /// Scatter points, sorted by distance ascending.
    #[serde(default)]
    pub points: Vec<DistanceStrengthPointDto>,
}

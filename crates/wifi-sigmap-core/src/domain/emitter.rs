//! Core value objects for emitter identification and observation.
//!
//! An emitter is a discovered wireless access point, identified by its
//! hardware (MAC) address. Identity is stable across scan snapshots as
//! long as the access point stays visible.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::SigmapError;

// ---------------------------------------------------------------------------
// EmitterId -- Value Object
// ---------------------------------------------------------------------------

/// A unique emitter identifier wrapping a 6-byte IEEE 802.11 MAC address.
///
/// Two `EmitterId` values are equal when their MAC bytes match. The id is
/// the key into every per-emitter table in the engine (smoothed state,
/// layout angles, rolling windows, position cache).
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct EmitterId(pub [u8; 6]);

impl EmitterId {
    /// Create an `EmitterId` from a byte slice.
    ///
    /// Returns an error if the slice is not exactly 6 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SigmapError> {
        let arr: [u8; 6] = bytes
            .try_into()
            .map_err(|_| SigmapError::InvalidMac { len: bytes.len() })?;
        Ok(Self(arr))
    }

    /// Parse an `EmitterId` from a colon-separated hex string such as
    /// `"aa:bb:cc:dd:ee:ff"`.
    pub fn parse(s: &str) -> Result<Self, SigmapError> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 6 {
            return Err(SigmapError::MacParseFailed {
                input: s.to_owned(),
            });
        }

        let mut bytes = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            bytes[i] = u8::from_str_radix(part, 16).map_err(|_| SigmapError::MacParseFailed {
                input: s.to_owned(),
            })?;
        }
        Ok(Self(bytes))
    }

    /// Return the raw 6-byte MAC address.
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl fmt::Debug for EmitterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EmitterId({self})")
    }
}

impl fmt::Display for EmitterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl Serialize for EmitterId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EmitterId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = EmitterId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a MAC address string like aa:bb:cc:dd:ee:ff")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<EmitterId, E> {
                EmitterId::parse(v).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(IdVisitor)
    }
}

// ---------------------------------------------------------------------------
// Band -- Value Object
// ---------------------------------------------------------------------------

/// The WiFi frequency band on which an emitter operates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    /// 2.4 GHz (channels 1-14)
    Band2_4GHz,
    /// 5 GHz (channels 32-177)
    Band5GHz,
    /// Band could not be determined from the scan data.
    #[default]
    Unknown,
}

impl Band {
    /// Parse a band from the backend's human-readable label
    /// (`"2.4 GHz"` / `"5 GHz"`).
    pub fn parse_label(label: &str) -> Self {
        match label.trim() {
            "2.4 GHz" => Self::Band2_4GHz,
            "5 GHz" => Self::Band5GHz,
            _ => Self::Unknown,
        }
    }

    /// Infer the band from an 802.11 channel number.
    pub fn from_channel(channel: u32) -> Self {
        match channel {
            1..=14 => Self::Band2_4GHz,
            32..=177 => Self::Band5GHz,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Band2_4GHz => write!(f, "2.4 GHz"),
            Self::Band5GHz => write!(f, "5 GHz"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

// ---------------------------------------------------------------------------
// Emitter -- Entity
// ---------------------------------------------------------------------------

/// One observed access point from a scan snapshot.
///
/// The live set of emitters is replaced wholesale each time a snapshot
/// arrives; an emitter that is no longer observed drops out of the live
/// set while its smoothed and positional state persists in the engine's
/// caches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emitter {
    /// The hardware address identifying this access point.
    pub id: EmitterId,
    /// The network name. `None` for hidden networks.
    pub ssid: Option<String>,
    /// The frequency band.
    pub band: Band,
    /// Raw received signal strength in dBm, roughly -90 to -30.
    pub rssi_dbm: i32,
    /// The reported 802.11 standard label, e.g. `"WiFi 5/6"`.
    pub standard: Option<String>,
    /// The reported security/authentication label.
    pub auth: Option<String>,
}

/// Convert a Windows-style signal percentage to an approximate RSSI in dBm.
///
/// Empirical linear map: 0% is about -90 dBm, 100% about -30 dBm.
pub fn percent_to_rssi(percent: u32) -> i32 {
    let percent = percent.min(100) as i32;
    -90 + percent * 60 / 100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_mac() {
        let id = EmitterId::parse("aa:bb:cc:dd:ee:ff").unwrap();
        assert_eq!(id.as_bytes(), &[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        assert_eq!(id.to_string(), "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn parse_rejects_malformed_mac() {
        assert!(EmitterId::parse("aa:bb:cc").is_err());
        assert!(EmitterId::parse("zz:bb:cc:dd:ee:ff").is_err());
        assert!(EmitterId::from_bytes(&[1, 2, 3]).is_err());
    }

    #[test]
    fn emitter_id_serde_round_trip() {
        let id = EmitterId([0x01, 0x02, 0x03, 0x0a, 0x0b, 0x0c]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"01:02:03:0a:0b:0c\"");
        let back: EmitterId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn band_from_label_and_channel() {
        assert_eq!(Band::parse_label("2.4 GHz"), Band::Band2_4GHz);
        assert_eq!(Band::parse_label("5 GHz"), Band::Band5GHz);
        assert_eq!(Band::parse_label("60 GHz"), Band::Unknown);
        assert_eq!(Band::from_channel(6), Band::Band2_4GHz);
        assert_eq!(Band::from_channel(44), Band::Band5GHz);
        assert_eq!(Band::from_channel(200), Band::Unknown);
    }

    #[test]
    fn percent_maps_linearly_to_rssi() {
        assert_eq!(percent_to_rssi(0), -90);
        assert_eq!(percent_to_rssi(100), -30);
        assert_eq!(percent_to_rssi(50), -60);
        assert_eq!(percent_to_rssi(250), -30); // clamped
    }
}

//! Geographic to local planar projection.
//!
//! Vantage points arrive as GPS fixes; the solver works in a local
//! planar frame in meters. Over the few-meter spans involved an
//! equirectangular approximation is plenty.

use serde::{Deserialize, Serialize};

/// Meters per degree of latitude.
pub const METERS_PER_DEG_LAT: f64 = 111_320.0;

/// Equatorial circumference of the Earth in meters.
pub const EARTH_CIRCUMFERENCE_M: f64 = 40_075_000.0;

/// A geographic fix in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
}

/// Project `other` into the planar frame centered on `reference`.
///
/// Returns `(x, y)` in meters: x east along the longitude delta scaled
/// by the circumference at the reference latitude, y north along the
/// latitude delta.
pub fn planar_offset(reference: GpsFix, other: GpsFix) -> (f64, f64) {
    let meters_per_deg_lon = EARTH_CIRCUMFERENCE_M * reference.lat.to_radians().cos() / 360.0;
    let x = (other.lon - reference.lon) * meters_per_deg_lon;
    let y = (other.lat - reference.lat) * METERS_PER_DEG_LAT;
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_projects_to_origin() {
        let fix = GpsFix { lat: 48.2, lon: 16.4 };
        assert_eq!(planar_offset(fix, fix), (0.0, 0.0));
    }

    #[test]
    fn longitude_scale_at_equator() {
        let reference = GpsFix { lat: 0.0, lon: 0.0 };
        let east = GpsFix { lat: 0.0, lon: 0.001 };
        let (x, y) = planar_offset(reference, east);
        // One degree of longitude at the equator is ~111.32 km.
        assert!((x - 111.319444).abs() < 0.01, "got {x}");
        assert_eq!(y, 0.0);
    }

    #[test]
    fn longitude_scale_shrinks_with_latitude() {
        let reference = GpsFix { lat: 60.0, lon: 0.0 };
        let east = GpsFix { lat: 60.0, lon: 0.001 };
        let (x, _) = planar_offset(reference, east);
        // cos(60 deg) = 0.5, so half the equatorial scale.
        assert!((x - 55.659722).abs() < 0.01, "got {x}");
    }

    #[test]
    fn latitude_scale_is_constant() {
        let reference = GpsFix { lat: 60.0, lon: 0.0 };
        let north = GpsFix { lat: 60.001, lon: 0.0 };
        let (_, y) = planar_offset(reference, north);
        assert!((y - 111.32).abs() < 1e-6, "got {y}");
    }
}

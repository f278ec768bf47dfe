//! Opaque rectangular obstacles that attenuate line-of-sight signal.

use serde::{Deserialize, Serialize};

use crate::error::SigmapError;

/// An axis-aligned rectangular obstacle with an attenuation factor.
///
/// The attenuation is the fraction of signal absorbed when a line of
/// sight crosses the rectangle, and must lie in the open interval (0, 1).
/// The serialized shape matches the persisted obstacle list:
/// `{x, y, w, h, attenuation}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Rectangle width.
    #[serde(rename = "w")]
    pub width: f64,
    /// Rectangle height.
    #[serde(rename = "h")]
    pub height: f64,
    /// Fraction of signal absorbed by one crossing, in (0, 1).
    pub attenuation: f64,
}

impl Obstacle {
    /// Create a validated obstacle.
    pub fn new(x: f64, y: f64, width: f64, height: f64, attenuation: f64) -> Result<Self, SigmapError> {
        if !(attenuation > 0.0 && attenuation < 1.0) {
            return Err(SigmapError::AttenuationOutOfRange { value: attenuation });
        }
        Ok(Self {
            x,
            y,
            width,
            height,
            attenuation,
        })
    }

    /// The four corners in clockwise order starting at the top-left.
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.x, self.y),
            (self.x + self.width, self.y),
            (self.x + self.width, self.y + self.height),
            (self.x, self.y + self.height),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_attenuation_outside_unit_interval() {
        assert!(Obstacle::new(0.0, 0.0, 10.0, 10.0, 0.0).is_err());
        assert!(Obstacle::new(0.0, 0.0, 10.0, 10.0, 1.0).is_err());
        assert!(Obstacle::new(0.0, 0.0, 10.0, 10.0, 0.4).is_ok());
    }

    #[test]
    fn serde_uses_persisted_field_names() {
        let o = Obstacle::new(1.0, 2.0, 30.0, 40.0, 0.25).unwrap();
        let json = serde_json::to_value(o).unwrap();
        assert_eq!(json["w"], 30.0);
        assert_eq!(json["h"], 40.0);
        assert_eq!(json["attenuation"], 0.25);

        let back: Obstacle = serde_json::from_str(r#"{"x":5,"y":6,"w":7,"h":8,"attenuation":0.5}"#).unwrap();
        assert_eq!(back.width, 7.0);
        assert_eq!(back.height, 8.0);
    }
}

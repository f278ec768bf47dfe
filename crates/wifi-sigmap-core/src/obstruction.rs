//! Line-of-sight attenuation through rectangular obstacles.
//!
//! Each obstacle an observer-emitter sight line crosses absorbs a
//! fraction of whatever signal remains, so independent obstacles
//! compound multiplicatively and iteration order never matters.

use rand::Rng;
use serde::de::Error as _;

use crate::domain::Obstacle;
use crate::error::SigmapError;

/// Counter-clockwise orientation predicate for three points.
fn ccw(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> bool {
    (c.1 - a.1) * (b.0 - a.0) > (b.1 - a.1) * (c.0 - a.0)
}

/// Whether segments p1-p2 and p3-p4 properly intersect.
fn segments_intersect(p1: (f64, f64), p2: (f64, f64), p3: (f64, f64), p4: (f64, f64)) -> bool {
    ccw(p1, p3, p4) != ccw(p2, p3, p4) && ccw(p1, p2, p3) != ccw(p1, p2, p4)
}

/// Whether segment a-b crosses the boundary of an obstacle rectangle.
fn segment_crosses(a: (f64, f64), b: (f64, f64), obstacle: &Obstacle) -> bool {
    let corners = obstacle.corners();
    (0..4).any(|i| {
        let edge_start = corners[i];
        let edge_end = corners[(i + 1) % 4];
        segments_intersect(a, b, edge_start, edge_end)
    })
}

/// The fraction of signal surviving the line of sight from `observer`
/// to `emitter`, in (0, 1]. A clear path yields exactly 1.0.
pub fn path_attenuation(observer: (f64, f64), emitter: (f64, f64), obstacles: &[Obstacle]) -> f64 {
    let mut factor = 1.0;
    for obstacle in obstacles {
        if segment_crosses(observer, emitter, obstacle) {
            factor *= 1.0 - obstacle.attenuation;
        }
    }
    factor
}

/// Parameters for random obstacle generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleFieldConfig {
    /// Inclusive range of obstacles to generate.
    pub count: (usize, usize),
    /// Width and height of the area obstacles are scattered over.
    pub area: (f64, f64),
    /// Inclusive range of obstacle edge lengths.
    pub size: (f64, f64),
    /// Inclusive range of per-obstacle attenuation factors.
    pub attenuation: (f64, f64),
}

impl Default for ObstacleFieldConfig {
    fn default() -> Self {
        Self {
            count: (4, 7),
            area: (800.0, 600.0),
            size: (40.0, 140.0),
            attenuation: (0.15, 0.55),
        }
    }
}

/// The user-configurable obstacle list.
///
/// Generated randomly at first use, persisted externally as a JSON
/// array of `{x, y, w, h, attenuation}`, and explicitly clearable or
/// regenerable. Regeneration fully replaces the field.
#[derive(Debug, Clone, Default)]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
}

impl ObstacleField {
    /// Create an empty field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the field with freshly generated random obstacles.
    pub fn regenerate<R: Rng>(&mut self, config: &ObstacleFieldConfig, rng: &mut R) {
        let count = rng.gen_range(config.count.0..=config.count.1);
        self.obstacles = (0..count)
            .map(|_| {
                let width = rng.gen_range(config.size.0..=config.size.1);
                let height = rng.gen_range(config.size.0..=config.size.1);
                Obstacle {
                    x: rng.gen_range(0.0..=(config.area.0 - width).max(0.0)),
                    y: rng.gen_range(0.0..=(config.area.1 - height).max(0.0)),
                    width,
                    height,
                    attenuation: rng.gen_range(config.attenuation.0..=config.attenuation.1),
                }
            })
            .collect();
    }

    /// Replace the field with an explicit obstacle list, validating
    /// each attenuation factor.
    pub fn set(&mut self, obstacles: Vec<Obstacle>) -> Result<(), SigmapError> {
        for o in &obstacles {
            if !(o.attenuation > 0.0 && o.attenuation < 1.0) {
                return Err(SigmapError::AttenuationOutOfRange {
                    value: o.attenuation,
                });
            }
        }
        self.obstacles = obstacles;
        Ok(())
    }

    /// Remove every obstacle.
    pub fn clear(&mut self) {
        self.obstacles.clear();
    }

    /// The current obstacles.
    pub fn as_slice(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// The number of obstacles in the field.
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    /// Whether the field has no obstacles.
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Serialize to the persisted JSON array shape.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.obstacles)
    }

    /// Load a field from the persisted JSON array shape.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let obstacles: Vec<Obstacle> = serde_json::from_str(json)?;
        let mut field = Self::new();
        field
            .set(obstacles)
            .map_err(|e| serde_json::Error::custom(e.to_string()))?;
        Ok(field)
    }
}

//! Force-directed radial layout for emitters without known positions.
//!
//! When no geographic fix is available the map still needs a legible,
//! stable placement. Each emitter gets a permanent angle from
//! golden-angle stepping on first appearance and a radius derived from
//! its smoothed signal, then a few iterations of pairwise repulsion
//! resolve overlaps. Positions are recomputed from scratch every cycle;
//! only angle and radius carry visual continuity, so the output can
//! jitter under fluctuating signal. That is intended.

use std::collections::HashMap;

use crate::domain::EmitterId;
use crate::smoothing::SmoothedSample;

/// The golden angle, pi * (3 - sqrt(5)), in radians (~137.5 degrees).
pub const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// Tunable constants for the radial layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Radius of the strongest-possible emitter, in layout units.
    pub min_radius: f64,
    /// Radius of the weakest-possible emitter, in layout units.
    pub max_radius: f64,
    /// Pairs closer than this get pushed apart.
    pub min_separation: f64,
    /// Fraction of the overlap depth resolved per iteration.
    pub repulsion_strength: f64,
    /// Number of relaxation iterations per layout pass.
    pub relax_iterations: usize,
    /// Exponent applied to the inverted signal fraction; below 1 it
    /// expands separation among strong emitters where discrimination
    /// matters most.
    pub radius_exponent: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_radius: 90.0,
            max_radius: 340.0,
            min_separation: 110.0,
            repulsion_strength: 0.6,
            relax_iterations: 5,
            radius_exponent: 0.7,
        }
    }
}

/// A finalized layout position for one emitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedEmitter {
    /// The emitter this position belongs to.
    pub id: EmitterId,
    /// Layout x, in layout units relative to the map center.
    pub x: f64,
    /// Layout y, in layout units relative to the map center.
    pub y: f64,
}

/// Radial layout engine owning the per-emitter angle table.
#[derive(Debug, Clone)]
pub struct RadialLayout {
    config: LayoutConfig,
    angles: HashMap<EmitterId, f64>,
    assigned: usize,
}

impl RadialLayout {
    /// Create a layout engine with default constants.
    pub fn new() -> Self {
        Self::with_config(LayoutConfig::default())
    }

    /// Create a layout engine with custom constants.
    pub fn with_config(config: LayoutConfig) -> Self {
        Self {
            config,
            angles: HashMap::new(),
            assigned: 0,
        }
    }

    /// The stable angle for an emitter, assigning one on first sight.
    ///
    /// Golden-angle stepping keeps successively-appearing emitters
    /// maximally separated and never reuses an angle. An assigned angle
    /// only goes away with [`RadialLayout::reset`].
    pub fn angle_for(&mut self, id: EmitterId) -> f64 {
        match self.angles.get(&id) {
            Some(angle) => *angle,
            None => {
                let angle = self.assigned as f64 * GOLDEN_ANGLE;
                self.angles.insert(id, angle);
                self.assigned += 1;
                angle
            }
        }
    }

    /// Map a smoothed signal in dBm to a radius in layout units.
    ///
    /// The signal is normalized over [-90, -30]; stronger signal means
    /// smaller radius (closer to the map center).
    pub fn radius_for(&self, signal_dbm: f64) -> f64 {
        let t = ((signal_dbm + 90.0) / 60.0).clamp(0.0, 1.0);
        let radius_t = (1.0 - t).powf(self.config.radius_exponent);
        self.config.min_radius + (self.config.max_radius - self.config.min_radius) * radius_t
    }

    /// Compute a full layout pass for the given smoothed emitters.
    ///
    /// Polar positions are rebuilt from angle and radius, then relaxed
    /// with a fixed number of pairwise repulsion iterations. No state
    /// beyond the angle table survives between calls.
    pub fn layout(&mut self, emitters: &[(EmitterId, SmoothedSample)]) -> Vec<PlacedEmitter> {
        let mut placed: Vec<PlacedEmitter> = emitters
            .iter()
            .map(|(id, sample)| {
                let angle = self.angle_for(*id);
                let radius = self.radius_for(sample.signal);
                PlacedEmitter {
                    id: *id,
                    x: radius * angle.cos(),
                    y: radius * angle.sin(),
                }
            })
            .collect();

        for _ in 0..self.config.relax_iterations {
            self.relax_once(&mut placed);
        }

        placed
    }

    /// One discrete repulsion sweep over every pair.
    fn relax_once(&self, placed: &mut [PlacedEmitter]) {
        for i in 0..placed.len() {
            for j in (i + 1)..placed.len() {
                let dx = placed[j].x - placed[i].x;
                let dy = placed[j].y - placed[i].y;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist >= self.config.min_separation {
                    continue;
                }

                let overlap = self.config.min_separation - dist;
                // Coincident points have no connecting line; nudge
                // along the x axis deterministically.
                let (ux, uy) = if dist > f64::EPSILON {
                    (dx / dist, dy / dist)
                } else {
                    (1.0, 0.0)
                };

                let shift = overlap * self.config.repulsion_strength / 2.0;
                placed[i].x -= ux * shift;
                placed[i].y -= uy * shift;
                placed[j].x += ux * shift;
                placed[j].y += uy * shift;
            }
        }
    }

    /// The number of emitters with an assigned angle.
    pub fn assigned_count(&self) -> usize {
        self.assigned
    }

    /// Forget every assigned angle. The next layout pass reassigns
    /// from slot zero.
    pub fn reset(&mut self) {
        self.angles.clear();
        self.assigned = 0;
    }
}

impl Default for RadialLayout {
    fn default() -> Self {
        Self::new()
    }
}

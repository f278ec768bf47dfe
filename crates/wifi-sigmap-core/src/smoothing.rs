//! Per-emitter exponential smoothing of signal and distance.
//!
//! Live RSSI readings jitter from frame to frame; the filter keeps one
//! exponential moving average per emitter. Distance is recomputed from
//! the blended signal and then blended again with the same coefficient.
//! Distance is a nonlinear function of signal, so smoothing it a second
//! time keeps point-sampled noise from being amplified.

use std::collections::HashMap;

use crate::distance::estimate_distance;
use crate::domain::{Band, EmitterId};

/// Default smoothing coefficient. Lower means steadier, laggier output.
pub const DEFAULT_ALPHA: f64 = 0.08;

/// A smoothed `{signal, distance}` pair for one emitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedSample {
    /// Exponentially smoothed signal strength in dBm.
    pub signal: f64,
    /// Exponentially smoothed distance estimate in meters.
    pub distance: f64,
}

/// Maintains per-emitter exponential moving averages of signal and distance.
///
/// State persists across scans: an emitter that drops out of the live set
/// keeps its smoothed entry until [`SmoothingFilter::clear`] is called.
#[derive(Debug, Clone)]
pub struct SmoothingFilter {
    alpha: f64,
    states: HashMap<EmitterId, SmoothedSample>,
}

impl SmoothingFilter {
    /// Create a filter with the default coefficient.
    pub fn new() -> Self {
        Self::with_alpha(DEFAULT_ALPHA)
    }

    /// Create a filter with a custom coefficient in (0, 1].
    pub fn with_alpha(alpha: f64) -> Self {
        Self {
            alpha,
            states: HashMap::new(),
        }
    }

    /// Blend a raw reading into the emitter's smoothed state and return it.
    ///
    /// The first observation seeds the state from the raw values directly.
    /// Repeated calls with a constant raw input converge geometrically
    /// toward that input and never overshoot past it.
    pub fn update(&mut self, id: EmitterId, raw_signal: f64, band: Band) -> SmoothedSample {
        match self.states.get_mut(&id) {
            Some(state) => {
                state.signal += self.alpha * (raw_signal - state.signal);
                let target = estimate_distance(state.signal, band);
                state.distance += self.alpha * (target - state.distance);
                *state
            }
            None => {
                let seeded = SmoothedSample {
                    signal: raw_signal,
                    distance: estimate_distance(raw_signal, band),
                };
                self.states.insert(id, seeded);
                seeded
            }
        }
    }

    /// The current smoothed state for an emitter, if it has been observed.
    pub fn get(&self, id: &EmitterId) -> Option<SmoothedSample> {
        self.states.get(id).copied()
    }

    /// The number of emitters with smoothed state.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no emitter has been observed yet.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Drop all smoothed state.
    pub fn clear(&mut self) {
        self.states.clear();
    }
}

impl Default for SmoothingFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: EmitterId = EmitterId([0xaa; 6]);

    #[test]
    fn first_observation_seeds_raw_values() {
        let mut filter = SmoothingFilter::new();
        let s = filter.update(ID, -60.0, Band::Band2_4GHz);
        assert_eq!(s.signal, -60.0);
        assert_eq!(s.distance, estimate_distance(-60.0, Band::Band2_4GHz));
    }

    #[test]
    fn constant_input_converges_without_overshoot() {
        let mut filter = SmoothingFilter::new();
        filter.update(ID, -80.0, Band::Band2_4GHz);

        let mut prev_gap = f64::INFINITY;
        for _ in 0..200 {
            let s = filter.update(ID, -50.0, Band::Band2_4GHz);
            let gap = (-50.0 - s.signal).abs();
            assert!(s.signal <= -50.0, "smoothed signal overshot the target");
            assert!(gap <= prev_gap, "convergence must be monotone");
            prev_gap = gap;
        }
        assert!(prev_gap < 0.01);
    }

    #[test]
    fn distance_lags_behind_signal() {
        let mut filter = SmoothingFilter::new();
        filter.update(ID, -80.0, Band::Band2_4GHz);
        let s = filter.update(ID, -40.0, Band::Band2_4GHz);

        // Double smoothing: the stored distance has only moved a fraction
        // of the way toward the distance implied by the blended signal.
        let implied = estimate_distance(s.signal, Band::Band2_4GHz);
        assert!(s.distance > implied);
    }

    #[test]
    fn emitters_are_tracked_independently() {
        let mut filter = SmoothingFilter::new();
        let other = EmitterId([0xbb; 6]);
        filter.update(ID, -40.0, Band::Band2_4GHz);
        filter.update(other, -85.0, Band::Band5GHz);

        assert_eq!(filter.len(), 2);
        assert!(filter.get(&ID).unwrap().signal > filter.get(&other).unwrap().signal);

        filter.clear();
        assert!(filter.is_empty());
        assert!(filter.get(&ID).is_none());
    }
}

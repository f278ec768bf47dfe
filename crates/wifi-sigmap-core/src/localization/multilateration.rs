//! Closed-form multilateration from distance observations.
//!
//! Given three or more (position, distance) observations of one emitter
//! from different vantage points, subtracting the first circle equation
//! from each of the others eliminates the quadratic terms and leaves a
//! linear system in the emitter's planar offset. The normal equations
//! for that system have a closed-form 2x2 solution; no iterative
//! refinement is needed for two unknowns.

use serde::{Deserialize, Serialize};

/// Observations whose `A^T A` determinant falls below this are treated
/// as colinear/degenerate and produce no position.
pub const SINGULARITY_EPSILON: f64 = 1e-6;

/// One planar observation of an emitter: where the observer stood and
/// how far away the emitter appeared.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VantagePoint {
    /// Observer x in meters, relative to the shared reference point.
    pub x: f64,
    /// Observer y in meters, relative to the shared reference point.
    pub y: f64,
    /// Estimated distance from observer to emitter in meters.
    pub distance: f64,
}

/// An emitter's estimated planar offset in meters, relative to the
/// shared reference point the observations were projected against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionEstimate {
    /// East offset in meters.
    pub x: f64,
    /// North offset in meters.
    pub y: f64,
}

/// Solve for an emitter position from at least three observations.
///
/// Exact for the noiseless three-observation case and least-squares
/// optimal for more. Returns `None` for fewer than three observations
/// or for degenerate (colinear) geometry rather than producing a
/// spurious position.
pub fn solve(observations: &[VantagePoint]) -> Option<PositionEstimate> {
    if observations.len() < 3 {
        return None;
    }

    let first = observations[0];

    // Accumulate A^T A and A^T b directly; A has one row per
    // non-reference observation.
    let mut ata = [[0.0f64; 2]; 2];
    let mut atb = [0.0f64; 2];

    for obs in &observations[1..] {
        let a0 = 2.0 * (obs.x - first.x);
        let a1 = 2.0 * (obs.y - first.y);
        let b = (obs.x * obs.x - first.x * first.x)
            + (obs.y * obs.y - first.y * first.y)
            + (first.distance * first.distance - obs.distance * obs.distance);

        ata[0][0] += a0 * a0;
        ata[0][1] += a0 * a1;
        ata[1][0] += a1 * a0;
        ata[1][1] += a1 * a1;
        atb[0] += a0 * b;
        atb[1] += a1 * b;
    }

    let det = ata[0][0] * ata[1][1] - ata[0][1] * ata[1][0];
    if det.abs() < SINGULARITY_EPSILON {
        return None;
    }

    let x = (atb[0] * ata[1][1] - atb[1] * ata[0][1]) / det;
    let y = (ata[0][0] * atb[1] - ata[1][0] * atb[0]) / det;

    Some(PositionEstimate { x, y })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observe(x: f64, y: f64, target: (f64, f64)) -> VantagePoint {
        let distance = ((target.0 - x).powi(2) + (target.1 - y).powi(2)).sqrt();
        VantagePoint { x, y, distance }
    }

    #[test]
    fn noiseless_round_trip_recovers_true_offset() {
        let target = (4.0, -2.5);
        let observations = vec![
            observe(0.0, 0.0, target),
            observe(10.0, 0.0, target),
            observe(5.0, 8.0, target),
        ];

        let pos = solve(&observations).unwrap();
        assert!((pos.x - target.0).abs() < 1e-9, "x = {}", pos.x);
        assert!((pos.y - target.1).abs() < 1e-9, "y = {}", pos.y);
    }

    #[test]
    fn overdetermined_fit_stays_exact_without_noise() {
        let target = (-3.0, 7.0);
        let observations = vec![
            observe(0.0, 0.0, target),
            observe(12.0, 1.0, target),
            observe(-4.0, 9.0, target),
            observe(6.0, -6.0, target),
            observe(2.0, 3.0, target),
        ];

        let pos = solve(&observations).unwrap();
        assert!((pos.x - target.0).abs() < 1e-8);
        assert!((pos.y - target.1).abs() < 1e-8);
    }

    #[test]
    fn colinear_observers_yield_no_position() {
        let target = (5.0, 5.0);
        let observations = vec![
            observe(0.0, 0.0, target),
            observe(1.0, 1.0, target),
            observe(2.0, 2.0, target),
        ];
        assert!(solve(&observations).is_none());
    }

    #[test]
    fn fewer_than_three_observations_yield_no_position() {
        let target = (1.0, 1.0);
        assert!(solve(&[]).is_none());
        assert!(solve(&[observe(0.0, 0.0, target)]).is_none());
        assert!(solve(&[observe(0.0, 0.0, target), observe(3.0, 0.0, target)]).is_none());
    }

    #[test]
    fn coincident_observers_yield_no_position() {
        let p = VantagePoint { x: 1.0, y: 1.0, distance: 4.0 };
        assert!(solve(&[p, p, p]).is_none());
    }
}

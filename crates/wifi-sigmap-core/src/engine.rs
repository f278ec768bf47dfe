//! Frame-driven coordinator owning every per-emitter table.
//!
//! All mutable state (smoothed samples, rolling windows, layout angles,
//! obstacle field, position cache) lives here and is mutated
//! synchronously within each frame tick. Nothing in the engine blocks;
//! backend fetch failures are the caller's concern and simply mean a
//! tick runs on last-known state.

use std::collections::HashMap;
use std::time::Instant;

use rand::Rng;
use tracing::{debug, info};

use crate::analysis::{AnalysisConfig, RollingAnalysis, Verdict};
use crate::distance::estimate_distance;
use crate::domain::{Band, Emitter, EmitterId, Obstacle};
use crate::error::SigmapError;
use crate::layout::{LayoutConfig, PlacedEmitter, RadialLayout};
use crate::localization::{planar_offset, solve, GpsFix, PositionEstimate, VantagePoint};
use crate::obstruction::{path_attenuation, ObstacleField, ObstacleFieldConfig};
use crate::smoothing::{SmoothedSample, SmoothingFilter, DEFAULT_ALPHA};

/// Engine-wide configuration gathering the named variant constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Smoothing coefficient for the per-emitter moving averages.
    pub smoothing_alpha: f64,
    /// Radial layout constants.
    pub layout: LayoutConfig,
    /// Rolling analysis constants.
    pub analysis: AnalysisConfig,
    /// Obstacle generation constants.
    pub obstacles: ObstacleFieldConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            smoothing_alpha: DEFAULT_ALPHA,
            layout: LayoutConfig::default(),
            analysis: AnalysisConfig::default(),
            obstacles: ObstacleFieldConfig::default(),
        }
    }
}

/// One real and two synthetic snapshots of the same physical scan,
/// captured as distinct vantage points. Index 0 is the real
/// observation and serves as the planar reference.
#[derive(Debug, Clone)]
pub struct SnapshotBundle {
    /// Observer fixes, one per vantage point.
    pub fixes: [GpsFix; 3],
    /// Scan results, one per vantage point.
    pub scans: [Vec<Emitter>; 3],
}

/// The signal localization and layout engine.
#[derive(Debug)]
pub struct MapEngine {
    config: EngineConfig,
    smoothing: SmoothingFilter,
    layout: RadialLayout,
    analysis: RollingAnalysis,
    obstacles: ObstacleField,
    positions: HashMap<EmitterId, PositionEstimate>,
    live: Vec<Emitter>,
}

impl MapEngine {
    /// Create an engine with default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an engine with custom configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            smoothing: SmoothingFilter::with_alpha(config.smoothing_alpha),
            layout: RadialLayout::with_config(config.layout),
            analysis: RollingAnalysis::with_config(config.analysis),
            obstacles: ObstacleField::new(),
            positions: HashMap::new(),
            live: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Scan ingestion and smoothing
    // ------------------------------------------------------------------

    /// Replace the live emitter set with a fresh scan snapshot and run
    /// every network through the smoothing filter.
    ///
    /// Emitters missing from the snapshot drop out of the live set but
    /// keep their smoothed and positional state.
    pub fn ingest_scan(&mut self, networks: Vec<Emitter>) {
        for network in &networks {
            self.smoothing
                .update(network.id, network.rssi_dbm as f64, network.band);
        }
        debug!(live = networks.len(), "scan snapshot ingested");
        self.live = networks;
    }

    /// The emitters observed by the most recent scan.
    pub fn live(&self) -> &[Emitter] {
        &self.live
    }

    /// The smoothed state for an emitter, if it has ever been observed.
    pub fn smoothed(&self, id: &EmitterId) -> Option<SmoothedSample> {
        self.smoothing.get(id)
    }

    // ------------------------------------------------------------------
    // Multilateration positions
    // ------------------------------------------------------------------

    /// Solve per-emitter positions from a snapshot bundle.
    ///
    /// Each emitter present in the bundle contributes one vantage point
    /// per snapshot that observed it; emitters with at least three
    /// usable vantage points are solved, and successful solutions
    /// replace the cached estimate. Degenerate geometry leaves the
    /// cache untouched for that emitter. Returns how many positions
    /// were solved this call.
    pub fn update_positions(&mut self, bundle: &SnapshotBundle) -> usize {
        let reference = bundle.fixes[0];
        let mut solved = 0;

        // Every emitter mentioned anywhere in the bundle is a candidate.
        let mut candidates: Vec<EmitterId> = Vec::new();
        for scan in &bundle.scans {
            for network in scan {
                if !candidates.contains(&network.id) {
                    candidates.push(network.id);
                }
            }
        }

        for id in candidates {
            let mut observations: Vec<VantagePoint> = Vec::with_capacity(3);
            for (fix, scan) in bundle.fixes.iter().zip(bundle.scans.iter()) {
                if let Some(network) = scan.iter().find(|n| n.id == id) {
                    let (x, y) = planar_offset(reference, *fix);
                    let distance = estimate_distance(network.rssi_dbm as f64, network.band);
                    observations.push(VantagePoint { x, y, distance });
                }
            }

            if observations.len() < 3 {
                continue;
            }
            if let Some(position) = solve(&observations) {
                self.positions.insert(id, position);
                solved += 1;
            }
        }

        debug!(solved, cached = self.positions.len(), "positions updated");
        solved
    }

    /// The cached position estimate for an emitter.
    pub fn position(&self, id: &EmitterId) -> Option<PositionEstimate> {
        self.positions.get(id).copied()
    }

    /// All cached position estimates.
    pub fn positions(&self) -> &HashMap<EmitterId, PositionEstimate> {
        &self.positions
    }

    /// Drop every cached position estimate.
    pub fn clear_positions(&mut self) {
        self.positions.clear();
        info!("position cache cleared");
    }

    // ------------------------------------------------------------------
    // Radial layout fallback
    // ------------------------------------------------------------------

    /// Lay out the live smoothed emitters radially.
    ///
    /// Used when true positions are unavailable; recomputed from scratch
    /// each call, relying only on the stable angle table for continuity.
    pub fn radial_positions(&mut self) -> Vec<PlacedEmitter> {
        let items: Vec<(EmitterId, SmoothedSample)> = self
            .live
            .iter()
            .filter_map(|n| self.smoothing.get(&n.id).map(|s| (n.id, s)))
            .collect();
        self.layout.layout(&items)
    }

    /// Forget every assigned layout angle.
    pub fn reset_layout(&mut self) {
        self.layout.reset();
        info!("layout angle table cleared");
    }

    // ------------------------------------------------------------------
    // Obstacles
    // ------------------------------------------------------------------

    /// The signal fraction surviving the sight line between two layout
    /// points, given the current obstacle field.
    pub fn attenuation_between(&self, observer: (f64, f64), emitter: (f64, f64)) -> f64 {
        path_attenuation(observer, emitter, self.obstacles.as_slice())
    }

    /// Replace the obstacle field with freshly generated obstacles.
    pub fn regenerate_obstacles<R: Rng>(&mut self, rng: &mut R) {
        self.obstacles.regenerate(&self.config.obstacles, rng);
        info!(count = self.obstacles.len(), "obstacle field regenerated");
    }

    /// Replace the obstacle field with an explicit list (e.g. restored
    /// from persistence).
    pub fn set_obstacles(&mut self, obstacles: Vec<Obstacle>) -> Result<(), SigmapError> {
        self.obstacles.set(obstacles)
    }

    /// Remove every obstacle.
    pub fn clear_obstacles(&mut self) {
        self.obstacles.clear();
        info!("obstacle field cleared");
    }

    /// The current obstacle field.
    pub fn obstacles(&self) -> &[Obstacle] {
        self.obstacles.as_slice()
    }

    // ------------------------------------------------------------------
    // Rolling analysis
    // ------------------------------------------------------------------

    /// Start a rolling analysis run.
    pub fn begin_analysis(&mut self, now: Instant) -> Result<(), SigmapError> {
        self.analysis.begin(now)
    }

    /// Whether an analysis run is collecting.
    pub fn analysis_active(&self) -> bool {
        self.analysis.is_collecting()
    }

    /// Abort the current analysis run, if any.
    pub fn cancel_analysis(&mut self) {
        self.analysis.cancel();
    }

    /// Drive one frame tick.
    ///
    /// Feeds the current smoothed values of every live emitter into the
    /// rolling analysis; returns the verdict exactly once when a run
    /// finishes, `None` otherwise.
    pub fn tick(&mut self, now: Instant) -> Option<Verdict> {
        let live: Vec<(EmitterId, Band, SmoothedSample)> = self
            .live
            .iter()
            .filter_map(|n| self.smoothing.get(&n.id).map(|s| (n.id, n.band, s)))
            .collect();
        self.analysis.record(now, &live)
    }
}

impl Default for MapEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emitter(n: u8, rssi: i32, band: Band) -> Emitter {
        Emitter {
            id: EmitterId([n; 6]),
            ssid: Some(format!("net-{n}")),
            band,
            rssi_dbm: rssi,
            standard: None,
            auth: None,
        }
    }

    #[test]
    fn ingest_replaces_live_set_but_keeps_smoothed_state() {
        let mut engine = MapEngine::new();
        engine.ingest_scan(vec![
            emitter(1, -50, Band::Band2_4GHz),
            emitter(2, -70, Band::Band5GHz),
        ]);
        assert_eq!(engine.live().len(), 2);

        engine.ingest_scan(vec![emitter(1, -52, Band::Band2_4GHz)]);
        assert_eq!(engine.live().len(), 1);
        // Emitter 2 is gone from the live set, smoothed state persists.
        assert!(engine.smoothed(&EmitterId([2; 6])).is_some());
    }

    #[test]
    fn positions_require_three_observing_snapshots() {
        let mut engine = MapEngine::new();
        let base = GpsFix { lat: 48.0, lon: 16.0 };
        let east = GpsFix { lat: 48.0, lon: 16.0001 };
        let north = GpsFix { lat: 48.0001, lon: 16.0 };

        // Emitter 1 is visible from all vantage points, emitter 2 from one.
        let bundle = SnapshotBundle {
            fixes: [base, east, north],
            scans: [
                vec![emitter(1, -50, Band::Band2_4GHz), emitter(2, -60, Band::Band2_4GHz)],
                vec![emitter(1, -55, Band::Band2_4GHz)],
                vec![emitter(1, -52, Band::Band2_4GHz)],
            ],
        };

        engine.update_positions(&bundle);
        assert!(engine.position(&EmitterId([1; 6])).is_some());
        assert!(engine.position(&EmitterId([2; 6])).is_none());

        engine.clear_positions();
        assert!(engine.positions().is_empty());
    }

    #[test]
    fn colinear_vantage_points_solve_nothing() {
        let mut engine = MapEngine::new();
        let base = GpsFix { lat: 0.0, lon: 0.0 };
        // All three fixes on the equator: colinear in the planar frame.
        let bundle = SnapshotBundle {
            fixes: [
                base,
                GpsFix { lat: 0.0, lon: 0.0001 },
                GpsFix { lat: 0.0, lon: 0.0002 },
            ],
            scans: [
                vec![emitter(1, -50, Band::Band2_4GHz)],
                vec![emitter(1, -55, Band::Band2_4GHz)],
                vec![emitter(1, -60, Band::Band2_4GHz)],
            ],
        };

        assert_eq!(engine.update_positions(&bundle), 0);
        assert!(engine.position(&EmitterId([1; 6])).is_none());
    }

    #[test]
    fn radial_positions_cover_every_live_emitter() {
        let mut engine = MapEngine::new();
        engine.ingest_scan(vec![
            emitter(1, -40, Band::Band2_4GHz),
            emitter(2, -60, Band::Band5GHz),
            emitter(3, -80, Band::Band2_4GHz),
        ]);

        let placed = engine.radial_positions();
        assert_eq!(placed.len(), 3);

        // Stronger emitters sit closer to the center.
        let radius = |id: EmitterId| {
            placed
                .iter()
                .find(|p| p.id == id)
                .map(|p| (p.x * p.x + p.y * p.y).sqrt())
                .unwrap()
        };
        assert!(radius(EmitterId([1; 6])) < radius(EmitterId([3; 6])));
    }

    #[test]
    fn attenuation_uses_the_current_obstacle_field() {
        let mut engine = MapEngine::new();
        assert_eq!(engine.attenuation_between((0.0, 0.0), (10.0, 0.0)), 1.0);

        engine
            .set_obstacles(vec![Obstacle {
                x: 4.0,
                y: -2.0,
                width: 2.0,
                height: 4.0,
                attenuation: 0.4,
            }])
            .unwrap();
        let factor = engine.attenuation_between((0.0, 0.0), (10.0, 0.0));
        assert!((factor - 0.6).abs() < 1e-12);

        engine.clear_obstacles();
        assert_eq!(engine.attenuation_between((0.0, 0.0), (10.0, 0.0)), 1.0);
    }

    #[test]
    fn obstacle_regeneration_replaces_the_field() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let mut engine = MapEngine::new();
        let mut rng = StdRng::seed_from_u64(42);
        engine.regenerate_obstacles(&mut rng);
        let first: Vec<Obstacle> = engine.obstacles().to_vec();
        assert!(!first.is_empty());

        engine.regenerate_obstacles(&mut rng);
        assert_ne!(engine.obstacles(), first.as_slice());
    }
}

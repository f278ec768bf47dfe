//! Rolling window collection and best-network scoring.
//!
//! An analysis run collects a trailing window of smoothed samples per
//! emitter for a fixed wall-clock duration, then scores every emitter
//! with enough samples and recommends the best one. Only one run can
//! collect at a time; the duration gate is not cancellable mid-flight
//! beyond an explicit reset.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::domain::{Band, EmitterId};
use crate::error::SigmapError;
use crate::smoothing::SmoothedSample;

/// Tunable constants for rolling analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisConfig {
    /// Length of the trailing sample window and of the whole run.
    pub window: Duration,
    /// Emitters with fewer samples than this are statistically
    /// insufficient and excluded from scoring.
    pub min_samples: usize,
    /// Weight of average distance against average signal in the score.
    /// Observed deployments use values between 1 and 2.
    pub distance_weight: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_millis(30_000),
            min_samples: 5,
            distance_weight: 1.5,
        }
    }
}

/// One timestamped smoothed sample inside an emitter's window.
#[derive(Debug, Clone, Copy)]
struct WindowSample {
    at: Instant,
    signal: f64,
    distance: f64,
}

/// Window plus metadata for one emitter during a run.
#[derive(Debug, Clone)]
struct EmitterWindow {
    band: Band,
    samples: VecDeque<WindowSample>,
}

/// The winning network of an analysis run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recommendation {
    /// The winning emitter.
    pub id: EmitterId,
    /// Its frequency band.
    pub band: Band,
    /// Mean smoothed signal over the window, in dBm.
    pub avg_signal: f64,
    /// Mean smoothed distance over the window, in meters.
    pub avg_distance: f64,
    /// `avg_signal - weight * avg_distance`.
    pub score: f64,
}

/// The outcome of a finished analysis run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// A best network was found.
    Recommendation(Recommendation),
    /// No emitter accumulated enough samples to qualify.
    NoData,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Idle,
    Collecting { started: Instant },
}

/// State machine driving one rolling analysis at a time:
/// Idle -> Collecting -> (scoring) -> Idle.
#[derive(Debug, Clone)]
pub struct RollingAnalysis {
    config: AnalysisConfig,
    phase: Phase,
    windows: HashMap<EmitterId, EmitterWindow>,
    /// First-seen order; scoring iterates this so ties go to the
    /// emitter that appeared first.
    order: Vec<EmitterId>,
}

impl RollingAnalysis {
    /// Create an idle aggregator with default constants.
    pub fn new() -> Self {
        Self::with_config(AnalysisConfig::default())
    }

    /// Create an idle aggregator with custom constants.
    pub fn with_config(config: AnalysisConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            windows: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Start a new run, clearing any prior window data.
    ///
    /// Fails with [`SigmapError::AnalysisInProgress`] if a run is
    /// already collecting; concurrent runs are not allowed.
    pub fn begin(&mut self, now: Instant) -> Result<(), SigmapError> {
        if matches!(self.phase, Phase::Collecting { .. }) {
            return Err(SigmapError::AnalysisInProgress);
        }
        self.windows.clear();
        self.order.clear();
        self.phase = Phase::Collecting { started: now };
        debug!("rolling analysis started");
        Ok(())
    }

    /// Whether a run is currently collecting samples.
    pub fn is_collecting(&self) -> bool {
        matches!(self.phase, Phase::Collecting { .. })
    }

    /// Abort the current run and drop its windows.
    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
        self.windows.clear();
        self.order.clear();
    }

    /// Feed one tick of live smoothed samples into the run.
    ///
    /// Appends a timestamped sample per live emitter, evicts entries
    /// older than the window from the front, and, once the run's
    /// duration has elapsed, scores the windows and returns the verdict
    /// exactly once (the machine is Idle again afterwards). Returns
    /// `None` while idle or still collecting.
    pub fn record(
        &mut self,
        now: Instant,
        live: &[(EmitterId, Band, SmoothedSample)],
    ) -> Option<Verdict> {
        let started = match self.phase {
            Phase::Collecting { started } => started,
            Phase::Idle => return None,
        };

        for (id, band, sample) in live {
            let window = self.windows.entry(*id).or_insert_with(|| {
                self.order.push(*id);
                EmitterWindow {
                    band: *band,
                    samples: VecDeque::new(),
                }
            });
            window.band = *band;
            window.samples.push_back(WindowSample {
                at: now,
                signal: sample.signal,
                distance: sample.distance,
            });
            while let Some(front) = window.samples.front() {
                if now.duration_since(front.at) > self.config.window {
                    window.samples.pop_front();
                } else {
                    break;
                }
            }
        }

        if now.duration_since(started) >= self.config.window {
            let verdict = self.score();
            self.phase = Phase::Idle;
            debug!(?verdict, "rolling analysis finished");
            Some(verdict)
        } else {
            None
        }
    }

    /// Score every qualified window and pick the maximum.
    fn score(&self) -> Verdict {
        let mut best: Option<Recommendation> = None;

        for id in &self.order {
            let window = match self.windows.get(id) {
                Some(w) if w.samples.len() >= self.config.min_samples => w,
                _ => continue,
            };

            let n = window.samples.len() as f64;
            let avg_signal = window.samples.iter().map(|s| s.signal).sum::<f64>() / n;
            let avg_distance = window.samples.iter().map(|s| s.distance).sum::<f64>() / n;
            let score = avg_signal - self.config.distance_weight * avg_distance;

            // Strict comparison keeps the first-seen emitter on ties.
            let is_better = best.map_or(true, |b| score > b.score);
            if is_better {
                best = Some(Recommendation {
                    id: *id,
                    band: window.band,
                    avg_signal,
                    avg_distance,
                    score,
                });
            }
        }

        match best {
            Some(recommendation) => Verdict::Recommendation(recommendation),
            None => Verdict::NoData,
        }
    }
}

impl Default for RollingAnalysis {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u8) -> EmitterId {
        EmitterId([n; 6])
    }

    fn sample(signal: f64, distance: f64) -> SmoothedSample {
        SmoothedSample { signal, distance }
    }

    fn short_config(weight: f64) -> AnalysisConfig {
        AnalysisConfig {
            window: Duration::from_millis(1_000),
            min_samples: 5,
            distance_weight: weight,
        }
    }

    /// Drive a run to completion with fixed per-emitter samples.
    fn run_to_verdict(
        config: AnalysisConfig,
        live: &[(EmitterId, Band, SmoothedSample)],
        ticks: u32,
    ) -> Verdict {
        let mut analysis = RollingAnalysis::with_config(config);
        let t0 = Instant::now();
        analysis.begin(t0).unwrap();

        let step = config.window / ticks;
        for i in 1..ticks {
            assert!(analysis.record(t0 + step * i, live).is_none());
        }
        analysis
            .record(t0 + config.window, live)
            .expect("duration elapsed, verdict expected")
    }

    #[test]
    fn strong_near_network_beats_weak_far_one() {
        for weight in [1.0, 2.0] {
            let live = vec![
                (id(2), Band::Band5GHz, sample(-70.0, 30.0)),
                (id(1), Band::Band2_4GHz, sample(-40.0, 5.0)),
            ];
            let verdict = run_to_verdict(short_config(weight), &live, 8);

            match verdict {
                Verdict::Recommendation(r) => {
                    assert_eq!(r.id, id(1), "weight {weight}");
                    assert_eq!(r.band, Band::Band2_4GHz);
                    assert!((r.avg_signal - -40.0).abs() < 1e-9);
                    assert!((r.avg_distance - 5.0).abs() < 1e-9);
                }
                Verdict::NoData => panic!("expected a recommendation"),
            }
        }
    }

    #[test]
    fn under_sampled_emitter_never_scores() {
        let mut analysis = RollingAnalysis::with_config(short_config(1.0));
        let t0 = Instant::now();
        analysis.begin(t0).unwrap();

        let strong = (id(9), Band::Band5GHz, sample(-30.0, 0.5));
        let steady = (id(1), Band::Band2_4GHz, sample(-75.0, 40.0));
        let step = Duration::from_millis(125);

        // The strong emitter shows up for only 3 of 8 ticks.
        for i in 1..8u32 {
            let live: Vec<_> = if i <= 3 {
                vec![steady, strong]
            } else {
                vec![steady]
            };
            assert!(analysis.record(t0 + step * i, &live).is_none());
        }
        let verdict = analysis
            .record(t0 + Duration::from_millis(1_000), &[steady])
            .unwrap();

        match verdict {
            Verdict::Recommendation(r) => assert_eq!(r.id, id(1)),
            Verdict::NoData => panic!("steady emitter had 8 samples"),
        }
    }

    #[test]
    fn no_qualified_emitter_yields_no_data() {
        let mut analysis = RollingAnalysis::with_config(short_config(1.0));
        let t0 = Instant::now();
        analysis.begin(t0).unwrap();

        let live = vec![(id(1), Band::Band2_4GHz, sample(-50.0, 3.0))];
        // Only 2 ticks before the gate: under min_samples.
        assert!(analysis.record(t0 + Duration::from_millis(400), &live).is_none());
        let verdict = analysis
            .record(t0 + Duration::from_millis(1_000), &live)
            .unwrap();
        assert_eq!(verdict, Verdict::NoData);
    }

    #[test]
    fn reentry_is_rejected_while_collecting() {
        let mut analysis = RollingAnalysis::new();
        let t0 = Instant::now();
        analysis.begin(t0).unwrap();
        assert!(matches!(
            analysis.begin(t0 + Duration::from_millis(10)),
            Err(SigmapError::AnalysisInProgress)
        ));

        analysis.cancel();
        assert!(!analysis.is_collecting());
        assert!(analysis.begin(t0 + Duration::from_millis(20)).is_ok());
    }

    #[test]
    fn machine_returns_to_idle_after_verdict() {
        let live = vec![(id(1), Band::Band2_4GHz, sample(-45.0, 2.0))];
        let mut analysis = RollingAnalysis::with_config(short_config(1.0));
        let t0 = Instant::now();
        analysis.begin(t0).unwrap();

        let step = Duration::from_millis(125);
        for i in 1..8u32 {
            analysis.record(t0 + step * i, &live);
        }
        let verdict = analysis.record(t0 + Duration::from_millis(1_000), &live);
        assert!(verdict.is_some());
        assert!(!analysis.is_collecting());

        // Ticks while idle are ignored.
        assert!(analysis
            .record(t0 + Duration::from_millis(1_200), &live)
            .is_none());
        // And a new run can start.
        assert!(analysis.begin(t0 + Duration::from_millis(1_300)).is_ok());
    }

    #[test]
    fn old_samples_are_evicted_from_the_front() {
        let config = AnalysisConfig {
            window: Duration::from_millis(1_000),
            min_samples: 1,
            distance_weight: 1.0,
        };
        let mut analysis = RollingAnalysis::with_config(config);
        let t0 = Instant::now();
        analysis.begin(t0).unwrap();

        // Early samples are strong, late samples weak; with eviction the
        // average must reflect only the trailing window.
        for i in 1..=4u32 {
            analysis.record(t0 + Duration::from_millis(100 * i as u64), &[(
                id(1),
                Band::Band2_4GHz,
                sample(-30.0, 1.0),
            )]);
        }
        // Jump forward so the strong samples age out, then finish.
        let verdict = analysis
            .record(t0 + Duration::from_millis(1_600), &[(
                id(1),
                Band::Band2_4GHz,
                sample(-80.0, 50.0),
            )])
            .unwrap();

        match verdict {
            Verdict::Recommendation(r) => {
                assert!((r.avg_signal - -80.0).abs() < 1e-9, "stale samples leaked in");
            }
            Verdict::NoData => panic!("one sample qualifies with min_samples = 1"),
        }
    }
}

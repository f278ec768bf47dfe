//! # wifi-sigmap-core
//!
//! Signal localization and layout engine for mapping nearby wireless
//! access points from noisy RSSI readings.
//!
//! The pipeline turns raw scan snapshots into positioned, scored
//! entities:
//!
//! - **Distance model** ([`distance`]) -- log-distance path loss with
//!   band-specific constants.
//! - **Smoothing filter** ([`smoothing`]) -- per-emitter exponential
//!   moving averages of signal and distance.
//! - **Multilateration solver** ([`localization`]) -- closed-form
//!   least-squares position from three or more vantage points.
//! - **Obstruction model** ([`obstruction`]) -- multiplicative
//!   line-of-sight attenuation through rectangular obstacles.
//! - **Radial layout engine** ([`layout`]) -- golden-angle placement
//!   with pairwise repulsion when true positions are unavailable.
//! - **Rolling analysis aggregator** ([`analysis`]) -- trailing-window
//!   scoring that recommends the best network.
//!
//! [`MapEngine`] owns all per-emitter tables and coordinates the
//! components frame by frame.

#![warn(missing_docs)]

pub mod analysis;
pub mod distance;
pub mod domain;
pub mod engine;
pub mod error;
pub mod layout;
pub mod localization;
pub mod obstruction;
pub mod smoothing;

pub use analysis::{AnalysisConfig, Recommendation, RollingAnalysis, Verdict};
pub use distance::{estimate_distance, prepare_distance_strength, DistanceStrengthPoint};
pub use domain::{percent_to_rssi, Band, Emitter, EmitterId, Obstacle};
pub use engine::{EngineConfig, MapEngine, SnapshotBundle};
pub use error::SigmapError;
pub use layout::{LayoutConfig, PlacedEmitter, RadialLayout};
pub use localization::{planar_offset, solve, GpsFix, PositionEstimate, VantagePoint};
pub use obstruction::{path_attenuation, ObstacleField, ObstacleFieldConfig};
pub use smoothing::{SmoothedSample, SmoothingFilter};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Emitter position estimation from multiple vantage points.

pub mod multilateration;
pub mod projection;

pub use multilateration::{solve, PositionEstimate, VantagePoint, SINGULARITY_EPSILON};
pub use projection::{planar_offset, GpsFix, EARTH_CIRCUMFERENCE_M, METERS_PER_DEG_LAT};

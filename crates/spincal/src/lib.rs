//! Incremental, self-correcting rotary calibration from noisy color-space
//! samples.
//!
//! An upstream producer feeds 3D color samples into a [`CalibrationEngine`];
//! the engine keeps a bounded, angularly-balanced point cloud, fits a line
//! (the "axis") through it with a warm-started Levenberg-Marquardt solve on
//! every sample, and derives the rotational phase of the newest sample around
//! that axis. Degenerate fits self-heal: when the cloud stops looking
//! disc-shaped the history is dropped and the fit restarts.
//!
//! ```
//! use spincal::{CalibrationEngine, EngineConfig, Pt3};
//!
//! # fn main() -> Result<(), spincal::ConfigError> {
//! let mut engine = CalibrationEngine::new(EngineConfig::default())?;
//!
//! // One call per observation from the sample producer.
//! engine.ingest(Pt3::new(0.8, 0.2, 0.1));
//! engine.ingest(Pt3::new(0.1, 0.7, 0.3));
//!
//! // Arm the zero reference, then read the calibrated angle.
//! engine.reset_calibrated_origin();
//! let angle = engine.calibrated_angle();
//! assert!(angle.abs() < 1e-12);
//! # Ok(())
//! # }
//! ```
//!
//! The constituent layers are re-exported: `spincal-core` for the axis frame,
//! ranges, and the balanced buffer; `spincal-optim` for the line-fit solver.

/// The calibration engine and its configuration.
pub mod engine;
/// Document-based persistence (save/load with replay).
pub mod persist;

pub use engine::{CalibrationEngine, ConfigError, EngineConfig};
pub use persist::{CalibrationDoc, PersistError};

pub use spincal_core::{AxisFrame, AxisParams, Mat4, PointCloudBuffer, Pt3, Range3, Real, Vec3};
pub use spincal_optim::{solve_axis, LineFitProblem, SolveOptions, WARM_START_ORIGIN_LIMIT};

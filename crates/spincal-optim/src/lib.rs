//! Non-linear least-squares machinery for the axis fit.
//!
//! This crate keeps the generic problem/backend split small: a dense
//! [`NllsProblem`] trait, a Levenberg-Marquardt backend, and the one concrete
//! problem the engine needs — fitting a 3D line through a live point cloud by
//! minimizing perpendicular distances, warm-started from the previous fit.

/// Levenberg-Marquardt backend over dense problems.
pub mod backend_lm;
/// The perpendicular-distance line-fit problem and warm-start policy.
pub mod linefit;
/// Problem/backend traits and solve options.
pub mod problem;

pub use backend_lm::LmBackend;
pub use linefit::{solve_axis, warm_start, LineFitProblem, WARM_START_ORIGIN_LIMIT};
pub use problem::{NllsProblem, NllsSolverBackend, SolveOptions, SolveReport};

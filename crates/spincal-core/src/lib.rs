//! Core math and geometry primitives for `spin-calibration-rs`.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Vec3`, `Pt3`, ...),
//! - the fitted-axis parameterization and its local/world frame ([`AxisParams`],
//!   [`AxisFrame`]),
//! - an axis-aligned bounding range ([`Range3`]),
//! - the bounded, sector-balanced sample history ([`PointCloudBuffer`]).
//!
//! Samples live in an arbitrary 3D "sample space" (in practice a color cube).
//! The axis frame maps sample space into a local frame whose Z axis runs along
//! the fitted line, so the rotational phase of a sample is just `atan2` over
//! its local XY coordinates.

/// Fitted-axis parameters and derived transform pair.
pub mod axis;
/// Bounded sample history with angular-sector eviction.
pub mod buffer;
/// Linear algebra type aliases and bounding ranges.
pub mod math;

pub use axis::*;
pub use buffer::*;
pub use math::*;

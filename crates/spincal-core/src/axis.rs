//! Fitted-axis parameterization and the derived local/world transform pair.
//!
//! The axis is a 3D line through `(x0, y0, 0)` and `(x0 + xz, y0 + yz, 1)`.
//! Fixing the direction's z component at 1 keeps the line from ever lying in
//! the z = 0 plane and removes the scale gauge freedom from the fit.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::math::{Mat4, Pt3, Real, Vec3};

/// Number of free parameters in the line fit.
pub const NUM_PARAMS: usize = 4;

/// Free parameters of the fitted axis: in-plane origin offset plus
/// direction slopes relative to the z axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisParams {
    /// Line origin x at z = 0.
    pub x0: Real,
    /// Line origin y at z = 0.
    pub y0: Real,
    /// Direction slope dx/dz.
    pub xz: Real,
    /// Direction slope dy/dz.
    pub yz: Real,
}

impl Default for AxisParams {
    fn default() -> Self {
        Self {
            x0: 0.0,
            y0: 0.0,
            xz: 1.0,
            yz: 1.0,
        }
    }
}

impl AxisParams {
    /// Pack into an optimization vector `[x0, y0, xz, yz]`.
    pub fn to_dvec(&self) -> DVector<Real> {
        DVector::from_vec(vec![self.x0, self.y0, self.xz, self.yz])
    }

    /// Unpack from an optimization vector `[x0, y0, xz, yz]`.
    pub fn from_dvec(x: &DVector<Real>) -> Self {
        debug_assert_eq!(x.len(), NUM_PARAMS);
        Self {
            x0: x[0],
            y0: x[1],
            xz: x[2],
            yz: x[3],
        }
    }

    /// True when both in-plane origin components lie within `[-limit, limit]`.
    pub fn origin_within(&self, limit: Real) -> bool {
        self.x0.abs() <= limit && self.y0.abs() <= limit
    }
}

/// Derived affine frame of a fitted axis.
///
/// Columns of `local_to_world`: an orthogonal X/Y pair perpendicular to the
/// line, the unnormalized direction as Z, and the line origin as translation.
/// The X/Y columns have length `1 / |direction|`, so one local unit of axial
/// travel corresponds to one sample-space unit along the line; the degeneracy
/// thresholds downstream rely on this scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisFrame {
    local_to_world: Mat4,
    world_to_local: Mat4,
}

impl Default for AxisFrame {
    fn default() -> Self {
        Self::from_params(&AxisParams::default())
    }
}

impl AxisFrame {
    /// Build the transform pair for the given parameters.
    ///
    /// A zero-length direction is unreachable (its z component is fixed at 1);
    /// should numeric underflow ever produce one, the frame falls back to
    /// identity rather than emitting NaNs.
    pub fn from_params(params: &AxisParams) -> Self {
        let origin = Vec3::new(params.x0, params.y0, 0.0);
        let z_axis = Vec3::new(params.xz, params.yz, 1.0);
        let len = z_axis.norm();
        if !len.is_normal() {
            return Self {
                local_to_world: Mat4::identity(),
                world_to_local: Mat4::identity(),
            };
        }
        let z_scale = 1.0 / len;

        // Stable XY plane perpendicular to the line; X and Y are defined
        // relative to Z and share the same length.
        let up = Vec3::y();
        let x_axis = z_axis.cross(&up).normalize() * z_scale;
        let y_axis = x_axis.cross(&z_axis).normalize() * z_scale;

        #[rustfmt::skip]
        let local_to_world = Mat4::new(
            x_axis.x, y_axis.x, z_axis.x, origin.x,
            x_axis.y, y_axis.y, z_axis.y, origin.y,
            x_axis.z, y_axis.z, z_axis.z, origin.z,
            0.0,      0.0,      0.0,      1.0,
        );
        let world_to_local = local_to_world
            .try_inverse()
            .unwrap_or_else(Mat4::identity);

        Self {
            local_to_world,
            world_to_local,
        }
    }

    pub fn local_to_world(&self) -> &Mat4 {
        &self.local_to_world
    }

    pub fn world_to_local(&self) -> &Mat4 {
        &self.world_to_local
    }

    /// Map a sample-space point into the fitted local frame.
    pub fn to_local(&self, p: Pt3) -> Pt3 {
        self.world_to_local.transform_point(&p)
    }

    /// Map a local-frame point back into sample space.
    pub fn to_world(&self, p: Pt3) -> Pt3 {
        self.local_to_world.transform_point(&p)
    }

    /// Rotational phase of a sample around the fitted axis, in radians.
    pub fn angle_of(&self, p: Pt3) -> Real {
        let local = self.to_local(p);
        local.y.atan2(local.x)
    }
}

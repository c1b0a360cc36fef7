//! Perpendicular-distance line fit over a live point cloud.
//!
//! The axis is parameterized by [`AxisParams`]: a line through
//! `x1 = (x0, y0, 0)` and `x2 = x1 + (xz, yz, 1)`. Each sample contributes one
//! residual, the squared magnitude of `(p - x1) × (p - x2)` divided by
//! `|x2 - x1|²`, so rescaling the direction vector cannot trivially shrink the
//! cost. The Jacobian is assembled with `num-dual` autodiff from the same
//! generic per-point factor that evaluates the residuals.
//!
//! The solve is warm-started from the previous fit so the axis tracks slow
//! drift in the stream instead of being recomputed from scratch; a divergence
//! guard falls back to the default parameters when the previous in-plane
//! origin has walked out of range.

use log::debug;
use nalgebra::{DMatrix, DVector, Dyn, OVector, RealField, SVector, Vector3};
use num_dual::{jacobian, DualSVec64};

use crate::{LmBackend, NllsProblem, NllsSolverBackend, SolveOptions};
use spincal_core::{AxisParams, Pt3, Real, NUM_PARAMS};

/// Warm-start bound on the in-plane origin parameters, in model units.
pub const WARM_START_ORIGIN_LIMIT: Real = 4.0;

/// Weight of the anchor residuals tying the solve to its starting point.
///
/// The buffer legitimately holds fewer samples than there are parameters
/// right after a (re)start; the anchor block keeps the system overdetermined
/// in that regime. Its pull is orders of magnitude below the data residuals
/// and does not move a well-constrained fit measurably.
const ANCHOR_WEIGHT: Real = 1e-7;

/// Starting point for the next solve.
///
/// Returns the previous parameters unchanged while they are trustworthy;
/// once either in-plane origin component drifts outside
/// [`WARM_START_ORIGIN_LIMIT`] the stale solution is discarded and the solve
/// restarts from the defaults, which keeps the optimizer out of unrecoverable
/// regions after a bad update.
pub fn warm_start(prev: AxisParams) -> AxisParams {
    if prev.origin_within(WARM_START_ORIGIN_LIMIT) {
        prev
    } else {
        debug!(
            "warm start out of range (x0={:.3}, y0={:.3}); restarting from defaults",
            prev.x0, prev.y0
        );
        AxisParams::default()
    }
}

/// Per-point residual factor, generic so autodiff can flow through it.
fn point_residual<T: RealField>(params: &SVector<T, NUM_PARAMS>, point: &Pt3) -> T {
    let x1 = Vector3::new(params[0].clone(), params[1].clone(), T::zero());
    let dir = Vector3::new(params[2].clone(), params[3].clone(), T::one());
    let x2 = x1.clone() + dir.clone();

    let p = Vector3::new(
        T::from_f64(point.x).unwrap(),
        T::from_f64(point.y).unwrap(),
        T::from_f64(point.z).unwrap(),
    );

    let cross = (p.clone() - x1).cross(&(p - x2));
    cross.norm_squared() / dir.norm_squared()
}

/// Anchor factor for one parameter component.
fn anchor_residual<T: RealField>(param: T, anchor: Real) -> T {
    (param - T::from_f64(anchor).unwrap()) * T::from_f64(ANCHOR_WEIGHT).unwrap()
}

/// Line-fit problem over a borrowed slice of samples.
///
/// Residual layout: one perpendicular-distance row per sample, followed by
/// [`NUM_PARAMS`] weakly-weighted anchor rows around the starting parameters.
#[derive(Debug, Clone)]
pub struct LineFitProblem<'a> {
    points: &'a [Pt3],
    anchor: AxisParams,
}

impl<'a> LineFitProblem<'a> {
    pub fn new(points: &'a [Pt3], anchor: AxisParams) -> Self {
        Self { points, anchor }
    }

    fn assemble<T: RealField>(&self, p: &SVector<T, NUM_PARAMS>) -> OVector<T, Dyn> {
        let anchor = self.anchor.to_dvec();
        OVector::<T, Dyn>::from_iterator(
            self.num_residuals(),
            self.points
                .iter()
                .map(|pt| point_residual(p, pt))
                .chain((0..NUM_PARAMS).map(|i| anchor_residual(p[i].clone(), anchor[i]))),
        )
    }
}

impl NllsProblem for LineFitProblem<'_> {
    fn num_params(&self) -> usize {
        NUM_PARAMS
    }

    fn num_residuals(&self) -> usize {
        self.points.len() + NUM_PARAMS
    }

    fn residuals(&self, x: &DVector<Real>) -> DVector<Real> {
        debug_assert_eq!(x.len(), NUM_PARAMS);
        let p = SVector::<Real, NUM_PARAMS>::from_column_slice(x.as_slice());
        self.assemble(&p)
    }

    fn jacobian(&self, x: &DVector<Real>) -> DMatrix<Real> {
        debug_assert_eq!(x.len(), NUM_PARAMS);
        let p0 = SVector::<Real, NUM_PARAMS>::from_column_slice(x.as_slice());
        let (_r, j) = jacobian(
            |p: SVector<DualSVec64<NUM_PARAMS>, NUM_PARAMS>| self.assemble(&p),
            p0,
        );

        let mut out = DMatrix::zeros(self.num_residuals(), NUM_PARAMS);
        for r in 0..j.nrows() {
            for c in 0..NUM_PARAMS {
                out[(r, c)] = j[(r, c)];
            }
        }
        out
    }
}

/// Refine the axis parameters against the current samples.
///
/// Warm-started from `prev` (subject to the divergence guard). Never fails
/// outward: if the optimizer cannot improve the fit the returned parameters
/// are simply the starting point, and judging whether the fit is still
/// plausible is left to the engine's degeneracy check.
pub fn solve_axis(points: &[Pt3], prev: AxisParams, opts: &SolveOptions) -> AxisParams {
    let start = warm_start(prev);
    if points.is_empty() {
        return start;
    }

    let problem = LineFitProblem::new(points, start);
    let (x_opt, report) = LmBackend.solve(&problem, start.to_dvec(), opts);
    if !report.converged {
        debug!(
            "axis solve did not converge after {} evaluations (cost {:.3e})",
            report.iterations, report.final_cost
        );
    }
    AxisParams::from_dvec(&x_opt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn residual_is_zero_for_points_on_the_line() {
        let params = AxisParams {
            x0: 0.2,
            y0: -0.4,
            xz: 0.5,
            yz: 0.1,
        };
        let x = params.to_dvec();

        // Points sampled along the parameterized line itself; the anchor rows
        // are also zero because the anchor sits at the evaluated parameters.
        let points: Vec<Pt3> = [-1.0, 0.0, 2.5]
            .iter()
            .map(|&t| {
                Pt3::new(
                    params.x0 + t * params.xz,
                    params.y0 + t * params.yz,
                    t,
                )
            })
            .collect();

        let problem = LineFitProblem::new(&points, params);
        let r = problem.residuals(&x);
        assert_eq!(r.len(), points.len() + NUM_PARAMS);
        for i in 0..r.len() {
            assert_relative_eq!(r[i], 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn residual_scales_with_perpendicular_offset() {
        let params = AxisParams {
            x0: 0.0,
            y0: 0.0,
            xz: 0.0,
            yz: 0.0,
        };

        // Unit offset from the z axis: squared distance 1, direction length 1.
        let points = [Pt3::new(1.0, 0.0, 0.0)];
        let problem = LineFitProblem::new(&points, params);
        let r = problem.residuals(&params.to_dvec());
        assert_relative_eq!(r[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn autodiff_jacobian_matches_finite_differences() {
        let points = [
            Pt3::new(0.3, 0.8, 0.1),
            Pt3::new(-0.5, 0.2, 0.9),
            Pt3::new(0.7, -0.4, 0.5),
        ];
        let problem = LineFitProblem::new(&points, AxisParams::default());
        let x = DVector::from_vec(vec![0.1, -0.2, 0.8, 1.1]);

        let j = problem.jacobian(&x);
        let h = 1e-7;
        for c in 0..NUM_PARAMS {
            let mut xp = x.clone();
            let mut xm = x.clone();
            xp[c] += h;
            xm[c] -= h;
            let rp = problem.residuals(&xp);
            let rm = problem.residuals(&xm);
            for r in 0..problem.num_residuals() {
                let fd = (rp[r] - rm[r]) / (2.0 * h);
                assert_relative_eq!(j[(r, c)], fd, epsilon = 1e-5, max_relative = 1e-4);
            }
        }
    }

    #[test]
    fn warm_start_keeps_in_range_parameters() {
        let prev = AxisParams {
            x0: 3.9,
            y0: -3.9,
            xz: 0.7,
            yz: 0.2,
        };
        assert_eq!(warm_start(prev), prev);
    }

    #[test]
    fn warm_start_resets_out_of_range_parameters() {
        let stale = AxisParams {
            x0: 4.5,
            y0: 0.0,
            xz: 0.7,
            yz: 0.2,
        };
        assert_eq!(warm_start(stale), AxisParams::default());

        let stale_y = AxisParams {
            x0: 0.0,
            y0: -6.0,
            xz: 0.7,
            yz: 0.2,
        };
        assert_eq!(warm_start(stale_y), AxisParams::default());
    }
}

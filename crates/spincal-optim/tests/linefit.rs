//! Integration tests for the warm-started axis fit.

use spincal_core::{AxisParams, Pt3};
use spincal_optim::{solve_axis, LineFitProblem, NllsProblem, SolveOptions};

#[test]
fn fit_converges_on_the_z_axis() {
    // Three samples lying exactly on the line through (0,0,0) and (0,0,1).
    let points = [
        Pt3::new(0.0, 0.0, 0.0),
        Pt3::new(0.0, 0.0, 1.0),
        Pt3::new(0.0, 0.0, 2.0),
    ];

    let fitted = solve_axis(&points, AxisParams::default(), &SolveOptions::default());

    assert!(
        fitted.xz.abs() < 1e-2 && fitted.yz.abs() < 1e-2,
        "direction xy components should vanish, got ({}, {})",
        fitted.xz,
        fitted.yz
    );

    let problem = LineFitProblem::new(&points, fitted);
    let r = problem.residuals(&fitted.to_dvec());
    for i in 0..points.len() {
        assert!(r[i].abs() < 1e-6, "residual {} did not vanish: {}", i, r[i]);
    }
}

#[test]
fn fit_recovers_a_helix_axis() {
    // A helix winding around the z axis: plenty of axial spread, so the
    // best-fit line is the helix axis.
    let turns = 4.0;
    let radius = 0.25;
    let n = 40;
    let points: Vec<Pt3> = (0..n)
        .map(|i| {
            let t = i as f64 / n as f64;
            let theta = std::f64::consts::TAU * turns * t;
            Pt3::new(radius * theta.cos(), radius * theta.sin(), 8.0 * t)
        })
        .collect();

    let fitted = solve_axis(&points, AxisParams::default(), &SolveOptions::default());

    assert!(
        fitted.xz.abs() < 0.1 && fitted.yz.abs() < 0.1,
        "fitted direction strays from the helix axis: ({}, {})",
        fitted.xz,
        fitted.yz
    );
    assert!(
        fitted.x0.abs() < 0.3 && fitted.y0.abs() < 0.3,
        "fitted origin strays from the helix axis: ({}, {})",
        fitted.x0,
        fitted.y0
    );
}

#[test]
fn single_sample_solve_stays_finite() {
    let points = [Pt3::new(0.4, 0.6, 0.2)];
    let fitted = solve_axis(&points, AxisParams::default(), &SolveOptions::default());
    for v in [fitted.x0, fitted.y0, fitted.xz, fitted.yz] {
        assert!(v.is_finite());
    }
}

#[test]
fn out_of_range_warm_start_still_converges() {
    let points = [
        Pt3::new(0.0, 0.0, 0.0),
        Pt3::new(0.0, 0.0, 1.0),
        Pt3::new(0.0, 0.0, 2.0),
    ];
    // The stale origin lies outside the ±4 guard; the solve restarts from the
    // defaults instead of the runaway parameters.
    let stale = AxisParams {
        x0: 40.0,
        y0: -40.0,
        xz: 5.0,
        yz: 5.0,
    };

    let fitted = solve_axis(&points, stale, &SolveOptions::default());
    assert!(
        fitted.x0.abs() < 1.0 && fitted.y0.abs() < 1.0,
        "solve should not stay near the runaway origin: ({}, {})",
        fitted.x0,
        fitted.y0
    );
}

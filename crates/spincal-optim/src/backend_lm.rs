use crate::{NllsProblem, NllsSolverBackend, SolveOptions, SolveReport};
use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt, MinimizationReport};
use nalgebra::{storage::Owned, DMatrix, DVector, Dyn};
use spincal_core::Real;

/// Adapter presenting a dense [`NllsProblem`] to the `levenberg-marquardt`
/// crate's [`LeastSquaresProblem`] interface.
struct DenseLmAdapter<'a, P: NllsProblem> {
    problem: &'a P,
    params: DVector<Real>,
}

impl<'a, P: NllsProblem> DenseLmAdapter<'a, P> {
    fn new(problem: &'a P, x0: DVector<Real>) -> Self {
        debug_assert_eq!(x0.len(), problem.num_params());
        Self {
            problem,
            params: x0,
        }
    }
}

impl<'a, P: NllsProblem> LeastSquaresProblem<Real, Dyn, Dyn> for DenseLmAdapter<'a, P> {
    type ResidualStorage = Owned<Real, Dyn>;
    type JacobianStorage = Owned<Real, Dyn, Dyn>;
    type ParameterStorage = Owned<Real, Dyn>;

    fn set_params(&mut self, x: &DVector<Real>) {
        self.params.clone_from(x);
    }

    fn params(&self) -> DVector<Real> {
        self.params.clone()
    }

    fn residuals(&self) -> Option<DVector<Real>> {
        let r = self.problem.residuals(&self.params);
        debug_assert_eq!(r.len(), self.problem.num_residuals());
        Some(r)
    }

    fn jacobian(&self) -> Option<DMatrix<Real>> {
        let j = self.problem.jacobian(&self.params);
        debug_assert_eq!(j.nrows(), self.problem.num_residuals());
        debug_assert_eq!(j.ncols(), self.problem.num_params());
        Some(j)
    }
}

fn to_solve_report(report: &MinimizationReport<Real>) -> SolveReport {
    SolveReport {
        // The crate counts function evaluations, not outer iterations; with
        // the MINPACK patience convention that is the meaningful budget.
        iterations: report.number_of_evaluations,
        final_cost: report.objective_function,
        converged: report.termination.was_successful(),
    }
}

/// Levenberg-Marquardt backend over the `levenberg-marquardt` crate.
///
/// Never fails outward: when the optimizer cannot improve the residual it
/// returns the last parameter vector it evaluated, and the report's
/// `converged` flag tells the caller how the run ended.
#[derive(Debug, Default, Clone)]
pub struct LmBackend;

impl NllsSolverBackend for LmBackend {
    fn solve<P: NllsProblem>(
        &self,
        problem: &P,
        x0: DVector<Real>,
        opts: &SolveOptions,
    ) -> (DVector<Real>, SolveReport) {
        let lm = LevenbergMarquardt::new()
            .with_ftol(opts.ftol)
            .with_xtol(opts.xtol)
            .with_gtol(opts.gtol)
            .with_patience(opts.max_iters.max(1));

        let (adapter, report) = lm.minimize(DenseLmAdapter::new(problem, x0));
        (adapter.params(), to_solve_report(&report))
    }
}

//! Pointwise Newton-Raphson solve of the stage residual.

use faer::{Mat, linalg::solvers::Solve};

use super::{ImplicitSolver, SolveStats, SolverError, StageResidual};
use crate::grid::GridField;
use crate::time::ConfigError;

/// Newton iteration parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct NewtonConfig {
    /// Iterations per cell before giving up.
    pub max_iterations: usize,
    /// Converged when the max-norm of the residual drops below this.
    pub abs_tolerance: f64,
    /// Or below this fraction of the initial residual.
    pub rel_tolerance: f64,
    /// Relative step of the finite-difference Jacobian.
    pub jacobian_epsilon: f64,
    /// Smallest line-search step before the full step is taken anyway.
    pub min_step_fraction: f64,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            abs_tolerance: 1e-10,
            rel_tolerance: 1e-12,
            jacobian_epsilon: 4e-8,
            min_step_fraction: 1.0 / 64.0,
        }
    }
}

impl NewtonConfig {
    /// Set the iteration limit.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the absolute tolerance.
    pub fn with_abs_tolerance(mut self, tol: f64) -> Self {
        self.abs_tolerance = tol;
        self
    }

    /// Check the parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations == 0 {
            return Err(ConfigError::Parameter {
                name: "max_iterations",
                value: 0.0,
            });
        }
        for (name, value) in [
            ("abs_tolerance", self.abs_tolerance),
            ("jacobian_epsilon", self.jacobian_epsilon),
            ("min_step_fraction", self.min_step_fraction),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::Parameter { name, value });
            }
        }
        Ok(())
    }
}

/// Newton-Raphson with a forward-difference Jacobian and backtracking line
/// search, applied independently at every interior cell.
///
/// With the `parallel` feature the cells are solved on the rayon pool.
#[derive(Clone, Debug, Default)]
pub struct NewtonSolver {
    config: NewtonConfig,
}

impl NewtonSolver {
    /// Create a solver.
    pub fn new(config: NewtonConfig) -> Self {
        Self { config }
    }

    /// Iteration parameters.
    pub fn config(&self) -> &NewtonConfig {
        &self.config
    }

    /// Solve `R(x) = 0` at one cell starting from `x`.
    ///
    /// Returns the number of iterations and the final residual norm.
    pub fn solve_cell(
        &self,
        residual: &dyn StageResidual,
        cell: usize,
        x: &mut [f64],
    ) -> Result<(usize, f64), SolverError> {
        let n = x.len();
        let cfg = &self.config;

        let mut r = vec![0.0; n];
        let mut r_trial = vec![0.0; n];
        let mut x_trial = vec![0.0; n];
        let mut jac = Mat::<f64>::zeros(n, n);
        let mut rhs = Mat::<f64>::zeros(n, 1);

        residual.residual(cell, x, &mut r);
        let mut norm = max_norm(&r);
        if !norm.is_finite() {
            return Err(SolverError::NonFiniteResidual { cell, iteration: 0 });
        }
        let tolerance = cfg.abs_tolerance.max(cfg.rel_tolerance * norm);

        for iteration in 0..cfg.max_iterations {
            if norm <= tolerance {
                log::trace!("cell {cell}: converged in {iteration} iterations, |R| = {norm:.3e}");
                return Ok((iteration, norm));
            }

            for j in 0..n {
                let h = cfg.jacobian_epsilon * (1.0 + x[j].abs());
                x_trial.copy_from_slice(x);
                x_trial[j] += h;
                residual.residual(cell, &x_trial, &mut r_trial);
                for i in 0..n {
                    jac[(i, j)] = (r_trial[i] - r[i]) / h;
                }
            }
            for i in 0..n {
                rhs[(i, 0)] = -r[i];
            }

            let lu = jac.as_ref().full_piv_lu();
            let dx = lu.solve(&rhs);
            if (0..n).any(|i| !dx[(i, 0)].is_finite()) {
                return Err(SolverError::SingularJacobian { cell, iteration });
            }

            let mut step = 1.0;
            loop {
                for i in 0..n {
                    x_trial[i] = x[i] + step * dx[(i, 0)];
                }
                residual.residual(cell, &x_trial, &mut r_trial);
                let trial_norm = max_norm(&r_trial);
                if trial_norm < norm || step <= cfg.min_step_fraction {
                    break;
                }
                step *= 0.5;
            }

            x.copy_from_slice(&x_trial);
            std::mem::swap(&mut r, &mut r_trial);
            norm = max_norm(&r);
            if !norm.is_finite() {
                return Err(SolverError::NonFiniteResidual {
                    cell,
                    iteration: iteration + 1,
                });
            }
        }

        if norm <= tolerance {
            return Ok((cfg.max_iterations, norm));
        }
        Err(SolverError::NotConverged {
            cell,
            iterations: cfg.max_iterations,
            residual: norm,
        })
    }
}

impl ImplicitSolver for NewtonSolver {
    fn solve(&self, residual: &dyn StageResidual, prim: &mut GridField) -> Result<SolveStats, SolverError> {
        let shape = *prim.shape();
        let cells: Vec<usize> = shape.interior_indices().collect();
        let n = prim.num_vars();

        let solve_one = |&cell: &usize| -> Result<(usize, Vec<f64>, usize, f64), SolverError> {
            let mut x = vec![0.0; n];
            prim.gather(cell, &mut x);
            let (iterations, norm) = self.solve_cell(residual, cell, &mut x)?;
            Ok((cell, x, iterations, norm))
        };

        #[cfg(feature = "parallel")]
        let solutions: Vec<_> = {
            use rayon::prelude::*;
            cells.par_iter().map(solve_one).collect::<Result<_, _>>()?
        };
        #[cfg(not(feature = "parallel"))]
        let solutions: Vec<_> = cells.iter().map(solve_one).collect::<Result<_, _>>()?;

        let mut stats = SolveStats::default();
        for (cell, x, iterations, norm) in solutions {
            prim.scatter(cell, &x);
            stats.record(iterations, norm);
        }
        Ok(stats)
    }

    fn name(&self) -> &'static str {
        "newton"
    }
}

/// Max-norm that propagates NaN.
#[inline]
fn max_norm(r: &[f64]) -> f64 {
    let mut norm: f64 = 0.0;
    for &v in r {
        if v.is_nan() {
            return f64::NAN;
        }
        norm = norm.max(v.abs());
    }
    norm
}

//! Implicit solve of one time-stepper stage.
//!
//! The time stepper freezes everything that does not depend on the new
//! primitives (divergence of fluxes, explicit sources, old conserved
//! variables) and hands the remaining pointwise residual to an
//! [`ImplicitSolver`]. Cells are independent, so the system decouples into
//! one small nonlinear system per interior cell.
//!
//! # Solver Trait
//!
//! - [`NewtonSolver`]: Newton-Raphson with a finite-difference Jacobian and a
//!   dense LU solve
//! - [`IdentitySolve`]: leaves the guess untouched; a test double for the
//!   orchestration
//!
//! # Example
//!
//! ```
//! use grmhd_rs::grid::{CoordinateGrid, GridField, GridShape};
//! use grmhd_rs::solver::{ImplicitSolver, NewtonSolver, StageResidual};
//!
//! // x² = 2 at every cell.
//! struct Sqrt2;
//! impl StageResidual for Sqrt2 {
//!     fn residual(&self, _cell: usize, x: &[f64], out: &mut [f64]) {
//!         out[0] = x[0] * x[0] - 2.0;
//!     }
//! }
//!
//! let shape = GridShape::new(1, [4, 1, 1], 2).unwrap();
//! let mut prim = GridField::new(&CoordinateGrid::unit(shape), 1);
//! prim.fill(0, 1.0);
//!
//! NewtonSolver::default().solve(&Sqrt2, &mut prim).unwrap();
//! assert!((prim.var(0)[3] - 2.0_f64.sqrt()).abs() < 1e-10);
//! ```

mod newton;

pub use newton::{NewtonConfig, NewtonSolver};

use thiserror::Error;

use crate::grid::GridField;

// =============================================================================
// Traits
// =============================================================================

/// Pointwise residual of a stage, `R(x) = 0` at the solution.
pub trait StageResidual: Sync {
    /// Residual at interior cell `cell` for trial primitives `x`.
    ///
    /// `out` has the same length as `x`.
    fn residual(&self, cell: usize, x: &[f64], out: &mut [f64]);
}

/// Nonlinear solve of a stage.
pub trait ImplicitSolver: Send + Sync {
    /// Overwrite the interior of `prim`, which holds the initial guess, with
    /// primitives at which `residual` vanishes to the solver's tolerance.
    ///
    /// On error the contents of `prim` are unspecified.
    fn solve(&self, residual: &dyn StageResidual, prim: &mut GridField) -> Result<SolveStats, SolverError>;

    /// Human-readable name for debugging and logging.
    fn name(&self) -> &'static str;
}

// =============================================================================
// Results and errors
// =============================================================================

/// Convergence summary of one solve.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SolveStats {
    /// Cells solved.
    pub cells: usize,
    /// Iterations summed over cells.
    pub total_iterations: usize,
    /// Most iterations any cell needed.
    pub max_iterations: usize,
    /// Largest final residual norm.
    pub max_residual: f64,
}

impl SolveStats {
    /// Add one cell's result.
    pub fn record(&mut self, iterations: usize, residual: f64) {
        self.cells += 1;
        self.total_iterations += iterations;
        self.max_iterations = self.max_iterations.max(iterations);
        self.max_residual = self.max_residual.max(residual);
    }
}

/// Failures of the implicit solve.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolverError {
    /// The residual stayed above tolerance.
    #[error("Newton iteration did not converge at cell {cell} after {iterations} iterations (|R| = {residual:.3e})")]
    NotConverged {
        cell: usize,
        iterations: usize,
        residual: f64,
    },

    /// The residual became NaN or infinite, usually from unphysical
    /// primitives or a degenerate metric.
    #[error("Non-finite residual at cell {cell} (iteration {iteration})")]
    NonFiniteResidual { cell: usize, iteration: usize },

    /// The Jacobian could not be inverted.
    #[error("Singular Jacobian at cell {cell} (iteration {iteration})")]
    SingularJacobian { cell: usize, iteration: usize },
}

// =============================================================================
// Identity
// =============================================================================

/// Leaves the guess untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentitySolve;

impl ImplicitSolver for IdentitySolve {
    fn solve(&self, _residual: &dyn StageResidual, prim: &mut GridField) -> Result<SolveStats, SolverError> {
        Ok(SolveStats {
            cells: prim.shape().interior_len(),
            ..Default::default()
        })
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}

//! Time integration.
//!
//! [`TimeStepper`] advances the primitives with a two-stage
//! predictor-corrector scheme. Each stage freezes the fluxes and explicit
//! sources at the "old" level of the stage and solves the pointwise
//! conservation law for the new primitives with an injected
//! [`ImplicitSolver`](crate::solver::ImplicitSolver):
//!
//! | Stage     | Old level | Fluxes from | Δt     | New level |
//! |-----------|-----------|-------------|--------|-----------|
//! | Half step | `t`       | `t`         | `dt/2` | `t + dt/2`|
//! | Full step | `t`       | `t + dt/2`  | `dt`   | `t + dt`  |
//!
//! Problem-specific ghost zones and diagnostics plug in through
//! [`ProblemBoundary`] and [`StepDiagnostics`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use grmhd_rs::geometry::Minkowski;
//! use grmhd_rs::grid::{CoordinateGrid, GridShape};
//! use grmhd_rs::time::{TimeStepper, TimeStepperConfig};
//! use grmhd_rs::types::vars;
//!
//! let shape = GridShape::new(1, [10, 1, 1], 2).unwrap();
//! let coords = CoordinateGrid::unit(shape);
//! let mut stepper =
//!     TimeStepper::new(TimeStepperConfig::new(0.01), coords, Arc::new(Minkowski)).unwrap();
//! stepper.initialize(|_, prim| {
//!     prim[vars::RHO] = 1.0;
//!     prim[vars::UU] = 1.0;
//! });
//!
//! stepper.time_step().unwrap();
//! assert!((stepper.time() - 0.01).abs() < 1e-15);
//! ```

mod config;
mod error;
mod hooks;
mod residual;
mod stepper;

pub use config::{ConfigError, TimeStepperConfig};
pub use error::{Stage, TimeStepError};
pub use hooks::{LogDiagnostics, NoBoundary, NoDiagnostics, ProblemBoundary, StepDiagnostics};
pub use stepper::TimeStepper;

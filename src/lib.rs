//! # grmhd-rs
//!
//! A structured-grid finite-volume solver for general relativistic
//! magnetohydrodynamics on a fixed background spacetime.
//!
//! This crate provides the core building blocks:
//! - Ghosted structured grids and halo exchange
//! - Metric, lapse and connection coefficients on the grid (Minkowski,
//!   modified Kerr-Schild)
//! - Fluid state derivation: four-velocity, magnetic four-vector,
//!   stress-energy tensor, fluxes, sources and characteristic speeds
//! - Face reconstruction (limited linear, WENO5)
//! - Local Lax-Friedrichs face fluxes and constrained transport
//! - Pointwise Newton solve of the implicit stage equations
//! - Two-stage predictor-corrector time stepping (half step, full step)
//! - Optional dissipative extension: heat flux and pressure anisotropy
//!
//! Unphysical primitives are not floored: they propagate as non-finite
//! derived quantities, and the implicit solve reports them as
//! [`SolverError::NonFiniteResidual`].

pub mod flux;
pub mod geometry;
pub mod grid;
pub mod physics;
pub mod reconstruction;
pub mod simulation;
pub mod solver;
pub mod time;
pub mod types;

// Re-export main types for convenience
pub use flux::{RiemannSolver, compute_div_b, flux_ct, lax_friedrichs_flux};
pub use geometry::{Geometry, MetricLaw, Minkowski, ModifiedKerrSchild, PointMetric, StandardMetric};
pub use grid::{
    AxisBoundaries, BoundaryKind, CoordinateGrid, GridError, GridField, GridShape, HaloExchange,
    LocalHalo,
};
pub use physics::{EmhdGradients, FluidElement, FluidState, PhysicsConfig};
pub use reconstruction::ReconstructionScheme;
pub use simulation::{Simulation, SimulationConfig, SimulationResult};
pub use solver::{
    IdentitySolve, ImplicitSolver, NewtonConfig, NewtonSolver, SolveStats, SolverError,
    StageResidual,
};
pub use time::{
    ConfigError, LogDiagnostics, NoBoundary, NoDiagnostics, ProblemBoundary, Stage,
    StepDiagnostics, TimeStepError, TimeStepper, TimeStepperConfig,
};
pub use types::{AccessCounts, Direction, Location, NDIM, vars};

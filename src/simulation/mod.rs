//! Simulation runner abstraction.
//!
//! This module provides a high-level interface for running a
//! [`TimeStepper`](crate::time::TimeStepper) to a final time:
//! - CFL-limited time step selection, capped by `dt_max`
//! - Retry of failed implicit solves with a halved time step
//! - Callbacks and progress logging
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use grmhd_rs::geometry::Minkowski;
//! use grmhd_rs::grid::{CoordinateGrid, GridShape};
//! use grmhd_rs::simulation::Simulation;
//! use grmhd_rs::time::{TimeStepper, TimeStepperConfig};
//! use grmhd_rs::types::vars;
//!
//! let shape = GridShape::new(1, [16, 1, 1], 2).unwrap();
//! let coords = CoordinateGrid::unit(shape);
//! let mut stepper =
//!     TimeStepper::new(TimeStepperConfig::default(), coords, Arc::new(Minkowski)).unwrap();
//! stepper.initialize(|_, prim| {
//!     prim[vars::RHO] = 1.0;
//!     prim[vars::UU] = 0.1;
//! });
//!
//! let result = Simulation::new()
//!     .with_cfl(0.4)
//!     .with_dt_max(0.01)
//!     .run(&mut stepper, 0.02);
//! assert!(result.success);
//! ```

mod runner;

pub use runner::{Simulation, SimulationConfig, SimulationResult};

//! Fluid physics: from primitive variables to fluxes and sources.
//!
//! - [`PhysicsConfig`]: equation of state and dissipative closures
//! - [`FluidState`]: pure pointwise derivation of four-velocity, magnetic
//!   four-vector and stress-energy tensor, with fluxes, sources and
//!   characteristic speeds
//! - [`FluidElement`]: a [`FluidState`] at every point of a grid
//! - [`EmhdGradients`]: spatial gradients consumed by the heat-flux and
//!   pressure-anisotropy closures
//!
//! # Conservation law
//!
//! ```text
//! ∂_t U + ∂_i F^i = S
//! U    = g (ρu^0, T^0_0 + ρu^0, T^0_j, B^j, ...)
//! F^i  = g (ρu^i, T^i_0 + ρu^i, T^i_j, b^j u^i - b^i u^j, ...)
//! S    = g (0, T^κ_λ Γ^λ_{κν}, 0, ...)
//! ```
//!
//! # Example
//!
//! ```
//! use grmhd_rs::geometry::{Minkowski, PointMetric};
//! use grmhd_rs::physics::{FluidState, PhysicsConfig};
//!
//! let physics = PhysicsConfig::new(5.0 / 3.0);
//! let metric = PointMetric::evaluate(&Minkowski, [0.0; 3]);
//! let prim = [1.0, 1.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
//!
//! let state = FluidState::from_primitives(&prim, &metric, &physics);
//! assert!((state.pressure - 1.0).abs() < 1e-14);
//! ```

mod config;
mod element;
mod state;

pub use config::PhysicsConfig;
pub use element::FluidElement;
pub use state::{B_SQR_FLOOR, EmhdGradients, FluidState};

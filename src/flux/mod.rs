//! Numerical fluxes at cell faces.
//!
//! - [`RiemannSolver`]: reconstructs face states along one axis and combines
//!   the two sides with the local Lax-Friedrichs rule
//! - [`lax_friedrichs_flux`]: the pointwise combination rule
//! - [`flux_ct`]: constrained-transport correction of the induction fluxes
//! - [`compute_div_b`]: the divergence of the magnetic field that
//!   [`flux_ct`] preserves
//!
//! No checks are made on the face states: a left or right state with
//! non-finite derived quantities yields a non-finite flux.

mod constrained_transport;
mod riemann;

pub use constrained_transport::{compute_div_b, flux_ct};
pub use riemann::{RiemannSolver, lax_friedrichs_flux};

//! Problem-specific hooks invoked by the time stepper.

use crate::grid::{CoordinateGrid, GridField};

/// Problem-specific ghost-zone values, applied after the halo exchange.
///
/// Implementations overwrite ghost cells of `prim` in place and must leave
/// interior cells untouched.
pub trait ProblemBoundary: Send + Sync {
    /// Overwrite ghost zones of `prim`.
    fn apply(&self, coords: &CoordinateGrid, prim: &mut GridField);

    /// Human-readable name for debugging and logging.
    fn name(&self) -> &'static str {
        "custom"
    }
}

/// Leaves the ghost zones as the halo exchange filled them.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoBoundary;

impl ProblemBoundary for NoBoundary {
    fn apply(&self, _coords: &CoordinateGrid, _prim: &mut GridField) {}

    fn name(&self) -> &'static str {
        "none"
    }
}

impl<F> ProblemBoundary for F
where
    F: Fn(&CoordinateGrid, &mut GridField) + Send + Sync,
{
    fn apply(&self, coords: &CoordinateGrid, prim: &mut GridField) {
        self(coords, prim)
    }
}

/// Side-effecting observers called after each stage.
pub trait StepDiagnostics: Send {
    /// Called with the half-step primitives at `time + dt/2`.
    fn half_step(&mut self, _time: f64, _coords: &CoordinateGrid, _prim: &GridField) {}

    /// Called with the new primitives at `time + dt`.
    fn full_step(&mut self, _time: f64, _coords: &CoordinateGrid, _prim: &GridField) {}
}

/// No diagnostics.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDiagnostics;

impl StepDiagnostics for NoDiagnostics {}

/// Logs the interior extrema of the density after each full step.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogDiagnostics;

impl StepDiagnostics for LogDiagnostics {
    fn full_step(&mut self, time: f64, _coords: &CoordinateGrid, prim: &GridField) {
        let shape = prim.shape();
        let rho = prim.var(crate::types::vars::RHO);
        let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
        for idx in shape.interior_indices() {
            lo = lo.min(rho[idx]);
            hi = hi.max(rho[idx]);
        }
        log::info!("t = {time:.6e}: rho in [{lo:.6e}, {hi:.6e}]");
    }
}

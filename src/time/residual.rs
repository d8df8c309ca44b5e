//! Pointwise residual of one stage of the update.

use crate::geometry::Geometry;
use crate::grid::GridField;
use crate::physics::{FluidElement, FluidState, PhysicsConfig};
use crate::solver::StageResidual;
use crate::types::vars::MAX_VARS;

/// Residual of the semi-discrete conservation law at one stage,
///
/// ```text
/// R(x) = (U(x) - U_old) / Δt + ∇·F - S_explicit - S_implicit
/// ```
///
/// where every term except `U(x)` and `S_implicit` is frozen before the
/// solve. At the half step `S_implicit = S(x)`; at the full step it is the
/// average of `S(x)` and its value at the old level.
pub(crate) struct ConservationResidual<'a> {
    pub physics: &'a PhysicsConfig,
    pub geom: &'a Geometry,
    pub cons_old: &'a GridField,
    pub div_fluxes: &'a GridField,
    pub sources_explicit: &'a GridField,
    pub sources_implicit_old: Option<&'a GridField>,
    pub elem_old: &'a FluidElement,
    pub elem_grad: &'a FluidElement,
    pub dt_stage: f64,
}

impl StageResidual for ConservationResidual<'_> {
    fn residual(&self, cell: usize, x: &[f64], out: &mut [f64]) {
        let n = x.len();
        let point = self.geom.point(cell);
        let mut state = FluidState::from_primitives(x, point, self.physics);
        if self.physics.emhd() {
            state.set_parameters(self.physics);
        }

        let mut cons = [0.0; MAX_VARS];
        state.conserved(point.g, &mut cons[..n]);

        let mut implicit = [0.0; MAX_VARS];
        if self.physics.emhd() {
            state.implicit_sources(
                point,
                self.elem_old.state(cell),
                self.elem_grad.gradients(cell),
                self.dt_stage,
                &mut implicit[..n],
            );
        }

        for k in 0..n {
            let s_implicit = match self.sources_implicit_old {
                Some(old) => 0.5 * (old.var(k)[cell] + implicit[k]),
                None => implicit[k],
            };
            out[k] = (cons[k] - self.cons_old.var(k)[cell]) / self.dt_stage
                + self.div_fluxes.var(k)[cell]
                - self.sources_explicit.var(k)[cell]
                - s_implicit;
        }
    }
}

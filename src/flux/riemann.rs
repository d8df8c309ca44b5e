//! Local Lax-Friedrichs face fluxes.

use crate::geometry::Geometry;
use crate::grid::{CoordinateGrid, GridField};
use crate::physics::{FluidElement, PhysicsConfig};
use crate::reconstruction::ReconstructionScheme;
use crate::types::{AccessCounts, Direction};

/// Local Lax-Friedrichs (Rusanov) flux for one face.
///
/// ```text
/// F* = ½ (F_L + F_R) - ½ c_max (U_R - U_L)
/// ```
///
/// where `c_max` is the largest characteristic speed magnitude on either
/// side.
#[inline]
pub fn lax_friedrichs_flux(
    flux_left: &[f64],
    flux_right: &[f64],
    cons_left: &[f64],
    cons_right: &[f64],
    c_max: f64,
    out: &mut [f64],
) {
    for (k, f) in out.iter_mut().enumerate() {
        *f = 0.5 * (flux_left[k] + flux_right[k]) - 0.5 * c_max * (cons_right[k] - cons_left[k]);
    }
}

/// Face-flux solver with its own working set.
///
/// The flux stored at index `i` along an axis belongs to the face `i - ½`,
/// between cells `i - 1` and `i`. Its left state is the upper-face value of
/// cell `i - 1` and its right state the lower-face value of cell `i`.
#[derive(Clone, Debug)]
pub struct RiemannSolver {
    scheme: ReconstructionScheme,
    edge_lower: GridField,
    edge_upper: GridField,
    prim_left: GridField,
    prim_right: GridField,
    elem_left: FluidElement,
    elem_right: FluidElement,
    flux_left: GridField,
    flux_right: GridField,
    cons_left: GridField,
    cons_right: GridField,
}

impl RiemannSolver {
    /// Allocate the working set for a grid.
    pub fn new(coords: &CoordinateGrid, physics: PhysicsConfig, scheme: ReconstructionScheme) -> Self {
        let n = physics.num_vars();
        let field = GridField::new(coords, n);
        let shape = *coords.shape();
        Self {
            scheme,
            edge_lower: field.clone(),
            edge_upper: field.clone(),
            prim_left: field.clone(),
            prim_right: field.clone(),
            elem_left: FluidElement::new(shape, physics.clone()),
            elem_right: FluidElement::new(shape, physics),
            flux_left: field.clone(),
            flux_right: field.clone(),
            cons_left: field.clone(),
            cons_right: field,
        }
    }

    /// Reconstruction scheme in use.
    #[inline]
    pub fn scheme(&self) -> ReconstructionScheme {
        self.scheme
    }

    /// First and one-past-last face index along an axis with a complete
    /// stencil on both sides.
    pub fn valid_faces(&self, total: usize) -> std::ops::Range<usize> {
        let s = self.scheme.stencil_half_width();
        (s + 1)..(total.saturating_sub(s))
    }

    /// Reconstruct the left and right face states along `axis`.
    ///
    /// Faces without a complete stencil take the value of the cell above
    /// them on both sides.
    pub fn reconstruct(&mut self, prim: &GridField, axis: usize) -> AccessCounts {
        let mut counts = self
            .scheme
            .reconstruct(prim, axis, &mut self.edge_lower, &mut self.edge_upper);

        let shape = *prim.shape();
        let stride = shape.stride(axis);
        let faces = self.valid_faces(shape.total(axis));

        for var in 0..prim.num_vars() {
            let cell = prim.var(var);
            let lower = self.edge_lower.var(var);
            let upper = self.edge_upper.var(var);
            let left = self.prim_left.var_mut(var);
            let right = self.prim_right.var_mut(var);
            for idx in 0..shape.len() {
                if faces.contains(&shape.ijk(idx)[axis]) {
                    left[idx] = upper[idx - stride];
                    right[idx] = lower[idx];
                } else {
                    left[idx] = cell[idx];
                    right[idx] = cell[idx];
                }
            }
        }

        counts += AccessCounts::new(3 * prim.num_vars(), 2 * prim.num_vars());
        counts
    }

    /// Numerical flux through every face normal to `axis`.
    ///
    /// `geom_face` must be evaluated at the lower face of each cell along
    /// `axis`. Faces without a complete stencil get zero flux.
    pub fn solve(
        &mut self,
        prim: &GridField,
        geom_face: &Geometry,
        axis: usize,
        fluxes: &mut GridField,
    ) -> AccessCounts {
        let dir = Direction::SPATIAL[axis];
        let mut counts = self.reconstruct(prim, axis);

        counts += self.elem_left.set(&self.prim_left, geom_face);
        counts += self.elem_right.set(&self.prim_right, geom_face);
        counts += self.elem_left.compute_fluxes(geom_face, dir, &mut self.flux_left);
        counts += self.elem_right.compute_fluxes(geom_face, dir, &mut self.flux_right);
        counts += self.elem_left.compute_fluxes(geom_face, Direction::T, &mut self.cons_left);
        counts += self.elem_right.compute_fluxes(geom_face, Direction::T, &mut self.cons_right);

        let shape = *prim.shape();
        let faces = self.valid_faces(shape.total(axis));
        let n = fluxes.num_vars();
        let mut fl = vec![0.0; n];
        let mut fr = vec![0.0; n];
        let mut ul = vec![0.0; n];
        let mut ur = vec![0.0; n];
        let mut face = vec![0.0; n];

        for idx in 0..shape.len() {
            if !faces.contains(&shape.ijk(idx)[axis]) {
                face.fill(0.0);
                fluxes.scatter(idx, &face);
                continue;
            }
            let c_max = self
                .elem_left
                .max_wave_speed(geom_face, axis, idx)
                .max(self.elem_right.max_wave_speed(geom_face, axis, idx));

            self.flux_left.gather(idx, &mut fl);
            self.flux_right.gather(idx, &mut fr);
            self.cons_left.gather(idx, &mut ul);
            self.cons_right.gather(idx, &mut ur);
            lax_friedrichs_flux(&fl, &fr, &ul, &ur, c_max, &mut face);
            fluxes.scatter(idx, &face);
        }

        counts += AccessCounts::new(4 * n, n);
        counts
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::geometry::Minkowski;
    use crate::grid::GridShape;
    use crate::physics::FluidState;
    use crate::types::{Location, vars};

    fn setup(scheme: ReconstructionScheme) -> (CoordinateGrid, Geometry, RiemannSolver) {
        let shape = GridShape::new(1, [8, 1, 1], scheme.min_ghost()).unwrap();
        let coords = CoordinateGrid::unit(shape);
        let geom = Geometry::new(&coords, Location::Left, Arc::new(Minkowski));
        let solver = RiemannSolver::new(&coords, PhysicsConfig::default(), scheme);
        (coords, geom, solver)
    }

    #[test]
    fn test_identical_states_give_physical_flux() {
        let f = [1.0, 2.0, 3.0];
        let u = [0.5, -1.0, 4.0];
        let mut out = [0.0; 3];
        lax_friedrichs_flux(&f, &f, &u, &u, 0.9, &mut out);
        assert_eq!(out, f);
    }

    #[test]
    fn test_dissipation_opposes_jump() {
        let mut out = [0.0];
        lax_friedrichs_flux(&[0.0], &[0.0], &[0.0], &[1.0], 1.0, &mut out);
        assert_eq!(out[0], -0.5);
    }

    #[test]
    fn test_uniform_state_flux() {
        for scheme in [ReconstructionScheme::MinMod, ReconstructionScheme::Weno5] {
            let (coords, geom, mut solver) = setup(scheme);
            let physics = PhysicsConfig::default();
            let mut prim = GridField::new(&coords, physics.num_vars());
            let state = [1.0, 0.8, 0.2, 0.0, 0.0, 0.3, 0.1, 0.0];
            for (v, &x) in state.iter().enumerate() {
                prim.fill(v, x);
            }

            let mut fluxes = prim.zeros_like(physics.num_vars());
            solver.solve(&prim, &geom, 0, &mut fluxes);

            let shape = *coords.shape();
            let exact = FluidState::from_primitives(&state, geom.point(0), &physics);
            let mut expected = [0.0; 8];
            exact.fluxes(1, 1.0, &mut expected);
            for idx in solver.valid_faces(shape.total(0)) {
                for v in 0..8 {
                    assert!(
                        (fluxes.var(v)[idx] - expected[v]).abs() < 1e-12,
                        "{scheme}: var {v} face {idx}"
                    );
                }
            }
            assert_eq!(fluxes.var(vars::RHO)[0], 0.0);
        }
    }

    #[test]
    fn test_density_jump_flux_is_upwind_biased() {
        let (coords, geom, mut solver) = setup(ReconstructionScheme::MinMod);
        let physics = PhysicsConfig::default();
        let shape = *coords.shape();
        let mut prim = GridField::new(&coords, physics.num_vars());
        prim.fill(vars::UU, 1.0);
        for idx in 0..shape.len() {
            prim.var_mut(vars::RHO)[idx] = if idx < 6 { 2.0 } else { 1.0 };
        }

        let mut fluxes = prim.zeros_like(physics.num_vars());
        solver.solve(&prim, &geom, 0, &mut fluxes);

        // Static fluid: mass moves from dense to light side only through
        // the dissipation term.
        assert!(fluxes.var(vars::RHO)[6] > 0.0);
        assert_eq!(fluxes.var(vars::RHO)[3], 0.0);
    }
}

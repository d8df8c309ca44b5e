//! Fluid state bound to a primitive field and a geometry.

use super::{EmhdGradients, FluidState, PhysicsConfig};
use crate::geometry::Geometry;
use crate::grid::{GridField, GridShape};
use crate::reconstruction::limited_difference;
use crate::types::{AccessCounts, Direction, Location, NDIM};

/// Derived arrays written by [`FluidElement::set`]: pressure, temperature,
/// Lorentz factor, `b²`, `|b|`, four vectors `u^μ`, `u_μ`, `b^μ`, `b_μ`,
/// `N^μ`, and `T^μ_ν`.
const DERIVED_ARRAYS: usize = 5 + 5 * NDIM + NDIM * NDIM;

/// Metric arrays read per point: `gCov`, `gCon` and the lapse.
const METRIC_ARRAYS: usize = 2 * NDIM * NDIM + 1;

/// Fluid state at every point of a grid, derived from one primitive field at
/// one location inside each cell.
///
/// [`FluidElement::set`] recomputes everything from scratch; no derived
/// quantity survives a call to it. The EMHD gradients are only filled by
/// [`FluidElement::compute_emhd_gradients`].
#[derive(Clone, Debug)]
pub struct FluidElement {
    physics: PhysicsConfig,
    shape: GridShape,
    location: Location,
    states: Vec<FluidState>,
    gradients: Vec<EmhdGradients>,
}

impl FluidElement {
    /// Allocate an element for a grid shape.
    pub fn new(shape: GridShape, physics: PhysicsConfig) -> Self {
        let n = shape.len();
        Self {
            physics,
            shape,
            location: Location::Center,
            states: vec![FluidState::default(); n],
            gradients: vec![EmhdGradients::default(); n],
        }
    }

    /// Derive the state at every point from `prim`, using the metric of
    /// `geom` at the same points.
    ///
    /// Closure parameters are refreshed too when the dissipative extension is
    /// enabled.
    pub fn set(&mut self, prim: &GridField, geom: &Geometry) -> AccessCounts {
        debug_assert_eq!(prim.shape(), &self.shape);
        self.location = geom.location();

        let mut values = vec![0.0; prim.num_vars()];
        for (idx, state) in self.states.iter_mut().enumerate() {
            prim.gather(idx, &mut values);
            *state = FluidState::from_primitives(&values, geom.point(idx), &self.physics);
        }

        let mut counts = AccessCounts::new(prim.num_vars() + METRIC_ARRAYS, DERIVED_ARRAYS);
        if self.physics.emhd() {
            counts += self.set_parameters();
        }
        counts
    }

    /// Compute the closure parameters `tau`, `chi` and `nu` at every point.
    pub fn set_parameters(&mut self) -> AccessCounts {
        for state in &mut self.states {
            state.set_parameters(&self.physics);
        }
        AccessCounts::new(3, 4)
    }

    /// Flux vector along `dir` at every point (conserved variables for
    /// [`Direction::T`]).
    pub fn compute_fluxes(&self, geom: &Geometry, dir: Direction, flux: &mut GridField) -> AccessCounts {
        let mut values = vec![0.0; flux.num_vars()];
        for (idx, state) in self.states.iter().enumerate() {
            state.fluxes(dir.index(), geom.g(idx), &mut values);
            flux.scatter(idx, &values);
        }
        let reads = 2 + NDIM + 2 * NDIM + 2;
        AccessCounts::new(reads, flux.num_vars())
    }

    /// Source terms at every point.
    ///
    /// With `use_implicit_sources` false, computes the geometric sources of
    /// the energy-momentum equations. With it true, computes the relaxation
    /// sources of the dissipative variables: `elem_old` supplies the previous
    /// time level `dt` earlier, and `elem_for_spatial_deriv` the gradients
    /// from its last [`FluidElement::compute_emhd_gradients`].
    pub fn compute_sources(
        &self,
        geom: &Geometry,
        elem_old: &FluidElement,
        elem_for_spatial_deriv: &FluidElement,
        dt: f64,
        use_implicit_sources: bool,
        sources: &mut GridField,
    ) -> AccessCounts {
        let mut values = vec![0.0; sources.num_vars()];
        for (idx, state) in self.states.iter().enumerate() {
            let point = geom.point(idx);
            if use_implicit_sources {
                state.implicit_sources(
                    point,
                    &elem_old.states[idx],
                    &elem_for_spatial_deriv.gradients[idx],
                    dt,
                    &mut values,
                );
            } else {
                state.explicit_sources(point, &mut values);
            }
            sources.scatter(idx, &values);
        }

        let reads = if use_implicit_sources {
            2 * (1 + NDIM) + (1 + NDIM * NDIM + 1) + 3
        } else {
            NDIM * NDIM + NDIM * NDIM * NDIM
        };
        AccessCounts::new(reads, sources.num_vars())
    }

    /// Spatial gradients of the temperature and of `u_μ` needed by the
    /// dissipative closures.
    ///
    /// Slopes use the monotonized-central limiter along each active axis;
    /// cells on the outermost ghost layer get zero slope. The connection
    /// term of `∇_μ u_ν` is applied along every spatial axis.
    pub fn compute_emhd_gradients(&mut self, geom: &Geometry, dx: [f64; 3]) -> AccessCounts {
        let shape = self.shape;
        self.gradients.fill(EmhdGradients::default());

        for axis in 0..shape.dim() {
            let stride = shape.stride(axis);
            let total = shape.total(axis);
            let mu = axis + 1;
            for idx in 0..shape.len() {
                let i = shape.ijk(idx)[axis];
                if i < 1 || i + 1 >= total {
                    continue;
                }
                let (l, c, r) = (&self.states[idx - stride], &self.states[idx], &self.states[idx + stride]);
                let grad = &mut self.gradients[idx];
                grad.grad_t[mu] = limited_difference(l.temperature, c.temperature, r.temperature) / dx[axis];
                for nu in 0..NDIM {
                    grad.grad_u_cov[mu][nu] =
                        limited_difference(l.u_cov[nu], c.u_cov[nu], r.u_cov[nu]) / dx[axis];
                }
            }
        }

        for (idx, grad) in self.gradients.iter_mut().enumerate() {
            let point = geom.point(idx);
            let u_cov = &self.states[idx].u_cov;
            let mut div = 0.0;
            for mu in 1..NDIM {
                for nu in 0..NDIM {
                    let connection: f64 = (0..NDIM).map(|l| point.gamma[l][mu][nu] * u_cov[l]).sum();
                    grad.grad_u_cov[mu][nu] -= connection;
                    div += point.g_con[mu][nu] * grad.grad_u_cov[mu][nu];
                }
            }
            grad.div_u_cov = div;
        }

        let per_axis = 1 + NDIM;
        AccessCounts::new(per_axis * shape.dim(), per_axis * shape.dim() + 1)
    }

    /// Largest characteristic speed magnitude along a spatial axis at one
    /// point.
    pub fn max_wave_speed(&self, geom: &Geometry, axis: usize, idx: usize) -> f64 {
        let (cmin, cmax) = self.states[idx].wave_speeds(axis + 1, geom.point(idx));
        cmin.abs().max(cmax.abs())
    }

    /// Fluid model parameters.
    #[inline]
    pub fn physics(&self) -> &PhysicsConfig {
        &self.physics
    }

    /// Location of the geometry used by the last [`FluidElement::set`].
    #[inline]
    pub fn location(&self) -> Location {
        self.location
    }

    /// Derived state at one point.
    #[inline]
    pub fn state(&self, idx: usize) -> &FluidState {
        &self.states[idx]
    }

    /// Derived state at every point.
    #[inline]
    pub fn states(&self) -> &[FluidState] {
        &self.states
    }

    /// EMHD gradients at one point.
    #[inline]
    pub fn gradients(&self, idx: usize) -> &EmhdGradients {
        &self.gradients[idx]
    }

    /// Whether the derived state is finite at every interior point.
    pub fn interior_is_finite(&self) -> bool {
        self.shape
            .interior_indices()
            .all(|idx| self.states[idx].is_finite())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::geometry::Minkowski;
    use crate::grid::CoordinateGrid;
    use crate::types::vars;

    fn setup(physics: &PhysicsConfig) -> (CoordinateGrid, Geometry, GridField) {
        let shape = GridShape::new(1, [8, 1, 1], 2).unwrap();
        let coords = CoordinateGrid::unit(shape);
        let geom = Geometry::new(&coords, Location::Center, Arc::new(Minkowski));
        let mut prim = GridField::new(&coords, physics.num_vars());
        prim.fill(vars::RHO, 1.0);
        prim.fill(vars::UU, 1.0);
        (coords, geom, prim)
    }

    #[test]
    fn test_uniform_fluxes_and_sources() {
        let physics = PhysicsConfig::default();
        let (_, geom, prim) = setup(&physics);
        let mut elem = FluidElement::new(*prim.shape(), physics.clone());
        elem.set(&prim, &geom);
        assert!(elem.interior_is_finite());

        let mut flux = prim.zeros_like(physics.num_vars());
        elem.compute_fluxes(&geom, Direction::X1, &mut flux);
        let p = (physics.adiabatic_index - 1.0) * 1.0;
        for idx in 0..prim.shape().len() {
            assert_eq!(flux.var(vars::RHO)[idx], 0.0);
            assert!((flux.var(vars::U1)[idx] - p).abs() < 1e-12);
        }

        let mut sources = prim.zeros_like(physics.num_vars());
        elem.compute_sources(&geom, &elem, &elem, 0.1, false, &mut sources);
        assert!(sources.vars().iter().flatten().all(|&s| s == 0.0));
    }

    #[test]
    fn test_counts_are_additive() {
        let physics = PhysicsConfig::default();
        let (_, geom, prim) = setup(&physics);
        let mut elem = FluidElement::new(*prim.shape(), physics.clone());
        let set = elem.set(&prim, &geom);
        let mut cons = prim.zeros_like(physics.num_vars());
        let flux = elem.compute_fluxes(&geom, Direction::T, &mut cons);
        let total = set + flux;
        assert_eq!(total.reads, set.reads + flux.reads);
        assert_eq!(flux.writes, physics.num_vars());
    }

    #[test]
    fn test_temperature_gradient() {
        let physics = PhysicsConfig::default().with_conduction(1.0);
        let (coords, geom, mut prim) = setup(&physics);
        // u = x so that T = (Γ - 1) x is linear.
        let centers = coords.coords_arrays(Location::Center);
        for idx in 0..prim.shape().len() {
            prim.var_mut(vars::UU)[idx] = 1.0 + centers[0][idx];
        }

        let mut elem = FluidElement::new(*prim.shape(), physics.clone());
        elem.set(&prim, &geom);
        elem.compute_emhd_gradients(&geom, coords.dx());

        let expected = physics.adiabatic_index - 1.0;
        for idx in prim.shape().interior_indices() {
            let grad = elem.gradients(idx);
            assert!((grad.grad_t[1] - expected).abs() < 1e-10, "dT/dx = {}", grad.grad_t[1]);
            assert_eq!(grad.grad_t[0], 0.0);
            assert!(grad.div_u_cov.abs() < 1e-14);
        }
    }

    #[test]
    fn test_implicit_sources_relax_heat_flux() {
        let physics = PhysicsConfig::default().with_conduction(1.0).with_relaxation_time(0.5);
        let (_, geom, mut prim) = setup(&physics);
        prim.fill(vars::B1, 0.1);
        prim.fill(8, 0.3);

        let mut elem = FluidElement::new(*prim.shape(), physics.clone());
        elem.set(&prim, &geom);
        elem.compute_emhd_gradients(&geom, geom.coords().dx());

        let mut sources = prim.zeros_like(physics.num_vars());
        elem.compute_sources(&geom, &elem, &elem, 0.1, true, &mut sources);
        for idx in prim.shape().interior_indices() {
            assert!((sources.var(8)[idx] + 0.3 / 0.5).abs() < 1e-12);
            assert_eq!(sources.var(vars::UU)[idx], 0.0);
        }
    }

    #[test]
    fn test_static_wave_speed() {
        let physics = PhysicsConfig::default();
        let (_, geom, prim) = setup(&physics);
        let mut elem = FluidElement::new(*prim.shape(), physics);
        elem.set(&prim, &geom);
        let cs = elem.state(3).sound_speed_sqr().sqrt();
        assert!((elem.max_wave_speed(&geom, 0, 3) - cs).abs() < 1e-12);
    }
}

//! Two-stage implicit-explicit time stepper.

use std::sync::Arc;

use super::residual::ConservationResidual;
use super::{
    ConfigError, NoBoundary, NoDiagnostics, ProblemBoundary, Stage, StepDiagnostics, TimeStepError,
    TimeStepperConfig,
};
use crate::flux::{RiemannSolver, compute_div_b, flux_ct};
use crate::geometry::{Geometry, MetricLaw};
use crate::grid::{CoordinateGrid, GridError, GridField, HaloExchange};
use crate::physics::FluidElement;
use crate::solver::{ImplicitSolver, NewtonSolver};
use crate::types::{AccessCounts, Direction, Location};

/// Predictor-corrector integrator of the GRMHD equations on one subdomain.
///
/// Each call to [`TimeStepper::time_step`] runs two stages:
///
/// 1. **Half step**: from `prim_old` at `t`, solve for the primitives at
///    `t + dt/2` with fluxes and sources evaluated at `t`.
/// 2. **Full step**: from the same conserved variables at `t`, solve for the
///    primitives at `t + dt` with fluxes and sources evaluated at the half
///    step.
///
/// The stepper owns every field it touches for the duration of a step.
pub struct TimeStepper {
    config: TimeStepperConfig,
    time: f64,
    dt: f64,
    current_step: Stage,

    coords: CoordinateGrid,
    geom_center: Geometry,
    geom_faces: Vec<Geometry>,

    prim_old: GridField,
    prim_half_step: GridField,
    prim: GridField,
    cons_old: GridField,
    div_fluxes: GridField,
    sources_explicit: GridField,
    sources_implicit_old: GridField,
    fluxes: Vec<GridField>,

    elem_old: FluidElement,
    elem_half_step: FluidElement,
    riemann: RiemannSolver,

    halo: Box<dyn HaloExchange>,
    boundary: Box<dyn ProblemBoundary>,
    diagnostics: Box<dyn StepDiagnostics>,
    solver: Box<dyn ImplicitSolver>,
}

impl TimeStepper {
    /// Allocate a stepper on a coordinate grid with a background metric.
    ///
    /// The primitives start at zero; set them with
    /// [`TimeStepper::set_primitives`] or [`TimeStepper::initialize`].
    pub fn new(
        config: TimeStepperConfig,
        coords: CoordinateGrid,
        metric: Arc<dyn MetricLaw>,
    ) -> Result<Self, TimeStepError> {
        let shape = *coords.shape();
        config.validate(&shape)?;

        let geom_center = Geometry::new(&coords, Location::Center, metric.clone());
        let geom_faces: Vec<_> = Direction::active(shape.dim())
            .map(|dir| Geometry::new(&coords, Location::face(dir), metric.clone()))
            .collect();

        let n = config.physics.num_vars();
        let field = GridField::new(&coords, n);
        let fluxes = vec![field.clone(); shape.dim()];

        log::debug!(
            "time stepper: {} vars, {} reconstruction, metric {}, {} cells",
            n,
            config.reconstruction,
            metric.name(),
            shape.interior_len()
        );

        Ok(Self {
            time: config.time,
            dt: config.dt,
            current_step: Stage::HalfStep,
            geom_center,
            geom_faces,
            prim_old: field.clone(),
            prim_half_step: field.clone(),
            prim: field.clone(),
            cons_old: field.clone(),
            div_fluxes: field.clone(),
            sources_explicit: field.clone(),
            sources_implicit_old: field,
            fluxes,
            elem_old: FluidElement::new(shape, config.physics.clone()),
            elem_half_step: FluidElement::new(shape, config.physics.clone()),
            riemann: RiemannSolver::new(&coords, config.physics.clone(), config.reconstruction),
            halo: Box::new(config.boundaries),
            boundary: Box::new(NoBoundary),
            diagnostics: Box::new(NoDiagnostics),
            solver: Box::new(NewtonSolver::new(config.newton.clone())),
            coords,
            config,
        })
    }

    /// Replace the ghost-zone exchange.
    pub fn with_halo<H: HaloExchange + 'static>(mut self, halo: H) -> Self {
        self.halo = Box::new(halo);
        self
    }

    /// Set the problem-specific boundary conditions.
    pub fn with_boundary<B: ProblemBoundary + 'static>(mut self, boundary: B) -> Self {
        self.boundary = Box::new(boundary);
        self
    }

    /// Set the stage diagnostics.
    pub fn with_diagnostics<D: StepDiagnostics + 'static>(mut self, diagnostics: D) -> Self {
        self.diagnostics = Box::new(diagnostics);
        self
    }

    /// Replace the implicit solver.
    pub fn with_solver<S: ImplicitSolver + 'static>(mut self, solver: S) -> Self {
        self.solver = Box::new(solver);
        self
    }

    // =========================================================================
    // State access
    // =========================================================================

    /// Copy the primitives at the current time from `prim`.
    pub fn set_primitives(&mut self, prim: &GridField) -> Result<AccessCounts, GridError> {
        self.prim_old.copy_from(prim)
    }

    /// Set the primitives at the current time from a function of the
    /// cell-centre coordinates.
    pub fn initialize<F>(&mut self, f: F)
    where
        F: FnMut([f64; 3], &mut [f64]),
    {
        self.prim_old.set_from_fn(&self.coords, f);
    }

    /// Primitives at the current time.
    #[inline]
    pub fn prim_old(&self) -> &GridField {
        &self.prim_old
    }

    /// Mutable primitives at the current time.
    #[inline]
    pub fn prim_old_mut(&mut self) -> &mut GridField {
        &mut self.prim_old
    }

    /// Primitives at the last half step.
    #[inline]
    pub fn prim_half_step(&self) -> &GridField {
        &self.prim_half_step
    }

    /// Divergence of the fluxes from the last stage.
    #[inline]
    pub fn div_fluxes(&self) -> &GridField {
        &self.div_fluxes
    }

    /// Current time.
    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Time step.
    #[inline]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Change the time step.
    pub fn set_dt(&mut self, dt: f64) -> Result<(), ConfigError> {
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(ConfigError::TimeStep(dt));
        }
        self.dt = dt;
        Ok(())
    }

    /// Stage being executed, or the last one executed between steps.
    #[inline]
    pub fn current_step(&self) -> Stage {
        self.current_step
    }

    /// Configuration.
    #[inline]
    pub fn config(&self) -> &TimeStepperConfig {
        &self.config
    }

    /// Coordinate grid.
    #[inline]
    pub fn coords(&self) -> &CoordinateGrid {
        &self.coords
    }

    /// Geometry at cell centres.
    #[inline]
    pub fn geometry(&self) -> &Geometry {
        &self.geom_center
    }

    /// Name of the implicit solver in use.
    pub fn solver_name(&self) -> &'static str {
        self.solver.name()
    }

    // =========================================================================
    // Stepping
    // =========================================================================

    /// Advance the primitives from `time` to `time + dt`.
    ///
    /// On error the interior of the primitives at `time` and `time` itself
    /// are unchanged, so the caller may retry with a smaller `dt`.
    pub fn time_step(&mut self) -> Result<AccessCounts, TimeStepError> {
        let mut counts = self.stage(Stage::HalfStep)?;
        counts += self.stage(Stage::FullStep)?;
        self.time += self.dt;
        self.diagnostics.full_step(self.time, &self.coords, &self.prim_old);
        Ok(counts)
    }

    fn stage(&mut self, stage: Stage) -> Result<AccessCounts, TimeStepError> {
        self.current_step = stage;
        match stage {
            Stage::HalfStep => log::info!("---Half step---"),
            Stage::FullStep => log::info!("---Full step---"),
        }

        let half = stage == Stage::HalfStep;
        let dt_stage = if half { 0.5 * self.dt } else { self.dt };
        let emhd = self.config.physics.emhd();
        let dx = self.coords.dx();

        // Field and element that play the "old" role in this stage.
        let (source, elem, elem_old) = match stage {
            Stage::HalfStep => (&mut self.prim_old, &mut self.elem_old, None),
            Stage::FullStep => (&mut self.prim_half_step, &mut self.elem_half_step, Some(&self.elem_old)),
        };

        let mut counts = self.halo.communicate(source);
        self.boundary.apply(&self.coords, source);

        counts += elem.set(source, &self.geom_center);
        if half {
            counts += elem.compute_fluxes(&self.geom_center, Direction::T, &mut self.cons_old);
        }
        if emhd {
            counts += elem.compute_emhd_gradients(&self.geom_center, dx);
        }

        counts += compute_div_of_fluxes(
            &mut self.riemann,
            source,
            &self.geom_faces,
            &mut self.fluxes,
            self.config.flux_ct,
            &mut self.div_fluxes,
        );

        let elem: &FluidElement = elem;
        let elem_old = elem_old.unwrap_or(elem);
        counts += elem.compute_sources(
            &self.geom_center,
            elem_old,
            elem,
            dt_stage,
            false,
            &mut self.sources_explicit,
        );
        if half && emhd {
            counts += elem.compute_sources(
                &self.geom_center,
                elem,
                elem,
                dt_stage,
                true,
                &mut self.sources_implicit_old,
            );
        }

        if half {
            // Initial guess for both stages.
            counts += self.prim.copy_from(source)?;
        }

        let residual = ConservationResidual {
            physics: &self.config.physics,
            geom: &self.geom_center,
            cons_old: &self.cons_old,
            div_fluxes: &self.div_fluxes,
            sources_explicit: &self.sources_explicit,
            sources_implicit_old: (!half && emhd).then_some(&self.sources_implicit_old),
            elem_old,
            elem_grad: elem,
            dt_stage,
        };
        let stats = self
            .solver
            .solve(&residual, &mut self.prim)
            .map_err(|source| {
                log::warn!("{stage} failed at t = {}: {source}", self.time);
                TimeStepError::Solve {
                    stage,
                    time: self.time,
                    source,
                }
            })?;
        log::debug!(
            "{stage}: {} cells, {} iterations (max {}), |R| <= {:.3e}",
            stats.cells,
            stats.total_iterations,
            stats.max_iterations,
            stats.max_residual
        );

        match stage {
            Stage::HalfStep => {
                counts += self.prim_half_step.copy_from(&self.prim)?;
                self.diagnostics
                    .half_step(self.time + 0.5 * self.dt, &self.coords, &self.prim_half_step);
            }
            Stage::FullStep => {
                counts += self.prim_old.copy_from(&self.prim)?;
            }
        }

        log::debug!("{stage}: {} reads, {} writes", counts.reads, counts.writes);
        Ok(counts)
    }

    /// Divergence of the numerical fluxes of `prim` into
    /// [`TimeStepper::div_fluxes`].
    ///
    /// The ghost zones of `prim` must already be filled.
    pub fn compute_div_of_fluxes(&mut self, prim: &GridField) -> AccessCounts {
        compute_div_of_fluxes(
            &mut self.riemann,
            prim,
            &self.geom_faces,
            &mut self.fluxes,
            self.config.flux_ct,
            &mut self.div_fluxes,
        )
    }

    /// Largest stable time step for a Courant number `cfl`, from the
    /// characteristic speeds of the current primitives.
    ///
    /// Returns infinity when every speed vanishes.
    pub fn courant_dt(&mut self, cfl: f64) -> f64 {
        self.halo.communicate(&mut self.prim_old);
        self.elem_old.set(&self.prim_old, &self.geom_center);

        let shape = *self.prim_old.shape();
        let dx = self.coords.dx();
        let mut max_rate: f64 = 0.0;
        for idx in shape.interior_indices() {
            let rate: f64 = (0..shape.dim())
                .map(|axis| self.elem_old.max_wave_speed(&self.geom_center, axis, idx) / dx[axis])
                .sum();
            max_rate = max_rate.max(rate);
        }

        if max_rate > 0.0 {
            cfl / max_rate
        } else {
            f64::INFINITY
        }
    }

    /// Corner-centred divergence of the magnetic field at the current time.
    pub fn compute_div_b(&self) -> Vec<f64> {
        compute_div_b(&self.prim_old, &self.geom_center)
    }
}

impl std::fmt::Debug for TimeStepper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeStepper")
            .field("time", &self.time)
            .field("dt", &self.dt)
            .field("current_step", &self.current_step)
            .field("shape", self.coords.shape())
            .field("halo", &self.halo.name())
            .field("boundary", &self.boundary.name())
            .field("solver", &self.solver.name())
            .finish()
    }
}

/// Face fluxes of `prim` along every active axis, with the optional
/// constrained-transport correction, differenced into `div_fluxes` at the
/// interior cells.
fn compute_div_of_fluxes(
    riemann: &mut RiemannSolver,
    prim: &GridField,
    geom_faces: &[Geometry],
    fluxes: &mut [GridField],
    use_flux_ct: bool,
    div_fluxes: &mut GridField,
) -> AccessCounts {
    let shape = *prim.shape();
    let mut counts = AccessCounts::ZERO;

    for (axis, (flux, geom)) in fluxes.iter_mut().zip(geom_faces).enumerate() {
        counts += riemann.solve(prim, geom, axis, flux);
    }
    if use_flux_ct {
        counts += flux_ct(fluxes);
    }

    div_fluxes.zero();
    for var in 0..div_fluxes.num_vars() {
        let div = div_fluxes.var_mut(var);
        for (axis, flux) in fluxes.iter().enumerate() {
            let f = flux.var(var);
            let stride = shape.stride(axis);
            let inv_dx = 1.0 / prim.dx(axis);
            for idx in shape.interior_indices() {
                div[idx] += (f[idx + stride] - f[idx]) * inv_dx;
            }
        }
    }

    let n = div_fluxes.num_vars();
    counts + AccessCounts::new(n * shape.dim(), n)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::geometry::Minkowski;
    use crate::grid::{GridShape, LocalHalo};
    use crate::solver::{IdentitySolve, SolveStats, SolverError, StageResidual};
    use crate::types::vars;

    fn uniform_stepper(n: usize, dt: f64) -> TimeStepper {
        let shape = GridShape::new(1, [n, 1, 1], 2).unwrap();
        let coords = CoordinateGrid::unit(shape);
        let mut stepper =
            TimeStepper::new(TimeStepperConfig::new(dt), coords, Arc::new(Minkowski)).unwrap();
        stepper.prim_old_mut().fill(vars::RHO, 1.0);
        stepper.prim_old_mut().fill(vars::UU, 1.0);
        stepper
    }

    /// Fails on call number `fail_on` (zero-based).
    struct FailingSolve {
        calls: AtomicUsize,
        fail_on: usize,
    }

    impl ImplicitSolver for FailingSolve {
        fn solve(&self, _residual: &dyn StageResidual, _prim: &mut GridField) -> Result<SolveStats, SolverError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == self.fail_on {
                Err(SolverError::NotConverged {
                    cell: 2,
                    iterations: 20,
                    residual: 1.0,
                })
            } else {
                Ok(SolveStats::default())
            }
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[derive(Default)]
    struct Recorder(Arc<Mutex<Vec<(Stage, f64)>>>);

    impl StepDiagnostics for Recorder {
        fn half_step(&mut self, time: f64, _coords: &CoordinateGrid, _prim: &GridField) {
            self.0.lock().unwrap().push((Stage::HalfStep, time));
        }

        fn full_step(&mut self, time: f64, _coords: &CoordinateGrid, _prim: &GridField) {
            self.0.lock().unwrap().push((Stage::FullStep, time));
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        let shape = GridShape::new(1, [8, 1, 1], 2).unwrap();
        let coords = CoordinateGrid::unit(shape);
        let result = TimeStepper::new(TimeStepperConfig::new(-1.0), coords, Arc::new(Minkowski));
        assert!(matches!(
            result,
            Err(TimeStepError::Config(ConfigError::TimeStep(_)))
        ));
    }

    #[test]
    fn test_uniform_state_is_steady() {
        let mut stepper = uniform_stepper(10, 0.01);
        let before = stepper.prim_old().clone();
        stepper.time_step().unwrap();

        assert!((stepper.time() - 0.01).abs() < 1e-15);
        assert!(stepper.prim_old().max_interior_diff(&before).unwrap() < 1e-10);
        assert_eq!(stepper.current_step(), Stage::FullStep);
    }

    #[test]
    fn test_uniform_fluxes_have_zero_divergence() {
        let mut stepper = uniform_stepper(6, 0.01);
        let mut prim = stepper.prim_old().clone();
        LocalHalo::periodic().communicate(&mut prim);
        stepper.compute_div_of_fluxes(&prim);
        for var in 0..prim.num_vars() {
            assert!(stepper.div_fluxes().var(var).iter().all(|&d| d.abs() < 1e-14));
        }
    }

    #[test]
    fn test_identity_solve_orchestration() {
        let recorder = Recorder::default();
        let log = recorder.0.clone();
        let mut stepper = uniform_stepper(8, 0.02)
            .with_solver(IdentitySolve)
            .with_diagnostics(recorder);
        stepper.prim_old_mut().var_mut(vars::RHO)[4] = 2.0;
        let before = stepper.prim_old().clone();

        stepper.time_step().unwrap();

        // Identity keeps the guess, which is the old state.
        assert_eq!(stepper.prim_old().max_interior_diff(&before).unwrap(), 0.0);
        assert_eq!(stepper.prim_half_step().var(vars::RHO)[4], 2.0);
        let log = log.lock().unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].0, Stage::HalfStep);
        assert!((log[0].1 - 0.01).abs() < 1e-15);
        assert_eq!(log[1].0, Stage::FullStep);
        assert!((log[1].1 - 0.02).abs() < 1e-15);
    }

    #[test]
    fn test_failed_half_step_keeps_state() {
        let mut stepper = uniform_stepper(8, 0.01).with_solver(FailingSolve {
            calls: AtomicUsize::new(0),
            fail_on: 0,
        });
        let before = stepper.prim_old().clone();
        let err = stepper.time_step().unwrap_err();

        assert!(matches!(
            err,
            TimeStepError::Solve {
                stage: Stage::HalfStep,
                ..
            }
        ));
        assert_eq!(stepper.time(), 0.0);
        assert_eq!(stepper.prim_old().max_interior_diff(&before).unwrap(), 0.0);
    }

    #[test]
    fn test_failed_full_step_keeps_state() {
        let mut stepper = uniform_stepper(8, 0.01).with_solver(FailingSolve {
            calls: AtomicUsize::new(0),
            fail_on: 1,
        });
        stepper.prim_old_mut().var_mut(vars::UU)[5] = 3.0;
        let before = stepper.prim_old().clone();
        let err = stepper.time_step().unwrap_err();

        assert!(matches!(
            err,
            TimeStepError::Solve {
                stage: Stage::FullStep,
                time,
                ..
            } if time == 0.0
        ));
        assert_eq!(stepper.time(), 0.0);
        assert_eq!(stepper.prim_old().max_interior_diff(&before).unwrap(), 0.0);
    }

    #[test]
    fn test_courant_dt_static_gas() {
        let mut stepper = uniform_stepper(10, 0.01);
        let gam: f64 = 4.0 / 3.0;
        // cs² = Γ P / (ρ + Γ u) with P = (Γ - 1) u.
        let cs = (gam * (gam - 1.0) / (1.0 + gam)).sqrt();
        let dx = 0.1;
        let dt = stepper.courant_dt(0.5);
        assert!((dt - 0.5 * dx / cs).abs() < 1e-10, "dt = {dt}");
    }

    #[test]
    fn test_set_dt_validation() {
        let mut stepper = uniform_stepper(4, 0.01);
        assert!(stepper.set_dt(0.0).is_err());
        stepper.set_dt(0.005).unwrap();
        assert_eq!(stepper.dt(), 0.005);
    }
}

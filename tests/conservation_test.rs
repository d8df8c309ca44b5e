//! Conservation of the conserved variables on a periodic flat domain.

use std::f64::consts::PI;
use std::sync::Arc;

use grmhd_rs::geometry::Minkowski;
use grmhd_rs::grid::{CoordinateGrid, GridShape};
use grmhd_rs::physics::FluidState;
use grmhd_rs::simulation::Simulation;
use grmhd_rs::time::{TimeStepper, TimeStepperConfig};
use grmhd_rs::types::vars;

/// Domain integral of every conserved variable.
fn totals(stepper: &TimeStepper) -> Vec<f64> {
    let prim = stepper.prim_old();
    let geom = stepper.geometry();
    let physics = &stepper.config().physics;
    let shape = *prim.shape();
    let n = prim.num_vars();
    let volume: f64 = (0..shape.dim()).map(|a| prim.dx(a)).product();

    let mut totals = vec![0.0; n];
    let mut values = vec![0.0; n];
    let mut cons = vec![0.0; n];
    for idx in shape.interior_indices() {
        prim.gather(idx, &mut values);
        let state = FluidState::from_primitives(&values, geom.point(idx), physics);
        state.conserved(geom.g(idx), &mut cons);
        for (t, c) in totals.iter_mut().zip(&cons) {
            *t += c * volume;
        }
    }
    totals
}

fn smooth_wave(n: usize) -> TimeStepper {
    let shape = GridShape::new(1, [n, 1, 1], 2).unwrap();
    let coords = CoordinateGrid::unit(shape);
    let mut stepper = TimeStepper::new(TimeStepperConfig::default(), coords, Arc::new(Minkowski)).unwrap();
    stepper.initialize(|x, prim| {
        prim.fill(0.0);
        let phase = 2.0 * PI * x[0];
        prim[vars::RHO] = 1.0 + 0.2 * phase.sin();
        prim[vars::UU] = 1.0;
        prim[vars::U1] = 0.2;
        prim[vars::B1] = 0.1;
        prim[vars::B2] = 0.1 * phase.cos();
    });
    stepper
}

#[test]
fn test_periodic_wave_conserves_totals() {
    let mut stepper = smooth_wave(32);
    let before = totals(&stepper);
    let initial = stepper.prim_old().clone();

    let result = Simulation::new()
        .with_cfl(0.4)
        .with_dt_max(0.01)
        .run(&mut stepper, 0.05);
    assert!(result.success, "{:?}", result.error);

    let after = totals(&stepper);
    for (var, (b, a)) in before.iter().zip(&after).enumerate() {
        let scale = b.abs().max(1.0);
        assert!((a - b).abs() / scale < 1e-9, "var {var}: {b} -> {a}");
    }

    // The wave actually moved.
    assert!(stepper.prim_old().max_interior_diff(&initial).unwrap() > 1e-4);
    assert!(stepper.prim_old().interior_is_finite());
}

#[test]
fn test_wave_moves_downstream() {
    let mut stepper = smooth_wave(64);
    let shape = *stepper.prim_old().shape();
    let peak = |stepper: &TimeStepper| {
        shape
            .interior_indices()
            .max_by(|&a, &b| {
                let rho = stepper.prim_old().var(vars::RHO);
                rho[a].total_cmp(&rho[b])
            })
            .unwrap_or(0)
    };
    let start = peak(&stepper);

    let result = Simulation::new().with_dt_max(0.01).run(&mut stepper, 0.2);
    assert!(result.success, "{:?}", result.error);

    // The density is advected at roughly the fluid velocity.
    let moved = peak(&stepper) as f64 - start as f64;
    assert!(moved > 0.0, "peak moved by {moved} cells");
}

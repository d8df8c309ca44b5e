//! Constrained transport keeps the corner-centred divergence of the
//! magnetic field at round-off.

use std::f64::consts::PI;
use std::sync::Arc;

use grmhd_rs::geometry::Minkowski;
use grmhd_rs::grid::{CoordinateGrid, GridShape};
use grmhd_rs::time::{TimeStepper, TimeStepperConfig};
use grmhd_rs::types::vars;

const N: usize = 16;

fn magnetized_loop(flux_ct: bool) -> TimeStepper {
    let shape = GridShape::new(2, [N, N, 1], 2).unwrap();
    let coords = CoordinateGrid::unit(shape);
    let config = TimeStepperConfig::new(0.005).with_flux_ct(flux_ct);
    let mut stepper = TimeStepper::new(config, coords.clone(), Arc::new(Minkowski)).unwrap();

    // Periodic vector potential sampled at cell corners.
    let [dx, dy, _] = coords.dx();
    let g = shape.num_ghost();
    let a_z = |i: usize, j: usize| {
        let x = (i as f64 - g as f64) * dx;
        let y = (j as f64 - g as f64) * dy;
        0.4 * (2.0 * PI * x).sin() * (2.0 * PI * y).sin() + 0.2 * (2.0 * PI * (x + y)).cos()
    };

    // Sheared flow and a non-uniform density so the induction fluxes do not
    // cancel on their own.
    let prim = stepper.prim_old_mut();
    prim.fill(vars::UU, 1.0);
    prim.fill(vars::U2, 0.1);
    for idx in 0..shape.len() {
        let [i, j, _] = shape.ijk(idx);
        prim.var_mut(vars::RHO)[idx] = 1.0 + 0.3 * (0.1 * (i * j) as f64).sin();
        prim.var_mut(vars::U1)[idx] = 0.3 * (0.7 * i as f64).sin();
        prim.var_mut(vars::B1)[idx] =
            0.5 * (a_z(i, j + 1) - a_z(i, j) + a_z(i + 1, j + 1) - a_z(i + 1, j)) / dy;
        prim.var_mut(vars::B2)[idx] =
            -0.5 * (a_z(i + 1, j) - a_z(i, j) + a_z(i + 1, j + 1) - a_z(i, j + 1)) / dx;
    }
    stepper
}

/// Largest |∇·B| over corners whose four cells are all interior.
fn max_interior_div_b(stepper: &TimeStepper) -> f64 {
    let shape = *stepper.prim_old().shape();
    let g = shape.num_ghost();
    let div_b = stepper.compute_div_b();
    let mut max: f64 = 0.0;
    for j in (g + 1)..(g + N) {
        for i in (g + 1)..(g + N) {
            max = max.max(div_b[shape.index(i, j, 0)].abs());
        }
    }
    max
}

#[test]
fn test_initial_field_is_divergence_free() {
    let stepper = magnetized_loop(true);
    let div_b = max_interior_div_b(&stepper);
    assert!(div_b < 1e-11, "max |divB| = {div_b:.3e}");
}

#[test]
fn test_flux_ct_preserves_div_b() {
    let mut stepper = magnetized_loop(true);
    for _ in 0..4 {
        stepper.time_step().unwrap();
    }

    let div_b = max_interior_div_b(&stepper);
    assert!(div_b < 1e-8, "max |divB| = {div_b:.3e}");

    // The field evolved.
    let fresh = magnetized_loop(true);
    let change = stepper.prim_old().max_interior_diff(fresh.prim_old()).unwrap();
    assert!(change > 1e-6, "field change {change:.3e}");
}

#[test]
fn test_without_flux_ct_div_b_grows() {
    let mut stepper = magnetized_loop(false);
    for _ in 0..4 {
        stepper.time_step().unwrap();
    }
    let div_b = max_interior_div_b(&stepper);
    assert!(div_b > 1e-4, "max |divB| = {div_b:.3e}");
}

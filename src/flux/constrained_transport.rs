//! Flux-interpolated constrained transport (Tóth 2000) and the matching
//! divergence of the magnetic field.

use crate::geometry::Geometry;
use crate::grid::{GridField, GridShape};
use crate::types::{AccessCounts, vars};

/// Rewrite the induction fluxes so that the corner-centred `∇·B` of
/// [`compute_div_b`] is preserved to round-off by the update.
///
/// `fluxes[a]` holds the face fluxes normal to axis `a`, one entry per active
/// axis. Corner EMFs are averaged from the face fluxes and the induction
/// fluxes rebuilt from them; faces without all four neighbouring EMFs keep
/// their original fluxes. In 1-D only the normal induction flux is zeroed.
pub fn flux_ct(fluxes: &mut [GridField]) -> AccessCounts {
    let Some(first) = fluxes.first() else {
        return AccessCounts::ZERO;
    };
    let shape = *first.shape();
    let dim = fluxes.len();

    if dim == 1 {
        fluxes[0].fill(vars::B1, 0.0);
        return AccessCounts::new(0, 1);
    }

    // emf[c] is the EMF along axis c at corner (i-½, j-½, k-½).
    let mut emf = [vec![0.0; shape.len()], vec![0.0; shape.len()], vec![0.0; shape.len()]];
    let has_corner = |ijk: [usize; 3], axes: [usize; 2]| axes.iter().all(|&a| ijk[a] >= 1);

    for idx in 0..shape.len() {
        let ijk = shape.ijk(idx);
        // EMF along X3 from the X1 and X2 faces.
        if has_corner(ijk, [0, 1]) {
            let (s1, s2) = (shape.stride(0), shape.stride(1));
            let f1 = fluxes[0].var(vars::B2);
            let f2 = fluxes[1].var(vars::B1);
            emf[2][idx] = 0.25 * (f1[idx] + f1[idx - s2] - f2[idx] - f2[idx - s1]);
        }
        if dim == 3 {
            let (s1, s2, s3) = (shape.stride(0), shape.stride(1), shape.stride(2));
            if has_corner(ijk, [0, 2]) {
                let f3 = fluxes[2].var(vars::B1);
                let f1 = fluxes[0].var(vars::B3);
                emf[1][idx] = 0.25 * (f3[idx] + f3[idx - s1] - f1[idx] - f1[idx - s3]);
            }
            if has_corner(ijk, [1, 2]) {
                let f2 = fluxes[1].var(vars::B3);
                let f3 = fluxes[2].var(vars::B2);
                emf[0][idx] = 0.25 * (f2[idx] + f2[idx - s3] - f3[idx] - f3[idx - s2]);
            }
        }
    }

    let below_top = |ijk: [usize; 3], axis: usize| ijk[axis] + 1 < shape.total(axis);
    let avg = |e: &[f64], idx: usize, stride: usize| 0.5 * (e[idx] + e[idx + stride]);

    let (s1, s2) = (shape.stride(0), shape.stride(1));
    let s3 = shape.stride(2);
    for idx in 0..shape.len() {
        let ijk = shape.ijk(idx);
        let interior_2d = has_corner(ijk, [0, 1]) && below_top(ijk, 0) && below_top(ijk, 1);
        if !interior_2d {
            continue;
        }

        fluxes[0].var_mut(vars::B1)[idx] = 0.0;
        fluxes[0].var_mut(vars::B2)[idx] = avg(&emf[2], idx, s2);
        fluxes[1].var_mut(vars::B1)[idx] = -avg(&emf[2], idx, s1);
        fluxes[1].var_mut(vars::B2)[idx] = 0.0;

        if dim == 3 && ijk[2] >= 1 && below_top(ijk, 2) {
            fluxes[0].var_mut(vars::B3)[idx] = -avg(&emf[1], idx, s3);
            fluxes[1].var_mut(vars::B3)[idx] = avg(&emf[0], idx, s3);
            fluxes[2].var_mut(vars::B1)[idx] = avg(&emf[1], idx, s1);
            fluxes[2].var_mut(vars::B2)[idx] = -avg(&emf[0], idx, s2);
            fluxes[2].var_mut(vars::B3)[idx] = 0.0;
        }
    }

    AccessCounts::new(2 * dim, dim * dim)
}

/// Corner-centred divergence of `g B^i`.
///
/// Entry `idx` belongs to the corner at the lower face of cell `idx` along
/// every active axis. It differences the `2^dim` cells sharing that corner;
/// corners without all of them get zero.
pub fn compute_div_b(prim: &GridField, geom: &Geometry) -> Vec<f64> {
    let shape = *prim.shape();
    let dim = shape.dim();
    let mut div_b = vec![0.0; shape.len()];
    let weight = 1.0 / (1usize << (dim - 1)) as f64;

    for idx in 0..shape.len() {
        let ijk = shape.ijk(idx);
        if (0..dim).any(|a| ijk[a] == 0) {
            continue;
        }
        let mut div = 0.0;
        for corner in 0..(1usize << dim) {
            let cell = corner_cell(&shape, idx, corner);
            for axis in 0..dim {
                let upper = corner & (1 << axis) == 0;
                let flux = geom.g(cell) * prim.var(vars::B1 + axis)[cell];
                let sign = if upper { 1.0 } else { -1.0 };
                div += sign * weight * flux / prim.dx(axis);
            }
        }
        div_b[idx] = div;
    }
    div_b
}

/// Cell around a corner: bit `a` of `corner` set means one step down along
/// axis `a`.
fn corner_cell(shape: &GridShape, idx: usize, corner: usize) -> usize {
    let mut cell = idx;
    for axis in 0..shape.dim() {
        if corner & (1 << axis) != 0 {
            cell -= shape.stride(axis);
        }
    }
    cell
}

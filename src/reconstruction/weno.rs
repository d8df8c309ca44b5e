//! Fifth-order WENO reconstruction (Jiang & Shu 1996).

use crate::grid::GridField;
use crate::types::AccessCounts;

/// Regularization of the smoothness indicators.
pub const WENO_EPSILON: f64 = 1e-26;

/// Optimal weights of the three candidate stencils.
const LINEAR_WEIGHTS: [f64; 3] = [0.1, 0.6, 0.3];

/// WENO5 value at the upper face of the middle cell of a 5-point stencil.
///
/// Evaluating on the reversed stencil gives the value at the lower face.
#[inline]
pub fn weno5_face(v: [f64; 5]) -> f64 {
    let [vm2, vm1, v0, vp1, vp2] = v;

    let candidates = [
        (2.0 * vm2 - 7.0 * vm1 + 11.0 * v0) / 6.0,
        (-vm1 + 5.0 * v0 + 2.0 * vp1) / 6.0,
        (2.0 * v0 + 5.0 * vp1 - vp2) / 6.0,
    ];

    let beta = [
        13.0 / 12.0 * (vm2 - 2.0 * vm1 + v0).powi(2) + 0.25 * (vm2 - 4.0 * vm1 + 3.0 * v0).powi(2),
        13.0 / 12.0 * (vm1 - 2.0 * v0 + vp1).powi(2) + 0.25 * (vm1 - vp1).powi(2),
        13.0 / 12.0 * (v0 - 2.0 * vp1 + vp2).powi(2) + 0.25 * (3.0 * v0 - 4.0 * vp1 + vp2).powi(2),
    ];

    let mut alpha = [0.0; 3];
    for k in 0..3 {
        alpha[k] = LINEAR_WEIGHTS[k] / (WENO_EPSILON + beta[k]).powi(2);
    }
    let alpha_sum: f64 = alpha.iter().sum();

    (0..3).map(|k| alpha[k] * candidates[k]).sum::<f64>() / alpha_sum
}

/// WENO5 reconstruction along `axis`.
///
/// Written for every cell at least two away from the ghosted boundary along
/// `axis`; other cells are untouched.
pub fn reconstruct_weno5(
    prim: &GridField,
    axis: usize,
    left: &mut GridField,
    right: &mut GridField,
) -> AccessCounts {
    let shape = *prim.shape();
    let s = shape.stride(axis);
    let total = shape.total(axis);

    for var in 0..prim.num_vars() {
        let v = prim.var(var);
        let (l, r) = (left.var_mut(var), right.var_mut(var));
        for idx in 0..shape.len() {
            let i = shape.ijk(idx)[axis];
            if i < 2 || i + 2 >= total {
                continue;
            }
            let stencil = [v[idx - 2 * s], v[idx - s], v[idx], v[idx + s], v[idx + 2 * s]];
            r[idx] = weno5_face(stencil);
            l[idx] = weno5_face([stencil[4], stencil[3], stencil[2], stencil[1], stencil[0]]);
        }
    }

    let n = prim.num_vars();
    AccessCounts::new(n, 2 * n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{CoordinateGrid, GridShape};

    #[test]
    fn test_constant_stencil() {
        let x = weno5_face([2.5; 5]);
        assert!((x - 2.5).abs() < 1e-14);
    }

    #[test]
    fn test_smooth_data_is_fifth_order() {
        // Cell averages of sin on [0, 2π) sampled at h; compare face values.
        let f = |x: f64| x.sin();
        let avg = |a: f64, h: f64| (-(a + h).cos() + a.cos()) / h;

        let mut errors = Vec::new();
        for n in [16, 32] {
            let h = 1.0 / n as f64;
            let x0 = 0.3;
            let stencil = [
                avg(x0 - 2.0 * h, h),
                avg(x0 - h, h),
                avg(x0, h),
                avg(x0 + h, h),
                avg(x0 + 2.0 * h, h),
            ];
            errors.push((weno5_face(stencil) - f(x0 + h)).abs());
        }
        let order = (errors[0] / errors[1]).log2();
        assert!(order > 4.0, "observed order {order}");
    }

    #[test]
    fn test_discontinuity_not_oscillatory() {
        let x = weno5_face([1.0, 1.0, 1.0, 0.0, 0.0]);
        assert!((0.0..=1.0).contains(&x), "overshoot {x}");
        assert!((x - 1.0).abs() < 1e-6, "upwind stencil should dominate, got {x}");
    }

    #[test]
    fn test_field_constant_and_range() {
        let shape = GridShape::new(1, [6, 1, 1], 3).unwrap();
        let coords = CoordinateGrid::unit(shape);
        let mut prim = GridField::new(&coords, 2);
        prim.fill(0, 1.0);
        prim.fill(1, -3.0);
        let mut left = GridField::new(&coords, 2);
        let mut right = GridField::new(&coords, 2);
        left.fill(0, f64::NAN);
        right.fill(0, f64::NAN);

        reconstruct_weno5(&prim, 0, &mut left, &mut right);
        let total = shape.total(0);
        for idx in 0..total {
            let inside = (2..total - 2).contains(&idx);
            assert_eq!(left.var(0)[idx].is_nan(), !inside);
            if inside {
                assert!((left.var(0)[idx] - 1.0).abs() < 1e-14);
                assert!((right.var(1)[idx] + 3.0).abs() < 1e-14);
            }
        }
    }
}

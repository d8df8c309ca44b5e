//! Small fixed-size linear algebra for metric tensors.

use crate::types::NDIM;

/// 4×4 matrix stored as rows.
pub type Matrix4 = [[f64; NDIM]; NDIM];

/// 4×4 identity.
pub const IDENTITY: Matrix4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Determinant and inverse of a 4×4 matrix by cofactor expansion.
///
/// No pivoting or singularity check is done: a singular matrix yields a zero
/// determinant and a non-finite inverse.
pub fn invert(a: &Matrix4) -> (f64, Matrix4) {
    let [a00, a01, a02, a03] = a[0];
    let [a10, a11, a12, a13] = a[1];
    let [a20, a21, a22, a23] = a[2];
    let [a30, a31, a32, a33] = a[3];

    // 2×2 minors of the upper and lower row pairs.
    let s0 = a00 * a11 - a10 * a01;
    let s1 = a00 * a12 - a10 * a02;
    let s2 = a00 * a13 - a10 * a03;
    let s3 = a01 * a12 - a11 * a02;
    let s4 = a01 * a13 - a11 * a03;
    let s5 = a02 * a13 - a12 * a03;

    let c5 = a22 * a33 - a32 * a23;
    let c4 = a21 * a33 - a31 * a23;
    let c3 = a21 * a32 - a31 * a22;
    let c2 = a20 * a33 - a30 * a23;
    let c1 = a20 * a32 - a30 * a22;
    let c0 = a20 * a31 - a30 * a21;

    let det = s0 * c5 - s1 * c4 + s2 * c3 + s3 * c2 - s4 * c1 + s5 * c0;
    let inv_det = 1.0 / det;

    let inv = [
        [
            (a11 * c5 - a12 * c4 + a13 * c3) * inv_det,
            (-a01 * c5 + a02 * c4 - a03 * c3) * inv_det,
            (a31 * s5 - a32 * s4 + a33 * s3) * inv_det,
            (-a21 * s5 + a22 * s4 - a23 * s3) * inv_det,
        ],
        [
            (-a10 * c5 + a12 * c2 - a13 * c1) * inv_det,
            (a00 * c5 - a02 * c2 + a03 * c1) * inv_det,
            (-a30 * s5 + a32 * s2 - a33 * s1) * inv_det,
            (a20 * s5 - a22 * s2 + a23 * s1) * inv_det,
        ],
        [
            (a10 * c4 - a11 * c2 + a13 * c0) * inv_det,
            (-a00 * c4 + a01 * c2 - a03 * c0) * inv_det,
            (a30 * s4 - a31 * s2 + a33 * s0) * inv_det,
            (-a20 * s4 + a21 * s2 - a23 * s0) * inv_det,
        ],
        [
            (-a10 * c3 + a11 * c1 - a12 * c0) * inv_det,
            (a00 * c3 - a01 * c1 + a02 * c0) * inv_det,
            (-a30 * s3 + a31 * s1 - a32 * s0) * inv_det,
            (a20 * s3 - a21 * s1 + a22 * s0) * inv_det,
        ],
    ];

    (det, inv)
}

/// Matrix product `a · b`.
pub fn matmul(a: &Matrix4, b: &Matrix4) -> Matrix4 {
    let mut out = [[0.0; NDIM]; NDIM];
    for i in 0..NDIM {
        for j in 0..NDIM {
            out[i][j] = (0..NDIM).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

/// Contract a rank-2 tensor with a vector: `out^i = m^{ij} v_j`.
#[inline]
pub fn contract(m: &Matrix4, v: &[f64; NDIM]) -> [f64; NDIM] {
    let mut out = [0.0; NDIM];
    for i in 0..NDIM {
        out[i] = m[i][0] * v[0] + m[i][1] * v[1] + m[i][2] * v[2] + m[i][3] * v[3];
    }
    out
}

/// Largest absolute deviation of `a` from the identity.
pub fn identity_error(a: &Matrix4) -> f64 {
    let mut err: f64 = 0.0;
    for i in 0..NDIM {
        for j in 0..NDIM {
            err = err.max((a[i][j] - IDENTITY[i][j]).abs());
        }
    }
    err
}

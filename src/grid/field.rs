//! Multi-variable grid fields.

use super::{CoordinateGrid, GridError, GridShape};
use crate::types::{AccessCounts, Location};

/// A collection of per-variable arrays over a ghosted grid.
///
/// Each variable is stored as one contiguous array of length
/// [`GridShape::len`]. Fields are allocated once and mutated in place.
#[derive(Clone, Debug, PartialEq)]
pub struct GridField {
    shape: GridShape,
    dx: [f64; 3],
    vars: Vec<Vec<f64>>,
}

impl GridField {
    /// Zero-initialized field with `num_vars` variables on a coordinate grid.
    pub fn new(coords: &CoordinateGrid, num_vars: usize) -> Self {
        Self::with_shape(*coords.shape(), coords.dx(), num_vars)
    }

    /// Zero-initialized field from an explicit shape and spacing.
    pub fn with_shape(shape: GridShape, dx: [f64; 3], num_vars: usize) -> Self {
        Self {
            shape,
            dx,
            vars: vec![vec![0.0; shape.len()]; num_vars],
        }
    }

    /// Zero-initialized field with the same shape and spacing as `self`.
    pub fn zeros_like(&self, num_vars: usize) -> Self {
        Self::with_shape(self.shape, self.dx, num_vars)
    }

    /// Grid shape.
    #[inline]
    pub fn shape(&self) -> &GridShape {
        &self.shape
    }

    /// Number of variables.
    #[inline]
    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    /// Grid spacing along an axis.
    #[inline]
    pub fn dx(&self, axis: usize) -> f64 {
        self.dx[axis]
    }

    /// Grid spacing along X1.
    #[inline]
    pub fn dx1(&self) -> f64 {
        self.dx[0]
    }

    /// Grid spacing along X2.
    #[inline]
    pub fn dx2(&self) -> f64 {
        self.dx[1]
    }

    /// Grid spacing along X3.
    #[inline]
    pub fn dx3(&self) -> f64 {
        self.dx[2]
    }

    /// One variable's array.
    #[inline]
    pub fn var(&self, var: usize) -> &[f64] {
        &self.vars[var]
    }

    /// One variable's array, mutably.
    #[inline]
    pub fn var_mut(&mut self, var: usize) -> &mut [f64] {
        &mut self.vars[var]
    }

    /// All variable arrays.
    #[inline]
    pub fn vars(&self) -> &[Vec<f64>] {
        &self.vars
    }

    /// All variable arrays, mutably.
    #[inline]
    pub fn vars_mut(&mut self) -> &mut [Vec<f64>] {
        &mut self.vars
    }

    /// Set every point of one variable to a constant.
    pub fn fill(&mut self, var: usize, value: f64) {
        self.vars[var].fill(value);
    }

    /// Set every variable to zero.
    pub fn zero(&mut self) {
        for v in &mut self.vars {
            v.fill(0.0);
        }
    }

    /// Copy all variables from another field of the same shape.
    pub fn copy_from(&mut self, other: &GridField) -> Result<AccessCounts, GridError> {
        self.check_compatible(other)?;
        for (dst, src) in self.vars.iter_mut().zip(&other.vars) {
            dst.copy_from_slice(src);
        }
        Ok(AccessCounts::copy(self.num_vars()))
    }

    /// Copy only the interior cells from another field of the same shape.
    pub fn copy_interior_from(&mut self, other: &GridField) -> Result<AccessCounts, GridError> {
        self.check_compatible(other)?;
        let shape = self.shape;
        for (dst, src) in self.vars.iter_mut().zip(&other.vars) {
            for idx in shape.interior_indices() {
                dst[idx] = src[idx];
            }
        }
        Ok(AccessCounts::copy(self.num_vars()))
    }

    /// Gather all variables at one grid point.
    #[inline]
    pub fn gather(&self, idx: usize, out: &mut [f64]) {
        for (o, v) in out.iter_mut().zip(&self.vars) {
            *o = v[idx];
        }
    }

    /// Scatter values into all variables at one grid point.
    #[inline]
    pub fn scatter(&mut self, idx: usize, values: &[f64]) {
        for (v, &x) in self.vars.iter_mut().zip(values) {
            v[idx] = x;
        }
    }

    /// Set every point from a function of the computational coordinates.
    ///
    /// The function receives the cell-centre coordinates and a slice of
    /// length `num_vars` to fill.
    pub fn set_from_fn<F>(&mut self, coords: &CoordinateGrid, mut f: F)
    where
        F: FnMut([f64; 3], &mut [f64]),
    {
        let mut values = vec![0.0; self.num_vars()];
        for idx in 0..self.shape.len() {
            self.gather(idx, &mut values);
            f(coords.coords(idx, Location::Center), &mut values);
            self.scatter(idx, &values);
        }
    }

    /// Largest absolute difference over interior cells and all variables.
    pub fn max_interior_diff(&self, other: &GridField) -> Result<f64, GridError> {
        self.check_compatible(other)?;
        let mut max_diff: f64 = 0.0;
        for (a, b) in self.vars.iter().zip(&other.vars) {
            for idx in self.shape.interior_indices() {
                max_diff = max_diff.max((a[idx] - b[idx]).abs());
            }
        }
        Ok(max_diff)
    }

    /// Whether every interior value is finite.
    pub fn interior_is_finite(&self) -> bool {
        self.vars
            .iter()
            .all(|v| self.shape.interior_indices().all(|idx| v[idx].is_finite()))
    }

    fn check_compatible(&self, other: &GridField) -> Result<(), GridError> {
        if self.num_vars() != other.num_vars() {
            return Err(GridError::VariableMismatch {
                expected: self.num_vars(),
                actual: other.num_vars(),
            });
        }
        if self.shape != other.shape {
            return Err(GridError::ShapeMismatch {
                expected: self.shape.len(),
                actual: other.shape.len(),
            });
        }
        Ok(())
    }
}

//! Computational coordinates of a structured grid.

use super::GridShape;
use crate::types::Location;

/// Uniformly spaced computational coordinates `X1, X2, X3`.
///
/// Interior cell `i` along an axis spans
/// `[start + (i - ghost) dX, start + (i - ghost + 1) dX]`; ghost cells
/// continue the same spacing outside the domain.
#[derive(Clone, Debug, PartialEq)]
pub struct CoordinateGrid {
    shape: GridShape,
    start: [f64; 3],
    end: [f64; 3],
    dx: [f64; 3],
}

impl CoordinateGrid {
    /// Create coordinates spanning `[start, end]` along each axis.
    ///
    /// Inactive axes keep their bounds; their single cell is centred in them.
    pub fn new(shape: GridShape, start: [f64; 3], end: [f64; 3]) -> Self {
        let mut dx = [0.0; 3];
        for axis in 0..3 {
            dx[axis] = (end[axis] - start[axis]) / shape.n(axis) as f64;
        }
        Self {
            shape,
            start,
            end,
            dx,
        }
    }

    /// Unit cube `[0, 1]^dim`.
    pub fn unit(shape: GridShape) -> Self {
        Self::new(shape, [0.0; 3], [1.0; 3])
    }

    /// Grid shape.
    #[inline]
    pub fn shape(&self) -> &GridShape {
        &self.shape
    }

    /// Lower domain bound along an axis.
    #[inline]
    pub fn start(&self, axis: usize) -> f64 {
        self.start[axis]
    }

    /// Upper domain bound along an axis.
    #[inline]
    pub fn end(&self, axis: usize) -> f64 {
        self.end[axis]
    }

    /// Grid spacing along every axis.
    #[inline]
    pub fn dx(&self) -> [f64; 3] {
        self.dx
    }

    /// Computational coordinates of a grid point at the given location.
    pub fn coords(&self, idx: usize, location: Location) -> [f64; 3] {
        let ijk = self.shape.ijk(idx);
        let offset = location.offset();
        let mut x = [0.0; 3];
        for axis in 0..3 {
            let i = ijk[axis] as f64 - self.shape.ghost(axis) as f64;
            x[axis] = self.start[axis] + (i + 0.5 + offset[axis]) * self.dx[axis];
        }
        x
    }

    /// Coordinates of every grid point at a location, as one array per axis.
    pub fn coords_arrays(&self, location: Location) -> [Vec<f64>; 3] {
        let n = self.shape.len();
        let mut out = [vec![0.0; n], vec![0.0; n], vec![0.0; n]];
        for idx in 0..n {
            let x = self.coords(idx, location);
            for axis in 0..3 {
                out[axis][idx] = x[axis];
            }
        }
        out
    }
}

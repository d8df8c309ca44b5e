//! Grid extents and flat indexing.

use std::ops::Range;

use super::GridError;

/// Extents of a ghosted structured grid.
///
/// Data is stored with X1 varying fastest: the flat index of cell
/// `(i, j, k)` is `i + N1Total * (j + N2Total * k)`. Inactive axes (beyond
/// `dim`) have exactly one cell and no ghost zones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridShape {
    dim: usize,
    num_ghost: usize,
    n: [usize; 3],
    ghost: [usize; 3],
    total: [usize; 3],
}

impl GridShape {
    /// Create a grid shape.
    ///
    /// # Arguments
    /// * `dim` - Number of active spatial axes (1, 2 or 3)
    /// * `n` - Interior cells along each axis (1 for inactive axes)
    /// * `num_ghost` - Ghost-zone width, applied uniformly on active axes
    pub fn new(dim: usize, n: [usize; 3], num_ghost: usize) -> Result<Self, GridError> {
        if !(1..=3).contains(&dim) {
            return Err(GridError::InvalidDimension(dim));
        }

        let mut ghost = [0; 3];
        let mut total = [1; 3];
        for axis in 0..3 {
            let active = axis < dim;
            if n[axis] == 0 || (!active && n[axis] != 1) {
                return Err(GridError::InvalidCellCount {
                    axis,
                    cells: n[axis],
                });
            }
            if active {
                ghost[axis] = num_ghost;
            }
            total[axis] = n[axis] + 2 * ghost[axis];
        }

        Ok(Self {
            dim,
            num_ghost,
            n,
            ghost,
            total,
        })
    }

    /// Number of active spatial axes.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Ghost-zone width shared by all active axes.
    #[inline]
    pub fn num_ghost(&self) -> usize {
        self.num_ghost
    }

    /// Whether an axis (0-based) is active.
    #[inline]
    pub fn is_active(&self, axis: usize) -> bool {
        axis < self.dim
    }

    /// Interior cells along an axis.
    #[inline]
    pub fn n(&self, axis: usize) -> usize {
        self.n[axis]
    }

    /// Ghost width along an axis (zero for inactive axes).
    #[inline]
    pub fn ghost(&self, axis: usize) -> usize {
        self.ghost[axis]
    }

    /// Total cells along an axis including ghosts.
    #[inline]
    pub fn total(&self, axis: usize) -> usize {
        self.total[axis]
    }

    /// Total number of points in the ghosted domain.
    #[inline]
    pub fn len(&self) -> usize {
        self.total[0] * self.total[1] * self.total[2]
    }

    /// Always false; a valid shape has at least one point.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of interior cells.
    #[inline]
    pub fn interior_len(&self) -> usize {
        self.n[0] * self.n[1] * self.n[2]
    }

    /// Distance in the flat array between neighbours along an axis.
    #[inline]
    pub fn stride(&self, axis: usize) -> usize {
        match axis {
            0 => 1,
            1 => self.total[0],
            _ => self.total[0] * self.total[1],
        }
    }

    /// Flat index of `(i, j, k)`.
    #[inline]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        i + self.total[0] * (j + self.total[1] * k)
    }

    /// Inverse of [`index`](Self::index).
    #[inline]
    pub fn ijk(&self, idx: usize) -> [usize; 3] {
        let i = idx % self.total[0];
        let rest = idx / self.total[0];
        [i, rest % self.total[1], rest / self.total[1]]
    }

    /// Range of interior indices along an axis.
    #[inline]
    pub fn interior_range(&self, axis: usize) -> Range<usize> {
        self.ghost[axis]..self.ghost[axis] + self.n[axis]
    }

    /// Range of all indices along an axis.
    #[inline]
    pub fn full_range(&self, axis: usize) -> Range<usize> {
        0..self.total[axis]
    }

    /// Whether a flat index lies in the interior.
    pub fn is_interior(&self, idx: usize) -> bool {
        let ijk = self.ijk(idx);
        (0..3).all(|axis| self.interior_range(axis).contains(&ijk[axis]))
    }

    /// Flat indices of a box given by one range per axis, X1 fastest.
    pub fn indices_in(&self, ranges: [Range<usize>; 3]) -> impl Iterator<Item = usize> + '_ {
        let [r0, r1, r2] = ranges;
        r2.flat_map(move |k| {
            let r0 = r0.clone();
            r1.clone()
                .flat_map(move |j| r0.clone().map(move |i| self.index(i, j, k)))
        })
    }

    /// Flat indices of all interior cells, X1 fastest.
    pub fn interior_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices_in([
            self.interior_range(0),
            self.interior_range(1),
            self.interior_range(2),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_1d() {
        let shape = GridShape::new(1, [10, 1, 1], 3).unwrap();
        assert_eq!(shape.total(0), 16);
        assert_eq!(shape.total(1), 1);
        assert_eq!(shape.ghost(2), 0);
        assert_eq!(shape.len(), 16);
        assert_eq!(shape.interior_len(), 10);
        assert_eq!(shape.interior_indices().count(), 10);
        assert_eq!(shape.interior_indices().next(), Some(3));
    }

    #[test]
    fn test_index_roundtrip_3d() {
        let shape = GridShape::new(3, [4, 5, 6], 2).unwrap();
        let idx = shape.index(3, 7, 2);
        assert_eq!(shape.ijk(idx), [3, 7, 2]);
        assert_eq!(shape.stride(1), 8);
        assert_eq!(shape.stride(2), 8 * 9);
    }

    #[test]
    fn test_interior_detection() {
        let shape = GridShape::new(2, [4, 4, 1], 2).unwrap();
        assert!(!shape.is_interior(shape.index(1, 3, 0)));
        assert!(shape.is_interior(shape.index(2, 5, 0)));
        assert!(!shape.is_interior(shape.index(6, 2, 0)));
    }

    #[test]
    fn test_invalid_shapes() {
        assert_eq!(
            GridShape::new(0, [1, 1, 1], 1),
            Err(GridError::InvalidDimension(0))
        );
        assert_eq!(
            GridShape::new(1, [8, 2, 1], 1),
            Err(GridError::InvalidCellCount { axis: 1, cells: 2 })
        );
        assert!(GridShape::new(2, [8, 0, 1], 1).is_err());
    }
}

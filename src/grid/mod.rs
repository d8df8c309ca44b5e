//! Structured grid abstraction.
//!
//! A simulation lives on a logically Cartesian block of cells padded with
//! ghost zones. This module provides:
//!
//! - [`GridShape`]: interior/ghost extents and flat indexing
//! - [`CoordinateGrid`]: computational coordinates `X1, X2, X3` of every cell
//! - [`GridField`]: a named collection of per-variable arrays sharing a shape
//! - [`HaloExchange`]: the blocking ghost-zone exchange ("communicate")
//! - [`LocalHalo`]: single-subdomain exchange with periodic, outflow or
//!   mirror faces
//!
//! # Example
//!
//! ```
//! use grmhd_rs::grid::{CoordinateGrid, GridField, GridShape};
//!
//! let shape = GridShape::new(1, [10, 1, 1], 3).unwrap();
//! let coords = CoordinateGrid::new(shape, [0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
//! let field = GridField::new(&coords, 8);
//!
//! assert_eq!(shape.total(0), 16);
//! assert_eq!(field.num_vars(), 8);
//! assert!((field.dx1() - 0.1).abs() < 1e-14);
//! ```

mod coordinates;
mod field;
mod halo;
mod shape;

pub use coordinates::CoordinateGrid;
pub use field::GridField;
pub use halo::{AxisBoundaries, BoundaryKind, HaloExchange, LocalHalo};
pub use shape::GridShape;

use thiserror::Error;

/// Errors raised when building or combining grid fields.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    /// Dimensionality outside 1..=3.
    #[error("Invalid grid dimension: {0} (expected 1, 2 or 3)")]
    InvalidDimension(usize),

    /// An active axis has no interior cells, or an inactive axis has more
    /// than one.
    #[error("Invalid cell count along axis {axis}: {cells}")]
    InvalidCellCount { axis: usize, cells: usize },

    /// Two fields that must share a shape do not.
    #[error("Shape mismatch: expected {expected} points, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Two fields that must share a variable count do not.
    #[error("Variable count mismatch: expected {expected}, got {actual}")]
    VariableMismatch { expected: usize, actual: usize },
}

//! Face reconstruction of cell-centred fields.
//!
//! Reconstruction maps cell values to the values at the two faces of each
//! cell along one axis:
//! - `left[i]`: value at the lower face `i - ½` seen from cell `i`
//! - `right[i]`: value at the upper face `i + ½` seen from cell `i`
//!
//! Cells whose stencil would leave the ghosted domain are untouched.
//!
//! # Schemes
//!
//! - [`ReconstructionScheme::MinMod`]: piecewise-linear with the
//!   monotonized-central limiter; robust and second order
//! - [`ReconstructionScheme::Weno5`]: fifth-order WENO; non-oscillatory at
//!   discontinuities
//!
//! # Example
//!
//! ```
//! use grmhd_rs::grid::{CoordinateGrid, GridField, GridShape};
//! use grmhd_rs::reconstruction::ReconstructionScheme;
//!
//! let shape = GridShape::new(1, [8, 1, 1], 3).unwrap();
//! let coords = CoordinateGrid::unit(shape);
//! let mut prim = GridField::new(&coords, 1);
//! prim.fill(0, 2.0);
//!
//! let mut left = prim.zeros_like(1);
//! let mut right = prim.zeros_like(1);
//! ReconstructionScheme::Weno5.reconstruct(&prim, 0, &mut left, &mut right);
//! assert!((left.var(0)[5] - 2.0).abs() < 1e-14);
//! ```

mod limiter;
mod weno;

pub use limiter::{limited_difference, minmod, reconstruct_mm, slope_mm};
pub use weno::{WENO_EPSILON, reconstruct_weno5, weno5_face};

use crate::grid::GridField;
use crate::types::AccessCounts;

/// Available reconstruction schemes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReconstructionScheme {
    /// Monotonized-central limited linear reconstruction.
    #[default]
    MinMod,
    /// Fifth-order weighted essentially non-oscillatory reconstruction.
    Weno5,
}

impl ReconstructionScheme {
    /// Cells on each side of the reconstructed cell used by the stencil.
    pub fn stencil_half_width(self) -> usize {
        match self {
            ReconstructionScheme::MinMod => 1,
            ReconstructionScheme::Weno5 => 2,
        }
    }

    /// Ghost zones needed for every interior face to be reconstructable.
    pub fn min_ghost(self) -> usize {
        self.stencil_half_width() + 1
    }

    /// Reconstruct every variable of `prim` along `axis`.
    pub fn reconstruct(
        self,
        prim: &GridField,
        axis: usize,
        left: &mut GridField,
        right: &mut GridField,
    ) -> AccessCounts {
        match self {
            ReconstructionScheme::MinMod => reconstruct_mm(prim, axis, left, right),
            ReconstructionScheme::Weno5 => reconstruct_weno5(prim, axis, left, right),
        }
    }

    /// Human-readable name for debugging and logging.
    pub fn name(self) -> &'static str {
        match self {
            ReconstructionScheme::MinMod => "minmod",
            ReconstructionScheme::Weno5 => "weno5",
        }
    }
}

impl std::fmt::Display for ReconstructionScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

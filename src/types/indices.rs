//! Axis, location and variable indices.
//!
//! These types keep the spacetime index conventions in one place so that a
//! direction is never confused with a variable index or an array stride.

use std::fmt;

/// Spacetime dimension.
pub const NDIM: usize = 4;

/// Spacetime direction.
///
/// `T` is the time direction (index 0). Fluxes along `T` are the conserved
/// variables of the conservation law.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// Time direction (index 0).
    T,
    /// First spatial direction (index 1).
    X1,
    /// Second spatial direction (index 2).
    X2,
    /// Third spatial direction (index 3).
    X3,
}

impl Direction {
    /// The three spatial directions in order.
    pub const SPATIAL: [Direction; 3] = [Direction::X1, Direction::X2, Direction::X3];

    /// Spacetime index of this direction (0 for time).
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Direction::T => 0,
            Direction::X1 => 1,
            Direction::X2 => 2,
            Direction::X3 => 3,
        }
    }

    /// Spatial directions active in a grid of the given dimensionality.
    pub fn active(dim: usize) -> impl Iterator<Item = Direction> {
        Self::SPATIAL.into_iter().take(dim.min(3))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::T => write!(f, "t"),
            Direction::X1 => write!(f, "X1"),
            Direction::X2 => write!(f, "X2"),
            Direction::X3 => write!(f, "X3"),
        }
    }
}

/// Location inside a cell at which coordinates (and hence the geometry) are
/// evaluated.
///
/// Face locations refer to the lower face along an axis, which is where the
/// Riemann solver stores face fluxes: index `i` of a face field holds the
/// value at `i - 1/2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Location {
    /// Cell center.
    #[default]
    Center,
    /// Lower X1 face (i - 1/2).
    Left,
    /// Upper X1 face (i + 1/2).
    Right,
    /// Lower X2 face (j - 1/2).
    Bottom,
    /// Upper X2 face (j + 1/2).
    Top,
    /// Lower X3 face (k - 1/2).
    Back,
    /// Upper X3 face (k + 1/2).
    Front,
}

impl Location {
    /// Lower face location normal to a spatial direction.
    ///
    /// The time direction maps to the cell center.
    pub const fn face(dir: Direction) -> Self {
        match dir {
            Direction::T => Location::Center,
            Direction::X1 => Location::Left,
            Direction::X2 => Location::Bottom,
            Direction::X3 => Location::Back,
        }
    }

    /// Offset of this location from the cell center, in units of the cell
    /// width along each axis.
    pub const fn offset(self) -> [f64; 3] {
        match self {
            Location::Center => [0.0, 0.0, 0.0],
            Location::Left => [-0.5, 0.0, 0.0],
            Location::Right => [0.5, 0.0, 0.0],
            Location::Bottom => [0.0, -0.5, 0.0],
            Location::Top => [0.0, 0.5, 0.0],
            Location::Back => [0.0, 0.0, -0.5],
            Location::Front => [0.0, 0.0, 0.5],
        }
    }
}

/// Indices of the primitive variables.
///
/// The eight ideal-MHD variables are always present. The dissipative
/// variables follow them when enabled; see
/// [`PhysicsConfig::q_index`](crate::physics::PhysicsConfig::q_index) and
/// [`PhysicsConfig::dp_index`](crate::physics::PhysicsConfig::dp_index).
pub mod vars {
    /// Rest-mass density.
    pub const RHO: usize = 0;
    /// Internal energy density.
    pub const UU: usize = 1;
    /// Velocity relative to the normal observer, X1 component.
    pub const U1: usize = 2;
    /// Velocity relative to the normal observer, X2 component.
    pub const U2: usize = 3;
    /// Velocity relative to the normal observer, X3 component.
    pub const U3: usize = 4;
    /// Magnetic field, X1 component.
    pub const B1: usize = 5;
    /// Magnetic field, X2 component.
    pub const B2: usize = 6;
    /// Magnetic field, X3 component.
    pub const B3: usize = 7;
    /// Number of ideal-MHD variables.
    pub const NUM_IDEAL: usize = 8;
    /// Largest variable count: ideal MHD plus heat flux and pressure
    /// anisotropy.
    pub const MAX_VARS: usize = NUM_IDEAL + 2;

    /// Short names used in logs and diagnostics.
    pub const IDEAL_NAMES: [&str; NUM_IDEAL] = ["rho", "u", "u1", "u2", "u3", "B1", "B2", "B3"];
}

//! Ghost-zone exchange.
//!
//! [`HaloExchange`] is the seam to the communication layer: when
//! `communicate` returns, every ghost zone holds valid data. Multi-process
//! implementations live outside this crate; [`LocalHalo`] covers a single
//! subdomain whose faces are physical boundaries.

use super::{GridField, GridShape};
use crate::types::{AccessCounts, vars};

/// Blocking, complete ghost-zone exchange.
pub trait HaloExchange: Send + Sync {
    /// Fill every ghost zone of `field`.
    ///
    /// Interior cells must not be modified.
    fn communicate(&self, field: &mut GridField) -> AccessCounts;

    /// Human-readable name for debugging and logging.
    fn name(&self) -> &'static str;
}

/// Treatment of one domain face.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BoundaryKind {
    /// Wrap around to the opposite face.
    #[default]
    Periodic,
    /// Zero-gradient copy of the nearest interior cell.
    Outflow,
    /// Reflect across the face, flipping the normal velocity and normal
    /// magnetic field.
    Mirror,
}

/// Boundary kinds of the lower and upper face of one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AxisBoundaries {
    /// Face at the lower end of the axis.
    pub lower: BoundaryKind,
    /// Face at the upper end of the axis.
    pub upper: BoundaryKind,
}

impl AxisBoundaries {
    /// Same kind on both faces.
    pub const fn both(kind: BoundaryKind) -> Self {
        Self {
            lower: kind,
            upper: kind,
        }
    }
}

/// Ghost-zone fill for a single subdomain.
///
/// Axes are processed in order X1, X2, X3, each over the full extent of the
/// previously filled axes, so edge and corner ghosts are filled too.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LocalHalo {
    /// Boundaries along X1, X2, X3.
    pub axes: [AxisBoundaries; 3],
}

impl LocalHalo {
    /// Periodic on every face.
    pub fn periodic() -> Self {
        Self::uniform(BoundaryKind::Periodic)
    }

    /// Outflow on every face.
    pub fn outflow() -> Self {
        Self::uniform(BoundaryKind::Outflow)
    }

    /// Same kind on every face.
    pub fn uniform(kind: BoundaryKind) -> Self {
        Self {
            axes: [AxisBoundaries::both(kind); 3],
        }
    }

    /// Replace the boundaries of one axis.
    pub fn with_axis(mut self, axis: usize, boundaries: AxisBoundaries) -> Self {
        self.axes[axis] = boundaries;
        self
    }

    fn fill_axis(&self, field: &mut GridField, axis: usize) {
        let shape = *field.shape();
        let g = shape.ghost(axis);
        if g == 0 {
            return;
        }
        let n = shape.n(axis);
        let bounds = self.axes[axis];

        for v in 0..field.num_vars() {
            let sign = mirror_sign(v, axis);
            let data = field.var_mut(v);
            for idx in 0..shape.len() {
                let ijk = shape.ijk(idx);
                let i = ijk[axis];
                let (kind, src_i) = if i < g {
                    (bounds.lower, source_index(bounds.lower, i, g, n, true))
                } else if i >= g + n {
                    (bounds.upper, source_index(bounds.upper, i, g, n, false))
                } else {
                    continue;
                };
                let src = replace_axis(&shape, ijk, axis, src_i);
                data[idx] = match kind {
                    BoundaryKind::Mirror => sign * data[src],
                    _ => data[src],
                };
            }
        }
    }
}

impl HaloExchange for LocalHalo {
    fn communicate(&self, field: &mut GridField) -> AccessCounts {
        let dim = field.shape().dim();
        for axis in 0..dim {
            self.fill_axis(field, axis);
        }
        let n = field.num_vars() * dim;
        AccessCounts::new(n, n)
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

/// Index along `axis` of the interior cell that feeds ghost cell `i`.
fn source_index(kind: BoundaryKind, i: usize, g: usize, n: usize, lower: bool) -> usize {
    match kind {
        BoundaryKind::Periodic => {
            let offset = i as isize - g as isize;
            g + offset.rem_euclid(n as isize) as usize
        }
        BoundaryKind::Outflow => {
            if lower {
                g
            } else {
                g + n - 1
            }
        }
        BoundaryKind::Mirror => {
            if lower {
                // Ghost g-1-m mirrors interior g+m.
                (2 * g - 1 - i).min(g + n - 1)
            } else {
                // Ghost g+n+m mirrors interior g+n-1-m.
                (2 * (g + n) - 1)
                    .saturating_sub(i)
                    .max(g)
            }
        }
    }
}

fn replace_axis(shape: &GridShape, mut ijk: [usize; 3], axis: usize, value: usize) -> usize {
    ijk[axis] = value;
    shape.index(ijk[0], ijk[1], ijk[2])
}

/// Sign applied to a variable when mirrored across a face normal to `axis`.
fn mirror_sign(var: usize, axis: usize) -> f64 {
    if var == vars::U1 + axis || var == vars::B1 + axis {
        -1.0
    } else {
        1.0
    }
}

//! Spacetime geometry cached on a grid.
//!
//! A [`Geometry`] evaluates a [`MetricLaw`] at every point of the ghosted
//! grid, at one [`Location`] inside each cell, and caches:
//!
//! - the covariant metric `gCov` and its inverse `gCon`
//! - the determinant `gDet` and `g = sqrt(-gDet)`
//! - the lapse `alpha = 1/sqrt(-gCon^{00})`
//! - the connection coefficients `Γ^η_{μν}`
//!
//! Everything is a pure function of the coordinates, so a geometry is built
//! once per run and shared read-only by the rest of the solver.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use grmhd_rs::geometry::{Geometry, Minkowski};
//! use grmhd_rs::grid::{CoordinateGrid, GridShape};
//! use grmhd_rs::types::Location;
//!
//! let shape = GridShape::new(1, [8, 1, 1], 2).unwrap();
//! let coords = CoordinateGrid::unit(shape);
//! let geom = Geometry::new(&coords, Location::Center, Arc::new(Minkowski));
//!
//! let p = geom.point(shape.index(3, 0, 0));
//! assert_eq!(p.g, 1.0);
//! assert_eq!(p.alpha, 1.0);
//! ```

pub mod linalg;
mod metric;

pub use linalg::Matrix4;
pub use metric::{MetricLaw, Minkowski, ModifiedKerrSchild, StandardMetric};

use std::sync::Arc;

use crate::grid::{CoordinateGrid, GridShape};
use crate::types::{Location, NDIM};

/// Step in computational coordinates for differencing the metric.
pub const METRIC_DIFF_STEP: f64 = 1e-5;

/// Metric quantities at one grid point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointMetric {
    /// Covariant metric `g_{μν}`.
    pub g_cov: Matrix4,
    /// Contravariant metric `g^{μν}`.
    pub g_con: Matrix4,
    /// `det(g_{μν})`.
    pub g_det: f64,
    /// `sqrt(-gDet)`.
    pub g: f64,
    /// Lapse `1/sqrt(-g^{00})`.
    pub alpha: f64,
    /// Connection coefficients `Γ^η_{μν}` indexed `[η][μ][ν]`.
    pub gamma: [[[f64; NDIM]; NDIM]; NDIM],
}

impl PointMetric {
    /// Evaluate the metric quantities at computational coordinates `x`,
    /// without connection coefficients.
    pub fn evaluate(metric: &dyn MetricLaw, x: [f64; 3]) -> Self {
        let g_cov = metric.g_cov(x);
        let (g_det, g_con) = linalg::invert(&g_cov);
        Self {
            g_cov,
            g_con,
            g_det,
            g: (-g_det).sqrt(),
            alpha: 1.0 / (-g_con[0][0]).sqrt(),
            gamma: [[[0.0; NDIM]; NDIM]; NDIM],
        }
    }

    /// Whether every cached quantity is finite.
    pub fn is_finite(&self) -> bool {
        self.g.is_finite()
            && self.alpha.is_finite()
            && self.g_con.iter().flatten().all(|v| v.is_finite())
            && self.gamma.iter().flatten().flatten().all(|v| v.is_finite())
    }
}

/// Metric, inverse metric, lapse and connection coefficients cached at one
/// location of every cell.
#[derive(Clone)]
pub struct Geometry {
    location: Location,
    coords: CoordinateGrid,
    metric: Arc<dyn MetricLaw>,
    points: Vec<PointMetric>,
}

impl Geometry {
    /// Evaluate `metric` at `location` of every cell of `coords`, including
    /// ghost zones, and compute the connection coefficients.
    pub fn new(coords: &CoordinateGrid, location: Location, metric: Arc<dyn MetricLaw>) -> Self {
        let n = coords.shape().len();
        let points = (0..n)
            .map(|idx| PointMetric::evaluate(metric.as_ref(), coords.coords(idx, location)))
            .collect();

        let mut geom = Self {
            location,
            coords: coords.clone(),
            metric,
            points,
        };
        geom.compute_connection_coeffs();
        geom
    }

    /// Recompute `Γ^η_{μν}` at every point from centred differences of the
    /// metric law.
    ///
    /// ```text
    /// Γ^η_{μν} = ½ g^{ησ} (∂_μ g_{νσ} + ∂_ν g_{μσ} − ∂_σ g_{μν})
    /// ```
    ///
    /// The metric is stationary, so `∂_0 g = 0`. Only `μ ≤ ν` is computed;
    /// the rest is mirrored.
    pub fn compute_connection_coeffs(&mut self) {
        for idx in 0..self.points.len() {
            let x = self.coords.coords(idx, self.location);
            let dg = metric_derivatives(self.metric.as_ref(), x);
            let point = &mut self.points[idx];

            for eta in 0..NDIM {
                for mu in 0..NDIM {
                    for nu in mu..NDIM {
                        let mut sum = 0.0;
                        for sigma in 0..NDIM {
                            let lower = dg[mu][nu][sigma] + dg[nu][mu][sigma] - dg[sigma][mu][nu];
                            sum += point.g_con[eta][sigma] * lower;
                        }
                        point.gamma[eta][mu][nu] = 0.5 * sum;
                        point.gamma[eta][nu][mu] = 0.5 * sum;
                    }
                }
            }
        }
    }

    /// Physical coordinates of a grid point.
    pub fn x_coords_to_physical(&self, idx: usize) -> [f64; 3] {
        self.metric.x_coords(self.coords.coords(idx, self.location))
    }

    /// Computational coordinates of a grid point.
    #[inline]
    pub fn x_coords(&self, idx: usize) -> [f64; 3] {
        self.coords.coords(idx, self.location)
    }

    /// Location inside each cell where the metric is evaluated.
    #[inline]
    pub fn location(&self) -> Location {
        self.location
    }

    /// Grid shape.
    #[inline]
    pub fn shape(&self) -> &GridShape {
        self.coords.shape()
    }

    /// Coordinate grid.
    #[inline]
    pub fn coords(&self) -> &CoordinateGrid {
        &self.coords
    }

    /// Ghost-zone width.
    #[inline]
    pub fn num_ghost(&self) -> usize {
        self.coords.shape().num_ghost()
    }

    /// Metric law the geometry was built from.
    pub fn metric(&self) -> &dyn MetricLaw {
        self.metric.as_ref()
    }

    /// Cached quantities at one grid point.
    #[inline]
    pub fn point(&self, idx: usize) -> &PointMetric {
        &self.points[idx]
    }

    /// Cached quantities at every grid point.
    #[inline]
    pub fn points(&self) -> &[PointMetric] {
        &self.points
    }

    /// `sqrt(-gDet)` at one grid point.
    #[inline]
    pub fn g(&self, idx: usize) -> f64 {
        self.points[idx].g
    }

    /// Lapse at one grid point.
    #[inline]
    pub fn alpha(&self, idx: usize) -> f64 {
        self.points[idx].alpha
    }

    /// Whether the metric is non-degenerate everywhere.
    pub fn is_finite(&self) -> bool {
        self.points.iter().all(PointMetric::is_finite)
    }
}

impl std::fmt::Debug for Geometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Geometry")
            .field("location", &self.location)
            .field("metric", &self.metric.name())
            .field("points", &self.points.len())
            .finish()
    }
}

/// `dg[σ][μ][ν] = ∂_σ g_{μν}` by centred differences.
fn metric_derivatives(metric: &dyn MetricLaw, x: [f64; 3]) -> [[[f64; NDIM]; NDIM]; NDIM] {
    let mut dg = [[[0.0; NDIM]; NDIM]; NDIM];
    for axis in 0..3 {
        let mut plus = x;
        let mut minus = x;
        plus[axis] += METRIC_DIFF_STEP;
        minus[axis] -= METRIC_DIFF_STEP;
        let g_plus = metric.g_cov(plus);
        let g_minus = metric.g_cov(minus);
        for mu in 0..NDIM {
            for nu in 0..NDIM {
                dg[axis + 1][mu][nu] =
                    (g_plus[mu][nu] - g_minus[mu][nu]) / (2.0 * METRIC_DIFF_STEP);
            }
        }
    }
    dg
}

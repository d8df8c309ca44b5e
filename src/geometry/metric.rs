//! Metric laws: the spacetime metric as a function of computational
//! coordinates.
//!
//! # Metric Trait
//!
//! The [`MetricLaw`] trait is the injection point for problem-specific
//! backgrounds. Two laws are built in:
//! - [`Minkowski`]: flat spacetime in Cartesian coordinates
//! - [`ModifiedKerrSchild`]: Kerr black hole in horizon-penetrating
//!   coordinates with logarithmic radius and a mid-plane-concentrated polar
//!   angle (McKinney & Gammie 2004)
//!
//! [`StandardMetric`] wraps both for zero-cost runtime selection.

use std::f64::consts::PI;

use super::linalg::Matrix4;

/// Metric tensor as a function of computational coordinates.
///
/// Implementations must return a symmetric, time-independent `g_{μν}`.
pub trait MetricLaw: Send + Sync {
    /// Covariant metric `g_{μν}` at computational coordinates `X = (X1, X2, X3)`.
    fn g_cov(&self, x: [f64; 3]) -> Matrix4;

    /// Physical coordinates `x` of computational coordinates `X`.
    fn x_coords(&self, x: [f64; 3]) -> [f64; 3];

    /// Human-readable name for debugging and logging.
    fn name(&self) -> &'static str;
}

/// Flat spacetime, `diag(-1, 1, 1, 1)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Minkowski;

impl MetricLaw for Minkowski {
    fn g_cov(&self, _x: [f64; 3]) -> Matrix4 {
        [
            [-1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]
    }

    fn x_coords(&self, x: [f64; 3]) -> [f64; 3] {
        x
    }

    fn name(&self) -> &'static str {
        "minkowski"
    }
}

/// Kerr spacetime in modified Kerr-Schild coordinates (unit mass).
///
/// ```text
/// r = exp(X1)
/// θ = π X2 + (1 - h)/2 sin(2π X2)
/// φ = 2π X3
/// ```
///
/// The metric components are those of the azimuth measured in `X3` itself;
/// only [`MetricLaw::x_coords`] applies the 2π scaling.
///
/// `h = 1` gives uniform spacing in θ; smaller values concentrate zones
/// toward the mid-plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModifiedKerrSchild {
    /// Dimensionless black-hole spin `a`.
    pub spin: f64,
    /// Polar concentration parameter `h`.
    pub h_slope: f64,
}

impl ModifiedKerrSchild {
    /// Create a modified Kerr-Schild metric.
    pub fn new(spin: f64, h_slope: f64) -> Self {
        Self { spin, h_slope }
    }

    /// Outer horizon radius `r₊ = 1 + sqrt(1 - a²)`.
    pub fn horizon_radius(&self) -> f64 {
        1.0 + (1.0 - self.spin * self.spin).sqrt()
    }

    fn theta(&self, x2: f64) -> f64 {
        PI * x2 + 0.5 * (1.0 - self.h_slope) * (2.0 * PI * x2).sin()
    }

    fn dtheta_dx2(&self, x2: f64) -> f64 {
        PI * (1.0 + (1.0 - self.h_slope) * (2.0 * PI * x2).cos())
    }
}

impl Default for ModifiedKerrSchild {
    fn default() -> Self {
        Self::new(0.9375, 0.3)
    }
}

impl MetricLaw for ModifiedKerrSchild {
    fn g_cov(&self, x: [f64; 3]) -> Matrix4 {
        let a = self.spin;
        let r = x[0].exp();
        let theta = self.theta(x[1]);
        let dr_dx1 = r;
        let dtheta_dx2 = self.dtheta_dx2(x[1]);

        let sin2 = theta.sin().powi(2);
        let cos = theta.cos();
        let sigma = r * r + (a * cos).powi(2);
        let rfac = 2.0 * r / sigma;

        let g00 = -(1.0 - rfac);
        let g01 = rfac * dr_dx1;
        let g03 = -a * rfac * sin2;
        let g11 = (1.0 + rfac) * dr_dx1 * dr_dx1;
        let g13 = -a * (1.0 + rfac) * sin2 * dr_dx1;
        let g22 = sigma * dtheta_dx2 * dtheta_dx2;
        let g33 = sin2 * (sigma + a * a * (1.0 + rfac) * sin2);

        [
            [g00, g01, 0.0, g03],
            [g01, g11, 0.0, g13],
            [0.0, 0.0, g22, 0.0],
            [g03, g13, 0.0, g33],
        ]
    }

    fn x_coords(&self, x: [f64; 3]) -> [f64; 3] {
        [x[0].exp(), self.theta(x[1]), 2.0 * PI * x[2]]
    }

    fn name(&self) -> &'static str {
        "modified-kerr-schild"
    }
}

/// Enum wrapper for the built-in metric laws.
///
/// Using this enum directly avoids virtual dispatch when the metric is chosen
/// at runtime from configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StandardMetric {
    /// Flat spacetime.
    Minkowski,
    /// Kerr black hole in modified Kerr-Schild coordinates.
    ModifiedKerrSchild(ModifiedKerrSchild),
}

impl Default for StandardMetric {
    fn default() -> Self {
        StandardMetric::Minkowski
    }
}

impl MetricLaw for StandardMetric {
    fn g_cov(&self, x: [f64; 3]) -> Matrix4 {
        match self {
            StandardMetric::Minkowski => Minkowski.g_cov(x),
            StandardMetric::ModifiedKerrSchild(mks) => mks.g_cov(x),
        }
    }

    fn x_coords(&self, x: [f64; 3]) -> [f64; 3] {
        match self {
            StandardMetric::Minkowski => Minkowski.x_coords(x),
            StandardMetric::ModifiedKerrSchild(mks) => mks.x_coords(x),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            StandardMetric::Minkowski => Minkowski.name(),
            StandardMetric::ModifiedKerrSchild(mks) => mks.name(),
        }
    }
}

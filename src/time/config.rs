//! Time-stepper configuration.

use thiserror::Error;

use crate::grid::{GridShape, LocalHalo};
use crate::physics::PhysicsConfig;
use crate::reconstruction::ReconstructionScheme;
use crate::solver::NewtonConfig;

/// Invalid configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Time step not positive and finite.
    #[error("Invalid time step: {0}")]
    TimeStep(f64),

    /// Too few ghost zones for the reconstruction stencil.
    #[error("Reconstruction {scheme} needs {required} ghost zones, grid has {actual}")]
    GhostZones {
        scheme: ReconstructionScheme,
        required: usize,
        actual: usize,
    },

    /// Adiabatic index must exceed one.
    #[error("Invalid adiabatic index: {0} (must be > 1)")]
    AdiabaticIndex(f64),

    /// Relaxation time of the dissipative variables must be positive.
    #[error("Invalid relaxation time: {0} (must be > 0)")]
    RelaxationTime(f64),

    /// Any other out-of-range parameter.
    #[error("Invalid value for {name}: {value}")]
    Parameter { name: &'static str, value: f64 },
}

/// Configuration of a [`TimeStepper`](super::TimeStepper).
#[derive(Clone, Debug, PartialEq)]
pub struct TimeStepperConfig {
    /// Time step.
    pub dt: f64,
    /// Initial time.
    pub time: f64,
    /// Fluid model.
    pub physics: PhysicsConfig,
    /// Face reconstruction.
    pub reconstruction: ReconstructionScheme,
    /// Apply constrained transport to the induction fluxes.
    pub flux_ct: bool,
    /// Ghost-zone treatment used by the default halo exchange.
    pub boundaries: LocalHalo,
    /// Parameters of the default implicit solver.
    pub newton: NewtonConfig,
}

impl Default for TimeStepperConfig {
    fn default() -> Self {
        Self {
            dt: 1e-3,
            time: 0.0,
            physics: PhysicsConfig::default(),
            reconstruction: ReconstructionScheme::default(),
            flux_ct: true,
            boundaries: LocalHalo::periodic(),
            newton: NewtonConfig::default(),
        }
    }
}

impl TimeStepperConfig {
    /// Default configuration with the given time step.
    pub fn new(dt: f64) -> Self {
        Self {
            dt,
            ..Default::default()
        }
    }

    /// Set the initial time.
    pub fn with_time(mut self, time: f64) -> Self {
        self.time = time;
        self
    }

    /// Set the fluid model.
    pub fn with_physics(mut self, physics: PhysicsConfig) -> Self {
        self.physics = physics;
        self
    }

    /// Set the reconstruction scheme.
    pub fn with_reconstruction(mut self, scheme: ReconstructionScheme) -> Self {
        self.reconstruction = scheme;
        self
    }

    /// Enable or disable constrained transport.
    pub fn with_flux_ct(mut self, enabled: bool) -> Self {
        self.flux_ct = enabled;
        self
    }

    /// Set the ghost-zone treatment.
    pub fn with_boundaries(mut self, boundaries: LocalHalo) -> Self {
        self.boundaries = boundaries;
        self
    }

    /// Set the Newton parameters.
    pub fn with_newton(mut self, newton: NewtonConfig) -> Self {
        self.newton = newton;
        self
    }

    /// Check the configuration against a grid.
    pub fn validate(&self, shape: &GridShape) -> Result<(), ConfigError> {
        if !(self.dt > 0.0 && self.dt.is_finite()) {
            return Err(ConfigError::TimeStep(self.dt));
        }
        if !self.time.is_finite() {
            return Err(ConfigError::Parameter {
                name: "time",
                value: self.time,
            });
        }
        let required = self.reconstruction.min_ghost();
        if shape.num_ghost() < required {
            return Err(ConfigError::GhostZones {
                scheme: self.reconstruction,
                required,
                actual: shape.num_ghost(),
            });
        }
        self.physics.validate()?;
        self.newton.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let shape = GridShape::new(1, [8, 1, 1], 2).unwrap();
        assert!(TimeStepperConfig::default().validate(&shape).is_ok());
    }

    #[test]
    fn test_rejects_bad_dt() {
        let shape = GridShape::new(1, [8, 1, 1], 2).unwrap();
        assert_eq!(
            TimeStepperConfig::new(0.0).validate(&shape),
            Err(ConfigError::TimeStep(0.0))
        );
        assert!(TimeStepperConfig::new(f64::NAN).validate(&shape).is_err());
    }

    #[test]
    fn test_weno_needs_three_ghosts() {
        let shape = GridShape::new(1, [8, 1, 1], 2).unwrap();
        let config = TimeStepperConfig::new(0.01).with_reconstruction(ReconstructionScheme::Weno5);
        assert_eq!(
            config.validate(&shape),
            Err(ConfigError::GhostZones {
                scheme: ReconstructionScheme::Weno5,
                required: 3,
                actual: 2,
            })
        );

        let shape = GridShape::new(1, [8, 1, 1], 3).unwrap();
        assert!(config.validate(&shape).is_ok());
    }

    #[test]
    fn test_physics_errors_surface() {
        let shape = GridShape::new(1, [8, 1, 1], 2).unwrap();
        let config = TimeStepperConfig::new(0.01).with_physics(PhysicsConfig::new(0.9));
        assert_eq!(config.validate(&shape), Err(ConfigError::AdiabaticIndex(0.9)));
    }
}

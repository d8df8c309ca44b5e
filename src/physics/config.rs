//! Physical parameters of the fluid model.

use crate::time::ConfigError;
use crate::types::vars;

/// Fluid model parameters.
///
/// The ideal-MHD variables are always present. Enabling `conduction` adds a
/// heat-flux variable `q` and enabling `viscosity` adds a pressure anisotropy
/// `ΔP`; both relax toward their closure targets on the timescale
/// `relaxation_time`.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsConfig {
    /// Adiabatic index Γ of the ideal-gas equation of state `P = (Γ - 1) u`.
    pub adiabatic_index: f64,
    /// Evolve the heat flux along field lines.
    pub conduction: bool,
    /// Evolve the pressure anisotropy.
    pub viscosity: bool,
    /// Relaxation timescale `tau` of the dissipative variables.
    pub relaxation_time: f64,
    /// Heat conductivity in units of `cs² tau`.
    pub conduction_alpha: f64,
    /// Viscosity in units of `cs² tau`.
    pub viscosity_alpha: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            adiabatic_index: 4.0 / 3.0,
            conduction: false,
            viscosity: false,
            relaxation_time: 1.0,
            conduction_alpha: 1.0,
            viscosity_alpha: 1.0,
        }
    }
}

impl PhysicsConfig {
    /// Ideal MHD with the given adiabatic index.
    pub fn new(adiabatic_index: f64) -> Self {
        Self {
            adiabatic_index,
            ..Default::default()
        }
    }

    /// Enable heat conduction with the given strength.
    pub fn with_conduction(mut self, alpha: f64) -> Self {
        self.conduction = true;
        self.conduction_alpha = alpha;
        self
    }

    /// Enable viscosity with the given strength.
    pub fn with_viscosity(mut self, alpha: f64) -> Self {
        self.viscosity = true;
        self.viscosity_alpha = alpha;
        self
    }

    /// Set the relaxation timescale.
    pub fn with_relaxation_time(mut self, tau: f64) -> Self {
        self.relaxation_time = tau;
        self
    }

    /// Whether any dissipative variable is evolved.
    #[inline]
    pub fn emhd(&self) -> bool {
        self.conduction || self.viscosity
    }

    /// Number of primitive variables.
    pub fn num_vars(&self) -> usize {
        vars::NUM_IDEAL + self.conduction as usize + self.viscosity as usize
    }

    /// Index of the heat flux `q`, if evolved.
    pub fn q_index(&self) -> Option<usize> {
        self.conduction.then_some(vars::NUM_IDEAL)
    }

    /// Index of the pressure anisotropy `ΔP`, if evolved.
    pub fn dp_index(&self) -> Option<usize> {
        self.viscosity
            .then_some(vars::NUM_IDEAL + self.conduction as usize)
    }

    /// Name of every primitive variable, in storage order.
    pub fn var_names(&self) -> Vec<&'static str> {
        let mut names = vars::IDEAL_NAMES.to_vec();
        if self.conduction {
            names.push("q");
        }
        if self.viscosity {
            names.push("deltaP");
        }
        names
    }

    /// Check the parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.adiabatic_index > 1.0) {
            return Err(ConfigError::AdiabaticIndex(self.adiabatic_index));
        }
        if self.emhd() && !(self.relaxation_time > 0.0) {
            return Err(ConfigError::RelaxationTime(self.relaxation_time));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ideal_layout() {
        let physics = PhysicsConfig::default();
        assert_eq!(physics.num_vars(), 8);
        assert_eq!(physics.q_index(), None);
        assert_eq!(physics.dp_index(), None);
        assert!(physics.validate().is_ok());
    }

    #[test]
    fn test_emhd_layout() {
        let both = PhysicsConfig::default().with_conduction(1.0).with_viscosity(1.0);
        assert_eq!(both.num_vars(), 10);
        assert_eq!(both.q_index(), Some(8));
        assert_eq!(both.dp_index(), Some(9));
        assert_eq!(both.var_names()[9], "deltaP");

        let visc = PhysicsConfig::default().with_viscosity(1.0);
        assert_eq!(visc.dp_index(), Some(8));
    }

    #[test]
    fn test_validate() {
        assert!(PhysicsConfig::new(1.0).validate().is_err());
        let bad_tau = PhysicsConfig::default()
            .with_conduction(1.0)
            .with_relaxation_time(0.0);
        assert!(matches!(
            bad_tau.validate(),
            Err(ConfigError::RelaxationTime(_))
        ));
    }
}

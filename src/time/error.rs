//! Step failures.

use std::fmt;

use thiserror::Error;

use super::ConfigError;
use crate::grid::GridError;
use crate::solver::SolverError;

/// Stage of the two-stage update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Predictor to `t + dt/2`.
    #[default]
    HalfStep,
    /// Corrector to `t + dt`.
    FullStep,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::HalfStep => f.write_str("half step"),
            Stage::FullStep => f.write_str("full step"),
        }
    }
}

/// Failure of a time step.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TimeStepError {
    /// The implicit solve failed. The step was abandoned and the state at
    /// `time` is intact.
    #[error("Implicit solve failed in the {stage} at t = {time}")]
    Solve {
        stage: Stage,
        time: f64,
        #[source]
        source: SolverError,
    },

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Incompatible fields.
    #[error(transparent)]
    Grid(#[from] GridError),
}

impl TimeStepError {
    /// Whether retrying with a smaller time step may succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TimeStepError::Solve { .. })
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn test_solve_error_context() {
        let err = TimeStepError::Solve {
            stage: Stage::FullStep,
            time: 0.25,
            source: SolverError::SingularJacobian { cell: 3, iteration: 1 },
        };
        let message = err.to_string();
        assert!(message.contains("full step"));
        assert!(message.contains("0.25"));
        assert!(err.source().is_some());
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_config_error_not_recoverable() {
        let err: TimeStepError = ConfigError::TimeStep(-1.0).into();
        assert!(!err.is_recoverable());
    }
}

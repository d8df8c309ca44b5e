//! Simulation runner implementation.
//!
//! Provides a high-level interface for running a [`TimeStepper`] to a final
//! time.

use crate::time::TimeStepper;

// =============================================================================
// Simulation Configuration
// =============================================================================

/// Configuration for a simulation run.
#[derive(Clone, Debug)]
pub struct SimulationConfig {
    /// CFL number for time step calculation.
    pub cfl: f64,
    /// Maximum time step (overrides CFL if smaller).
    pub dt_max: Option<f64>,
    /// Minimum time step (simulation fails if dt drops below this).
    pub dt_min: Option<f64>,
    /// Maximum number of time steps.
    pub max_steps: Option<usize>,
    /// Times a failed step is retried with half the time step.
    pub max_retries: usize,
    /// Log progress every this many steps (0 disables).
    pub progress_interval: usize,
    /// Interval for calling callbacks (in simulation time units).
    pub callback_interval: Option<f64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            cfl: 0.5,
            dt_max: None,
            dt_min: None,
            max_steps: None,
            max_retries: 4,
            progress_interval: 100,
            callback_interval: None,
        }
    }
}

// =============================================================================
// Simulation Result
// =============================================================================

/// Result of a simulation run.
#[derive(Clone, Debug)]
pub struct SimulationResult {
    /// Final simulation time reached.
    pub final_time: f64,
    /// Total number of time steps taken.
    pub n_steps: usize,
    /// Number of steps repeated with a halved time step.
    pub retries: usize,
    /// Minimum time step used.
    pub dt_min: f64,
    /// Maximum time step used.
    pub dt_max: f64,
    /// Total wall-clock time in seconds.
    pub wall_time: f64,
    /// Whether the simulation completed successfully.
    pub success: bool,
    /// Error message if simulation failed.
    pub error: Option<String>,
}

impl SimulationResult {
    /// Create a successful result.
    pub fn success(final_time: f64, n_steps: usize, dt_min: f64, dt_max: f64, wall_time: f64) -> Self {
        Self {
            final_time,
            n_steps,
            retries: 0,
            dt_min,
            dt_max,
            wall_time,
            success: true,
            error: None,
        }
    }

    /// Create a failed result.
    pub fn failure(final_time: f64, n_steps: usize, error: String) -> Self {
        Self {
            final_time,
            n_steps,
            retries: 0,
            dt_min: f64::INFINITY,
            dt_max: 0.0,
            wall_time: 0.0,
            success: false,
            error: Some(error),
        }
    }

    fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }
}

// =============================================================================
// Simulation Runner
// =============================================================================

/// High-level simulation runner.
///
/// Chooses each time step from the Courant condition, clamps it to the end
/// time and to `dt_max`, and retries failed implicit solves with half the
/// time step.
#[derive(Clone, Debug, Default)]
pub struct Simulation {
    config: SimulationConfig,
}

impl Simulation {
    /// Create a runner with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runner from a configuration.
    pub fn with_config(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Set the CFL number.
    pub fn with_cfl(mut self, cfl: f64) -> Self {
        self.config.cfl = cfl;
        self
    }

    /// Set the maximum time step.
    pub fn with_dt_max(mut self, dt_max: f64) -> Self {
        self.config.dt_max = Some(dt_max);
        self
    }

    /// Set the minimum time step (simulation fails if dt drops below).
    pub fn with_dt_min(mut self, dt_min: f64) -> Self {
        self.config.dt_min = Some(dt_min);
        self
    }

    /// Set the maximum number of steps.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.config.max_steps = Some(max_steps);
        self
    }

    /// Set the number of retries per step.
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Set the callback interval.
    pub fn with_callback_interval(mut self, interval: f64) -> Self {
        self.config.callback_interval = Some(interval);
        self
    }

    /// Configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run the stepper from its current time to `t_end`.
    pub fn run(&self, stepper: &mut TimeStepper, t_end: f64) -> SimulationResult {
        self.run_with_callback(stepper, t_end, |_| {})
    }

    /// Run the simulation with a callback function.
    ///
    /// The callback is called with the stepper at the start, then at the
    /// configured interval (or every step if not set).
    pub fn run_with_callback<F>(&self, stepper: &mut TimeStepper, t_end: f64, mut callback: F) -> SimulationResult
    where
        F: FnMut(&TimeStepper),
    {
        let start_wall = std::time::Instant::now();
        let t_start = stepper.time();
        let tolerance = 1e-12 * t_end.abs().max(1.0);

        let mut n_steps = 0;
        let mut retries = 0;
        let mut dt_min_used = f64::INFINITY;
        let mut dt_max_used: f64 = 0.0;
        let mut last_callback_time = t_start;

        callback(stepper);

        log::info!(
            "Starting simulation with {} solver: t = {:.4} -> {:.4}",
            stepper.solver_name(),
            t_start,
            t_end
        );

        while t_end - stepper.time() > tolerance {
            let t = stepper.time();

            if let Some(max_steps) = self.config.max_steps
                && n_steps >= max_steps
            {
                return SimulationResult::failure(t, n_steps, format!("Maximum step limit ({}) reached", max_steps))
                    .with_retries(retries);
            }

            let mut dt = stepper.courant_dt(self.config.cfl);
            if let Some(dt_max) = self.config.dt_max {
                dt = dt.min(dt_max);
            }
            if !dt.is_finite() {
                return SimulationResult::failure(
                    t,
                    n_steps,
                    "No finite time step: all characteristic speeds vanish and dt_max is unset".to_string(),
                )
                .with_retries(retries);
            }

            // Don't overshoot end time
            dt = dt.min(t_end - t);

            let mut attempt = 0;
            loop {
                if let Some(dt_min) = self.config.dt_min
                    && dt < dt_min
                {
                    return SimulationResult::failure(
                        t,
                        n_steps,
                        format!("Time step ({:.2e}) below minimum ({:.2e})", dt, dt_min),
                    )
                    .with_retries(retries);
                }
                if let Err(err) = stepper.set_dt(dt) {
                    return SimulationResult::failure(t, n_steps, err.to_string()).with_retries(retries);
                }

                match stepper.time_step() {
                    Ok(_) => break,
                    Err(err) if err.is_recoverable() && attempt < self.config.max_retries => {
                        attempt += 1;
                        retries += 1;
                        log::warn!("{err}; retrying with dt = {:.3e}", 0.5 * dt);
                        dt *= 0.5;
                    }
                    Err(err) => {
                        return SimulationResult::failure(t, n_steps, err.to_string()).with_retries(retries);
                    }
                }
            }

            dt_min_used = dt_min_used.min(dt);
            dt_max_used = dt_max_used.max(dt);
            n_steps += 1;

            let should_callback = if let Some(interval) = self.config.callback_interval {
                stepper.time() - last_callback_time >= interval
            } else {
                true
            };
            if should_callback {
                callback(stepper);
                last_callback_time = stepper.time();
            }

            if self.config.progress_interval > 0 && n_steps % self.config.progress_interval == 0 {
                log::info!("Step {}: t = {:.4}, dt = {:.2e}", n_steps, stepper.time(), dt);
            }
        }

        let wall_time = start_wall.elapsed().as_secs_f64();
        log::info!(
            "Simulation complete: {} steps ({} retries), {:.2}s wall, dt in [{:.2e}, {:.2e}]",
            n_steps,
            retries,
            wall_time,
            dt_min_used,
            dt_max_used
        );

        SimulationResult::success(stepper.time(), n_steps, dt_min_used, dt_max_used, wall_time).with_retries(retries)
    }
}

//! Fixed-point iteration for a tube's DC operating point.
//!
//! The anode current depends on anode voltage, and the anode voltage depends
//! on the current through the load resistor. Starting from 80% of the supply
//! the two are alternately updated until the voltage settles.

use serde::Serialize;

use crate::catalog::AnodeModel;

use super::{CONVERGENCE_TOLERANCE, DEFAULT_GRID_VOLTAGE, MAX_ITERATIONS};

/// Fraction of the supply used as the first anode voltage guess.
const INITIAL_ANODE_FRACTION: f64 = 0.8;

/// Floor on the bias scaling factor.
const MIN_BIAS_FACTOR: f64 = 0.1;

/// Grid voltage at which the bias term vanishes.
const BIAS_REFERENCE: f64 = -2.0;

/// Exponent of the bias term.
const BIAS_EXPONENT: f64 = 0.3;

/// A solved anode voltage/current pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OperatingPoint {
    /// Anode voltage [V]
    pub anode_voltage: f64,
    /// Anode current [mA]
    pub anode_current: f64,
    /// Iterations actually run
    pub iterations: usize,
    /// Whether successive voltages agreed within tolerance
    pub converged: bool,
}

/// Operating point solver.
#[derive(Debug, Clone)]
pub struct OperatingPointSolver {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Convergence tolerance [V]
    pub tolerance: f64,
}

impl Default for OperatingPointSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl OperatingPointSolver {
    pub fn new() -> Self {
        Self {
            max_iterations: MAX_ITERATIONS,
            tolerance: CONVERGENCE_TOLERANCE,
        }
    }

    /// Create a solver with custom iteration limit and tolerance.
    pub fn with_config(max_iterations: usize, tolerance: f64) -> Self {
        Self {
            max_iterations,
            tolerance,
        }
    }

    /// Anode current [mA] at `anode_voltage` and `grid_voltage`.
    ///
    /// An empirical scaling of the tube's nominal current, not a physical
    /// tube law. The factor never drops below 0.1 of nominal.
    pub fn anode_current<T: AnodeModel + ?Sized>(&self, tube: &T, anode_voltage: f64, grid_voltage: f64) -> f64 {
        let nominal = tube.nominal_anode_current();
        if nominal == 0.0 {
            return 0.0;
        }

        let voltage_term = anode_voltage / tube.typical_anode_voltage();
        let bias_term = ((grid_voltage - BIAS_REFERENCE).abs() / BIAS_REFERENCE.abs()).powf(BIAS_EXPONENT);

        nominal * (voltage_term * bias_term).max(MIN_BIAS_FACTOR)
    }

    /// Solve with the default -2 V grid bias.
    pub fn solve<T: AnodeModel + ?Sized>(&self, tube: &T, supply: f64, load_resistance: f64) -> OperatingPoint {
        self.solve_biased(tube, supply, load_resistance, DEFAULT_GRID_VOLTAGE)
    }

    /// Find the anode voltage and current for `tube` fed from `supply` volts
    /// through `load_resistance` ohms.
    ///
    /// Always returns after at most `max_iterations`. When converged, the
    /// current was computed at the returned voltage. Otherwise the voltage is
    /// the last update, one step ahead of the returned current.
    pub fn solve_biased<T: AnodeModel + ?Sized>(
        &self,
        tube: &T,
        supply: f64,
        load_resistance: f64,
        grid_voltage: f64,
    ) -> OperatingPoint {
        if tube.nominal_anode_current() == 0.0 {
            return OperatingPoint {
                anode_voltage: supply,
                anode_current: 0.0,
                iterations: 0,
                converged: true,
            };
        }

        let mut anode_voltage = supply * INITIAL_ANODE_FRACTION;
        let mut anode_current = 0.0;
        let mut iterations = 0;
        let mut converged = false;

        for iter in 0..self.max_iterations {
            iterations = iter + 1;
            anode_current = self.anode_current(tube, anode_voltage, grid_voltage);
            let next = supply - anode_current / 1000.0 * load_resistance;

            if (next - anode_voltage).abs() < self.tolerance {
                converged = true;
                break;
            }
            anode_voltage = next;
        }

        if !converged {
            tracing::warn!(supply, load_resistance, grid_voltage, iterations, "operating point did not settle");
        }

        OperatingPoint {
            anode_voltage,
            anode_current,
            iterations,
            converged,
        }
    }
}

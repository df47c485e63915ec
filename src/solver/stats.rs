//! Whole-supply figures reduced from per-section results.

use serde::Serialize;

use super::SectionResult;

/// Aggregate figures for one propagation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Statistics {
    /// Sum of section currents [mA]
    pub total_current: f64,
    /// Sum of power dissipated in series elements [W]
    pub total_resistor_power: f64,
    /// First node voltage minus last node voltage [V]
    pub voltage_drop: f64,
    /// Ripple at the last node [mV]
    pub final_ripple: f64,
    /// Rectified peak voltage [V]
    pub peak_voltage: f64,
    /// Last node voltage as a percentage of peak
    pub efficiency: f64,
}

impl Statistics {
    /// Reduce `results` in a single pass.
    ///
    /// An empty chain, or a non-positive peak, yields zero efficiency.
    pub fn from_results(results: &[SectionResult], peak_voltage: f64) -> Self {
        let (total_current, total_resistor_power) = results
            .iter()
            .fold((0.0, 0.0), |(current, power), r| (current + r.current, power + r.resistor_power));

        let (Some(first), Some(last)) = (results.first(), results.last()) else {
            return Self {
                peak_voltage,
                ..Self::default()
            };
        };

        let efficiency = if peak_voltage > 0.0 {
            (last.voltage / peak_voltage * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };

        Self {
            total_current,
            total_resistor_power,
            voltage_drop: first.voltage - last.voltage,
            final_ripple: last.ripple_mv,
            peak_voltage,
            efficiency,
        }
    }
}

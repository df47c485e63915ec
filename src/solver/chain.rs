//! Chain propagation: the running DC voltage walked through every section.

use std::f64::consts::SQRT_2;

use serde::Serialize;

use crate::catalog::Catalog;
use crate::models::{attenuation, ripple_voltage, section_current, voltage_drop, RIPPLE_FREQUENCY};
use crate::supply::{FilterType, Section};

use super::voltages::{tube_voltages, TubeVoltages};
use super::{OperatingPointSolver, Statistics, COIL_DCR, DEFAULT_GRID_VOLTAGE};

/// Configuration for the chain propagator.
#[derive(Debug, Clone, PartialEq)]
pub struct PropagatorConfig {
    /// Extra series resistance in the output stage path, modelling sag [Ω]
    pub sag_resistance: f64,
    /// DC resistance assumed for every choke [Ω]
    pub coil_dcr: f64,
    /// Grid bias handed to the operating point solver [V]
    pub grid_voltage: f64,
}

impl Default for PropagatorConfig {
    fn default() -> Self {
        Self {
            sag_resistance: 0.0,
            coil_dcr: COIL_DCR,
            grid_voltage: DEFAULT_GRID_VOLTAGE,
        }
    }
}

impl PropagatorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sag resistance (in ohms).
    pub fn with_sag_resistance(mut self, ohms: f64) -> Self {
        self.sag_resistance = ohms;
        self
    }

    /// Set the choke DC resistance (in ohms).
    pub fn with_coil_dcr(mut self, ohms: f64) -> Self {
        self.coil_dcr = ohms;
        self
    }

    /// Set the grid bias (in volts).
    pub fn with_grid_voltage(mut self, volts: f64) -> Self {
        self.grid_voltage = volts;
        self
    }
}

/// Computed conditions at one section's node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionResult {
    pub id: u64,
    pub name: String,
    pub filter_type: FilterType,
    /// DC resistance of the series element [Ω]
    pub series_resistance: f64,
    /// Filter capacitance [µF]
    pub capacitance: f64,
    /// Node voltage [V]
    pub voltage: f64,
    /// Current drawn by this section's load [mA]
    pub current: f64,
    /// Peak-to-peak ripple [mV]
    pub ripple_mv: f64,
    /// Section filter gain at the ripple frequency (0-1)
    pub attenuation: f64,
    /// Power in the series element [W]
    pub resistor_power: f64,
    pub load_description: String,
    pub tube_voltages: TubeVoltages,
}

/// Per-section results plus the aggregate figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub results: Vec<SectionResult>,
    pub statistics: Statistics,
}

/// Rectified peak voltage for an RMS secondary of `vac` volts.
pub fn peak_voltage(vac: f64, rectifier_drop: f64) -> f64 {
    vac * SQRT_2 - rectifier_drop
}

/// Walks a section chain front to back.
///
/// Holds no state between passes: every call recomputes the whole chain
/// from its inputs.
#[derive(Debug, Clone)]
pub struct ChainPropagator<'a> {
    catalog: &'a Catalog,
    config: PropagatorConfig,
    solver: OperatingPointSolver,
}

impl<'a> ChainPropagator<'a> {
    /// Create a propagator with default configuration.
    pub fn new(catalog: &'a Catalog) -> Self {
        Self::with_config(catalog, PropagatorConfig::default())
    }

    /// Create a propagator with custom configuration.
    pub fn with_config(catalog: &'a Catalog, config: PropagatorConfig) -> Self {
        Self {
            catalog,
            config,
            solver: OperatingPointSolver::new(),
        }
    }

    /// Replace the operating point solver.
    pub fn with_solver(mut self, solver: OperatingPointSolver) -> Self {
        self.solver = solver;
        self
    }

    pub fn config(&self) -> &PropagatorConfig {
        &self.config
    }

    /// Propagate from an RMS secondary voltage through `sections` in order.
    ///
    /// Each node's voltage is the previous node's minus this section's load
    /// drop and series-element drop. Sections cascade: a node never sees the
    /// current drawn further down the chain.
    pub fn propagate(&self, vac: f64, rectifier_drop: f64, sections: &[Section]) -> Vec<SectionResult> {
        let peak = peak_voltage(vac, rectifier_drop);
        let span = tracing::info_span!("propagate", sections = sections.len(), peak_voltage = peak);
        let _enter = span.enter();

        let mut voltage = peak;
        let mut results = Vec::with_capacity(sections.len());

        for section in sections {
            let load = section.load.as_ref();

            let current = load.map(|l| section_current(l, self.catalog)).unwrap_or(0.0);
            voltage -= load
                .map(|l| voltage_drop(l, current, self.config.sag_resistance))
                .unwrap_or(0.0);

            let series_resistance = section.series_resistance(self.config.coil_dcr);
            voltage -= series_resistance * current / 1000.0;

            let attenuation = attenuation(section, RIPPLE_FREQUENCY);
            let ripple_mv = ripple_voltage(current, section.capacitance, 0.0) * attenuation;

            let tube_voltages = match load {
                Some(load) => tube_voltages(
                    load,
                    voltage,
                    self.catalog,
                    &self.solver,
                    self.config.sag_resistance,
                    self.config.grid_voltage,
                ),
                None => TubeVoltages::None,
            };

            tracing::debug!(
                section = %section.name,
                voltage,
                current,
                ripple_mv,
                attenuation,
                "section propagated"
            );

            results.push(SectionResult {
                id: section.id,
                name: section.name.clone(),
                filter_type: section.filter_type,
                series_resistance,
                capacitance: section.capacitance,
                voltage,
                current,
                ripple_mv,
                attenuation,
                resistor_power: series_resistance * (current / 1000.0).powi(2),
                load_description: load.map(|l| l.description()).unwrap_or_default(),
                tube_voltages,
            });
        }

        results
    }

    /// Propagate and reduce, looking the rectifier up by name.
    pub fn analyze(&self, vac: f64, rectifier: &str, sections: &[Section]) -> Analysis {
        let drop = self.catalog.rectifier_drop(rectifier);
        let results = self.propagate(vac, drop, sections);
        let statistics = Statistics::from_results(&results, peak_voltage(vac, drop));
        Analysis { results, statistics }
    }
}

//! # Tube PSU Core
//!
//! Calculation engine for vacuum-tube amplifier power supplies.
//!
//! This library provides:
//! - A model of the B+ filter chain as an ordered list of RC/LC sections
//! - Load models for output, screen, phase inverter and preamp stages
//! - Ripple and filter attenuation at the full-wave ripple frequency
//! - An iterative tube operating point solver
//! - Saved-design import/export, CSV export and a preset library
//!
//! ## Architecture
//!
//! - [`units`] - Resistor shorthand parsing ("4k7") and display formatting
//! - [`catalog`] - Reference tables for tubes, inverters, stage configurations and rectifiers
//! - [`supply`] - Sections, loads and section-list editing
//! - [`models`] - Per-section current, drop and ripple models, design helpers
//! - [`solver`] - Operating point solver and chain propagator
//! - [`config`] - The JSON design format, validation, CSV and presets
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! psu design.json
//! psu --preset "Marshall JCM800" --csv > jcm800.csv
//! ```
//!
//! ### Library
//!
//! ```rust
//! use tube_psu_core::{catalog::Catalog, supply::default_sections, ChainPropagator};
//!
//! let catalog = Catalog::standard();
//! let sections = default_sections("EL34", "Push-Pull");
//! let analysis = ChainPropagator::new(&catalog).analyze(350.0, "Silicon Bridge", &sections);
//! assert_eq!(analysis.results.len(), 4);
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { WasmPsuDesigner } from 'tube_psu_core';
//!
//! const designer = new WasmPsuDesigner();
//! const analysis = JSON.parse(designer.calculate(configJson));
//! ```
//!
//! ## Calculation Method
//!
//! The rectified peak `Vac·√2 − Vrect` enters the first section. Each section
//! subtracts its load's internal drop and the drop across its series element
//! at the load's current, then scales the reservoir ripple by its filter
//! attenuation. Tube electrode voltages at each node come from a fixed-point
//! iteration between anode current and anode resistor drop.

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod solver;
pub mod supply;
pub mod units;

// Re-export main types for convenience
pub use catalog::Catalog;
pub use config::SupplyConfig;
pub use error::{PsuError, Result};
pub use solver::{Analysis, ChainPropagator, PropagatorConfig, SectionResult, Statistics};
pub use supply::{FilterType, Load, Section};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmPsuDesigner;

/// Transformer secondary used when a design names none [V AC]
pub const DEFAULT_VAC: f64 = 350.0;

/// Rectifier used when a design names none
pub const DEFAULT_RECTIFIER: &str = "Silicon Bridge";

//! WASM bindings for Tube PSU Core.
//!
//! Designs cross the boundary as JSON strings in the saved-design format, and
//! results come back as JSON.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmPsuDesigner, parse_resistance } from 'tube_psu_core';
//!
//! await init();
//!
//! const designer = new WasmPsuDesigner();
//! const config = designer.preset("Vox AC30");
//! const { results, statistics } = JSON.parse(designer.calculate(config));
//!
//! parse_resistance("4k7"); // 4700
//! ```

use wasm_bindgen::prelude::*;

use crate::catalog::Catalog;
use crate::config::{self, SupplyConfig};
use crate::solver::PropagatorConfig;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// WASM-compatible supply calculator.
#[wasm_bindgen]
pub struct WasmPsuDesigner {
    catalog: Catalog,
    config: PropagatorConfig,
}

impl Default for WasmPsuDesigner {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl WasmPsuDesigner {
    /// Create a calculator over the standard catalog.
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmPsuDesigner {
        Self::with_config(0.0, crate::solver::COIL_DCR, crate::solver::DEFAULT_GRID_VOLTAGE)
    }

    /// Create a calculator with custom sag, choke DCR and grid bias.
    ///
    /// # Arguments
    /// * `sag_resistance` - Output stage sag resistance in ohms (default: 0)
    /// * `coil_dcr` - Choke DC resistance in ohms (default: 10)
    /// * `grid_voltage` - Grid bias in volts (default: -2)
    #[wasm_bindgen]
    pub fn with_config(sag_resistance: f64, coil_dcr: f64, grid_voltage: f64) -> WasmPsuDesigner {
        let config = PropagatorConfig::new()
            .with_sag_resistance(sag_resistance)
            .with_coil_dcr(coil_dcr)
            .with_grid_voltage(grid_voltage);

        WasmPsuDesigner {
            catalog: Catalog::standard(),
            config,
        }
    }

    /// Propagate a saved design and return `{ results, statistics }` as JSON.
    #[wasm_bindgen]
    pub fn calculate(&self, config_json: &str) -> Result<String, JsValue> {
        let design = SupplyConfig::from_json(config_json).map_err(js_error)?;
        let analysis = design.analyze(&self.catalog, self.config.clone());
        serde_json::to_string(&analysis).map_err(js_error)
    }

    /// Validation problems for a saved design, as a JSON array of strings.
    #[wasm_bindgen]
    pub fn validate(&self, config_json: &str) -> Result<String, JsValue> {
        let design = SupplyConfig::from_json(config_json).map_err(js_error)?;
        serde_json::to_string(&config::validate_config(&design)).map_err(js_error)
    }

    /// Results of a saved design as CSV.
    #[wasm_bindgen]
    pub fn export_csv(&self, config_json: &str) -> Result<String, JsValue> {
        let design = SupplyConfig::from_json(config_json).map_err(js_error)?;
        let analysis = design.analyze(&self.catalog, self.config.clone());
        config::to_csv(&analysis.results, design.vac, &design.rectifier).map_err(js_error)
    }

    /// A library preset expanded into a saved design.
    #[wasm_bindgen]
    pub fn preset(&self, name: &str) -> Result<String, JsValue> {
        config::preset_config(&self.catalog, name)
            .and_then(|design| design.stamped().to_json())
            .map_err(js_error)
    }

    /// Names of the library presets as a JSON array.
    #[wasm_bindgen]
    pub fn preset_names(&self) -> String {
        let names: Vec<&str> = config::preset_names().collect();
        serde_json::to_string(&names).unwrap_or_default()
    }
}

/// Parse resistor shorthand ("4k7", "1M", "470r") into ohms.
#[wasm_bindgen]
pub fn parse_resistance(text: &str) -> f64 {
    crate::units::parse_resistance(text)
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

//! The saved-design JSON format.

use std::collections::HashSet;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::{PsuError, Result};
use crate::solver::{Analysis, ChainPropagator, PropagatorConfig};
use crate::supply::{free_section_id, Section};

/// Format version written on export.
pub const CONFIG_VERSION: &str = "6.0";

/// A complete saved design.
///
/// Every field defaults when absent so a partial file still loads; use
/// [`SupplyConfig::validate`] to find what is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyConfig {
    #[serde(default)]
    pub version: String,
    /// RFC 3339 export time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Transformer secondary [V AC]
    #[serde(default)]
    pub vac: f64,
    /// Rectifier catalog name
    #[serde(default)]
    pub rectifier: String,
    #[serde(rename = "powerTubeType", default)]
    pub power_tube_type: Option<String>,
    #[serde(rename = "powerConfig", default)]
    pub power_config: Option<String>,
    #[serde(default)]
    pub stages: Vec<Section>,
}

impl SupplyConfig {
    /// Create a configuration at the current format version.
    pub fn new(vac: f64, rectifier: impl Into<String>, stages: Vec<Section>) -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            timestamp: None,
            vac,
            rectifier: rectifier.into(),
            power_tube_type: None,
            power_config: None,
            stages,
        }
    }

    /// Record the output tube and stage configuration.
    pub fn with_power_stage(mut self, tube: impl Into<String>, config: impl Into<String>) -> Self {
        self.power_tube_type = Some(tube.into());
        self.power_config = Some(config.into());
        self
    }

    /// Set the current version and export time.
    pub fn stamped(mut self) -> Self {
        self.version = CONFIG_VERSION.to_string();
        self.timestamp = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
        self
    }

    /// Parse a saved design, fixing up missing or duplicated section ids.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(json)?;
        assign_section_ids(&mut config.stages);
        Ok(config)
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a saved design from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| PsuError::FileReadError {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Self::from_json(&contents)
    }

    /// Write a stamped copy of this design to disk.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.clone().stamped().to_json()?;
        std::fs::write(path, json).map_err(|source| PsuError::FileWriteError {
            path: path.display().to_string(),
            source,
        })
    }

    /// Run the chain propagator over this design.
    pub fn analyze(&self, catalog: &Catalog, config: PropagatorConfig) -> Analysis {
        ChainPropagator::with_config(catalog, config).analyze(self.vac, &self.rectifier, &self.stages)
    }
}

/// Give every section a unique non-zero id, keeping ids that already are.
pub(crate) fn assign_section_ids(stages: &mut [Section]) {
    let mut used: HashSet<u64> = stages.iter().map(|s| s.id).filter(|&id| id != 0).collect();
    let mut seen = HashSet::new();

    for stage in stages.iter_mut() {
        if stage.id == 0 || !seen.insert(stage.id) {
            let id = free_section_id(&used);
            tracing::debug!(section = %stage.name, old = stage.id, new = id, "reassigned section id");
            stage.id = id;
            used.insert(id);
            seen.insert(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PUSH_PULL;
    use crate::supply::{default_sections, FilterType, Load};
    use approx::assert_relative_eq;

    const EXPORTED: &str = r#"{
        "version": "6.0",
        "timestamp": "2025-03-01T18:22:05.123Z",
        "vac": 350,
        "rectifier": "GZ34 / 5AR4",
        "powerTubeType": "EL34",
        "powerConfig": "Push-Pull",
        "stages": [
            { "name": "A", "R": 0, "C": 47, "filterType": "RC",
              "load": { "type": "power", "tubes": "EL34", "config": "Push-Pull", "dcr": 100 } },
            { "name": "B", "R": 1000, "C": 47, "filterType": "LC", "L": 10,
              "load": { "type": "g2", "tubes": "EL34", "config": "Push-Pull", "resistor": 470 } },
            { "name": "C", "R": "4k7", "C": 22,
              "load": { "type": "inverter", "inverterType": "Long-tail pair", "Ra": 100000 } }
        ]
    }"#;

    #[test]
    fn test_import_exported_file() {
        let config = SupplyConfig::from_json(EXPORTED).unwrap();
        assert_eq!(config.version, "6.0");
        assert_eq!(config.vac, 350.0);
        assert_eq!(config.power_tube_type.as_deref(), Some("EL34"));
        assert_eq!(config.stages.len(), 3);
        assert_eq!(config.stages[1].filter_type, FilterType::LC);
        assert_eq!(config.stages[1].inductance, Some(10.0));
        assert_eq!(config.stages[2].resistance, 4_700.0);

        // Files written without ids get 1, 2, 3
        let ids: Vec<u64> = config.stages.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_round_trip() {
        let config = SupplyConfig::new(325.0, "Silicon Bridge", default_sections("6L6GC", PUSH_PULL))
            .with_power_stage("6L6GC", PUSH_PULL)
            .stamped();

        let json = config.to_json().unwrap();
        assert!(json.contains("\"powerTubeType\": \"6L6GC\""));
        assert_eq!(SupplyConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_duplicate_ids_are_reassigned() {
        let mut stages = default_sections("EL34", PUSH_PULL);
        stages[2].id = 1;
        stages[3].id = 0;
        assign_section_ids(&mut stages);

        let ids: Vec<u64> = stages.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_unknown_load_type_survives_import() {
        let json = r#"{"version":"6.0","vac":300,"rectifier":"5Y3",
                       "stages":[{"id":7,"name":"A","R":100,"C":10,"load":{"type":"heater","volts":6.3}}]}"#;
        let config = SupplyConfig::from_json(json).unwrap();
        assert_eq!(config.stages[0].id, 7);
        assert!(matches!(config.stages[0].load, Some(Load::Other(_))));

        let input: serde_json::Value = serde_json::from_str(json).unwrap();
        let exported: serde_json::Value = serde_json::from_str(&config.to_json().unwrap()).unwrap();
        assert_eq!(exported["stages"][0]["load"], input["stages"][0]["load"]);
    }

    #[test]
    fn test_text_resistances_in_loads_import() {
        let json = r#"{"version":"6.0","vac":350,"rectifier":"GZ34","stages":[
            {"id":1,"name":"C","R":"10k","C":22,"load":{"type":"inverter","inverterType":"LTP","Ra":"100k"}},
            {"id":2,"name":"D","R":"22k","C":22,"load":{"type":"preamp","tubes":"12AX7","count":2,
                "Ra":"100k","Rk":"1k5","separateRa":true,"RaArray":["100k","220k","47k","oops"]}}]}"#;
        let config = SupplyConfig::from_json(json).unwrap();

        match &config.stages[0].load {
            Some(Load::Inverter(inverter)) => assert_relative_eq!(inverter.anode_resistor(), 100_000.0),
            other => panic!("expected inverter load, got {:?}", other),
        }
        match &config.stages[1].load {
            Some(Load::Preamp(preamp)) => {
                assert_relative_eq!(preamp.anode_resistor(), 100_000.0);
                assert_relative_eq!(preamp.cathode_resistor(), 1_500.0);
                assert_eq!(preamp.anode_resistors, Some(vec![100_000.0, 220_000.0, 47_000.0, 0.0]));
            }
            other => panic!("expected preamp load, got {:?}", other),
        }

        let analysis = config.analyze(&Catalog::standard(), PropagatorConfig::default());
        assert!(analysis.results.iter().all(|r| r.voltage.is_finite()));
    }

    #[test]
    fn test_ids_near_the_top_of_the_range() {
        let mut stages = default_sections("EL34", PUSH_PULL);
        stages[0].id = u64::MAX;
        stages[1].id = u64::MAX;
        stages[2].id = 0;
        stages[3].id = 1;
        assign_section_ids(&mut stages);

        let ids: Vec<u64> = stages.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![u64::MAX, 2, 3, 1]);
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(SupplyConfig::from_json("{ not json"), Err(PsuError::Json(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = SupplyConfig::load("/nonexistent/psu.json").unwrap_err();
        assert!(matches!(err, PsuError::FileReadError { .. }));
        assert!(err.to_string().contains("/nonexistent/psu.json"));
    }

    #[test]
    fn test_analyze_uses_named_rectifier() {
        let config = SupplyConfig::from_json(EXPORTED).unwrap();
        let analysis = config.analyze(&Catalog::standard(), PropagatorConfig::default());
        assert!((analysis.statistics.peak_voltage - (350.0 * std::f64::consts::SQRT_2 - 17.0)).abs() < 1e-9);
        assert_eq!(analysis.results.len(), 3);
    }
}

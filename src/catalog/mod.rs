//! Static reference data consulted by name.
//!
//! The [`Catalog`] holds five immutable tables: power tubes, preamp tubes,
//! phase inverter topologies, output stage configurations and rectifiers.
//! The calculation engine receives a `&Catalog` rather than reaching for
//! globals, so tests can build a catalog with exactly the entries they need.
//!
//! Every lookup returns an `Option`. A miss is never an error: the engine
//! treats an unknown name as a zero contribution.

mod data;
mod types;

use std::collections::HashMap;
use std::sync::OnceLock;

pub use data::{LONG_TAIL_PAIR, PUSH_PULL, SINGLE_ENDED};
pub use types::*;

/// Immutable lookup tables, keyed by display name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    power_tubes: HashMap<String, PowerTube>,
    preamp_tubes: HashMap<String, PreampTube>,
    inverters: HashMap<String, InverterType>,
    power_configs: HashMap<String, PowerConfig>,
    rectifiers: HashMap<String, Rectifier>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the standard catalog of guitar and hi-fi tubes.
    pub fn standard() -> Self {
        fn table<T>(rows: Vec<(&'static str, T)>) -> HashMap<String, T> {
            rows.into_iter()
                .map(|(name, record)| (name.to_string(), record))
                .collect()
        }

        Self {
            power_tubes: table(data::power_tubes()),
            preamp_tubes: table(data::preamp_tubes()),
            inverters: table(data::inverters()),
            power_configs: table(data::power_configs()),
            rectifiers: table(data::rectifiers()),
        }
    }

    /// The standard catalog, built on first use and shared afterwards.
    pub fn shared() -> &'static Catalog {
        static SHARED: OnceLock<Catalog> = OnceLock::new();
        SHARED.get_or_init(Catalog::standard)
    }

    // ============ Builders ============

    /// Add or replace a power tube.
    pub fn with_power_tube(mut self, name: impl Into<String>, tube: PowerTube) -> Self {
        self.power_tubes.insert(name.into(), tube);
        self
    }

    /// Add or replace a preamp tube.
    pub fn with_preamp_tube(mut self, name: impl Into<String>, tube: PreampTube) -> Self {
        self.preamp_tubes.insert(name.into(), tube);
        self
    }

    /// Add or replace an inverter topology.
    pub fn with_inverter(mut self, name: impl Into<String>, inverter: InverterType) -> Self {
        self.inverters.insert(name.into(), inverter);
        self
    }

    /// Add or replace an output stage configuration.
    pub fn with_power_config(mut self, name: impl Into<String>, config: PowerConfig) -> Self {
        self.power_configs.insert(name.into(), config);
        self
    }

    /// Add or replace a rectifier.
    pub fn with_rectifier(mut self, name: impl Into<String>, rectifier: Rectifier) -> Self {
        self.rectifiers.insert(name.into(), rectifier);
        self
    }

    // ============ Lookups ============

    pub fn power_tube(&self, name: &str) -> Option<&PowerTube> {
        self.power_tubes.get(name)
    }

    pub fn preamp_tube(&self, name: &str) -> Option<&PreampTube> {
        self.preamp_tubes.get(name)
    }

    pub fn inverter(&self, name: &str) -> Option<&InverterType> {
        self.inverters.get(name)
    }

    pub fn power_config(&self, name: &str) -> Option<&PowerConfig> {
        self.power_configs.get(name)
    }

    pub fn rectifier(&self, name: &str) -> Option<&Rectifier> {
        self.rectifiers.get(name)
    }

    /// Forward drop of the named rectifier, or zero when unknown.
    pub fn rectifier_drop(&self, name: &str) -> f64 {
        match self.rectifier(name) {
            Some(rectifier) => rectifier.drop,
            None => {
                tracing::warn!(rectifier = name, "unknown rectifier, assuming no forward drop");
                0.0
            }
        }
    }

    /// Absolute ratings for a tube from either tube table.
    pub fn tube_limits(&self, name: &str) -> Option<TubeLimits> {
        if let Some(tube) = self.power_tube(name) {
            return Some(TubeLimits {
                max_anode_voltage: tube.max_anode_voltage,
                max_dissipation: Some(tube.max_dissipation),
            });
        }
        self.preamp_tube(name).map(|tube| TubeLimits {
            max_anode_voltage: tube.max_anode_voltage,
            max_dissipation: None,
        })
    }

    // ============ Listings (sorted, for menus) ============

    pub fn power_tube_names(&self) -> Vec<&str> {
        sorted_keys(&self.power_tubes)
    }

    pub fn preamp_tube_names(&self) -> Vec<&str> {
        sorted_keys(&self.preamp_tubes)
    }

    pub fn inverter_names(&self) -> Vec<&str> {
        sorted_keys(&self.inverters)
    }

    pub fn power_config_names(&self) -> Vec<&str> {
        sorted_keys(&self.power_configs)
    }

    pub fn rectifier_names(&self) -> Vec<&str> {
        sorted_keys(&self.rectifiers)
    }
}

fn sorted_keys<T>(map: &HashMap<String, T>) -> Vec<&str> {
    let mut names: Vec<&str> = map.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_lookups() {
        let catalog = Catalog::standard();

        let el34 = catalog.power_tube("EL34").unwrap();
        assert_eq!(el34.anode_current, 40.0);
        assert_eq!(el34.screen_current, 5.0);
        assert!(el34.kind.has_screen_grid());

        assert!(!catalog.power_tube("300B").unwrap().kind.has_screen_grid());
        assert_eq!(catalog.preamp_tube("12AX7").unwrap().anode_current, 1.2);
        assert_eq!(catalog.inverter(LONG_TAIL_PAIR).unwrap().current, 2.5);
        assert_eq!(catalog.power_config(PUSH_PULL).unwrap().multiplier, 2.0);
        assert_eq!(catalog.rectifier("GZ34 / 5AR4").unwrap().drop, 17.0);
    }

    #[test]
    fn test_misses_degrade() {
        let catalog = Catalog::standard();
        assert!(catalog.power_tube("6L6").is_none());
        assert_eq!(catalog.rectifier_drop("Selenium Stack"), 0.0);
        assert!(catalog.tube_limits("nonexistent").is_none());
    }

    #[test]
    fn test_tube_limits_from_either_table() {
        let catalog = Catalog::standard();
        let power = catalog.tube_limits("KT88").unwrap();
        assert_eq!(power.max_anode_voltage, 600.0);
        assert_eq!(power.max_dissipation, Some(42.0));

        let preamp = catalog.tube_limits("12AV7").unwrap();
        assert_eq!(preamp.max_anode_voltage, 330.0);
        assert_eq!(preamp.max_dissipation, None);
    }

    #[test]
    fn test_injected_entries() {
        let catalog = Catalog::empty().with_rectifier(
            "Test",
            Rectifier {
                drop: 5.0,
                kind: RectifierKind::SolidState,
                regulation: 1.0,
                max_current: 100.0,
            },
        );
        assert_eq!(catalog.rectifier_drop("Test"), 5.0);
        assert_eq!(catalog.rectifier_names(), vec!["Test"]);
        assert!(catalog.power_tube_names().is_empty());
    }

    #[test]
    fn test_shared_is_standard() {
        let shared = Catalog::shared();
        assert_eq!(shared.power_tube_names().len(), 17);
        assert!(std::ptr::eq(shared, Catalog::shared()));
    }
}

//! Library of classic amplifier supplies.

use crate::catalog::{Catalog, LONG_TAIL_PAIR, PUSH_PULL, SINGLE_ENDED};
use crate::error::{PsuError, Result};
use crate::supply::{default_load, FilterType, Load, Section};

use super::SupplyConfig;

/// A stored supply design.
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    /// Transformer secondary [V AC]
    pub vac: f64,
    pub rectifier: &'static str,
    /// Preamp triodes in the amplifier
    pub triodes: u32,
    /// Output stage shorthand, e.g. "EL34 PP"
    pub power_stage: Option<&'static str>,
    /// Filter sections as (name, R [Ω], C [µF])
    pub stages: &'static [(&'static str, f64, f64)],
}

#[rustfmt::skip]
pub static PRESETS: &[Preset] = &[
    Preset {
        name: "Fender Twin Reverb", category: "Fender",
        description: "Classic Twin Reverb supply, solid and dependable",
        vac: 325.0, rectifier: "Silicon Bridge", triodes: 4, power_stage: Some("6L6GC PP"),
        stages: &[("A", 0.0, 47.0), ("B", 1000.0, 47.0), ("C", 4700.0, 22.0), ("D", 100_000.0, 22.0)],
    },
    Preset {
        name: "Fender Deluxe Reverb", category: "Fender",
        description: "Iconic 22 W combo with a warm, dynamic tone",
        vac: 325.0, rectifier: "GZ34 / 5AR4", triodes: 3, power_stage: Some("6V6 SE"),
        stages: &[("A", 0.0, 47.0), ("B", 1500.0, 47.0), ("C", 10_000.0, 22.0), ("D", 47_000.0, 22.0)],
    },
    Preset {
        name: "Fender Princeton Reverb", category: "Fender",
        description: "Small combo with big character, ideal for the studio",
        vac: 300.0, rectifier: "GZ34 / 5AR4", triodes: 3, power_stage: Some("6V6 SE"),
        stages: &[("A", 0.0, 47.0), ("B", 2200.0, 47.0), ("C", 15_000.0, 22.0), ("D", 68_000.0, 22.0)],
    },
    Preset {
        name: "Marshall JCM800", category: "Marshall",
        description: "Legendary British rock sound, aggressive and punchy",
        vac: 340.0, rectifier: "Silicon Bridge", triodes: 6, power_stage: Some("EL34 PP"),
        stages: &[("A", 0.0, 100.0), ("B", 1000.0, 47.0), ("C", 10_000.0, 22.0), ("D", 47_000.0, 22.0)],
    },
    Preset {
        name: "Marshall JTM45", category: "Marshall",
        description: "Vintage 60s Marshall with a warm crunch",
        vac: 325.0, rectifier: "GZ34 / 5AR4", triodes: 4, power_stage: Some("EL34 PP"),
        stages: &[("A", 0.0, 47.0), ("B", 1500.0, 47.0), ("C", 22_000.0, 16.0), ("D", 100_000.0, 16.0)],
    },
    Preset {
        name: "Marshall JCM900", category: "Marshall",
        description: "90s British metal, precise with a strong drive",
        vac: 350.0, rectifier: "Silicon Bridge", triodes: 7, power_stage: Some("EL34 PP"),
        stages: &[("A", 0.0, 100.0), ("B", 470.0, 100.0), ("C", 4700.0, 47.0), ("D", 22_000.0, 22.0)],
    },
    Preset {
        name: "Vox AC30", category: "Vox",
        description: "British classic built around EL84s in class A",
        vac: 340.0, rectifier: "GZ34 / 5AR4", triodes: 5, power_stage: Some("EL84 PP"),
        stages: &[("A", 0.0, 47.0), ("B", 1000.0, 47.0), ("C", 10_000.0, 32.0), ("D", 68_000.0, 16.0)],
    },
    Preset {
        name: "Vox AC15", category: "Vox",
        description: "The AC30's smaller sibling, a good balance of power and tone",
        vac: 320.0, rectifier: "GZ34 / 5AR4", triodes: 4, power_stage: Some("EL84 PP"),
        stages: &[("A", 0.0, 47.0), ("B", 1500.0, 47.0), ("C", 15_000.0, 22.0), ("D", 100_000.0, 16.0)],
    },
    Preset {
        name: "Williamson Amplifier", category: "Hi-Fi",
        description: "Classic hi-fi design with ultra-low distortion",
        vac: 350.0, rectifier: "5U4G", triodes: 2, power_stage: Some("EL34 PP"),
        stages: &[("A", 0.0, 100.0), ("B", 470.0, 100.0), ("C", 4700.0, 47.0), ("D", 47_000.0, 22.0)],
    },
    Preset {
        name: "Quad II", category: "Hi-Fi",
        description: "Legendary British hi-fi with musical precision",
        vac: 330.0, rectifier: "GZ34 / 5AR4", triodes: 2, power_stage: Some("EL34 PP"),
        stages: &[("A", 0.0, 100.0), ("B", 1000.0, 100.0), ("C", 10_000.0, 47.0), ("D", 100_000.0, 22.0)],
    },
    Preset {
        name: "Dumble Style", category: "Boutique",
        description: "Dumble-inspired smooth overdrive with compression",
        vac: 330.0, rectifier: "Silicon Bridge", triodes: 6, power_stage: Some("6L6GC PP"),
        stages: &[("A", 0.0, 47.0), ("B", 2200.0, 47.0), ("C", 15_000.0, 22.0), ("D", 68_000.0, 22.0)],
    },
    Preset {
        name: "Matchless DC30", category: "Boutique",
        description: "Boutique class A with a warm, compressed character",
        vac: 340.0, rectifier: "GZ34 / 5AR4", triodes: 5, power_stage: Some("EL84 PP"),
        stages: &[("A", 0.0, 47.0), ("B", 1200.0, 47.0), ("C", 12_000.0, 32.0), ("D", 82_000.0, 16.0)],
    },
    Preset {
        name: "Modern High Gain", category: "Modern",
        description: "Modern metal/rock with high voltages and a stable supply",
        vac: 380.0, rectifier: "Silicon Bridge", triodes: 8, power_stage: Some("EL34 PP"),
        stages: &[("A", 0.0, 100.0), ("B", 470.0, 100.0), ("C", 2200.0, 47.0), ("D", 10_000.0, 47.0), ("E", 47_000.0, 22.0)],
    },
    Preset {
        name: "Mesa Boogie Style", category: "Modern",
        description: "Californian high gain, a tight and precise metal tone",
        vac: 385.0, rectifier: "Silicon Bridge", triodes: 7, power_stage: Some("6L6GC PP"),
        stages: &[("A", 0.0, 100.0), ("B", 680.0, 100.0), ("C", 3300.0, 47.0), ("D", 15_000.0, 33.0), ("E", 68_000.0, 22.0)],
    },
];

/// Look a preset up by name.
pub fn find_preset(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name == name)
}

pub fn preset_names() -> impl Iterator<Item = &'static str> {
    PRESETS.iter().map(|p| p.name)
}

/// The named preset as a full configuration.
pub fn preset_config(catalog: &Catalog, name: &str) -> Result<SupplyConfig> {
    find_preset(name)
        .map(|preset| preset.to_config(catalog))
        .ok_or_else(|| PsuError::unknown_preset(name))
}

/// Split "EL34 PP" into a tube name and configuration name.
///
/// "SE" means single-ended; anything else is treated as push-pull.
pub fn parse_power_stage(shorthand: &str) -> (&str, &'static str) {
    let mut parts = shorthand.split_whitespace();
    let tube = parts.next().unwrap_or("");
    let config = match parts.next() {
        Some("SE") => SINGLE_ENDED,
        _ => PUSH_PULL,
    };
    (tube, config)
}

impl Preset {
    /// Expand into a configuration with a load on every section.
    ///
    /// With a catalogued output tube, sections A and B feed its anodes and
    /// screens (pentodes and beam tubes only). Section C feeds a long-tail
    /// pair when an output stage is named. Later sections share the preamp
    /// triodes, at most two tubes each. Anything else gets the section
    /// letter's customary load.
    pub fn to_config(&self, catalog: &Catalog) -> SupplyConfig {
        let power = self
            .power_stage
            .map(parse_power_stage)
            .and_then(|(tube, config)| catalog.power_tube(tube).map(|t| (tube, config, t)));

        if power.is_none() {
            if let Some(stage) = self.power_stage {
                tracing::warn!(preset = self.name, power_stage = stage, "output tube not in catalog");
            }
        }

        let count = self.stages.len();
        let stages = self
            .stages
            .iter()
            .enumerate()
            .map(|(idx, &(name, resistance, capacitance))| {
                let load = match (idx, power) {
                    (0, Some((tube, config, _))) => Load::power(tube, config),
                    (1, Some((tube, config, record))) if record.kind.has_screen_grid() => Load::g2(tube, config),
                    (2, _) if self.power_stage.is_some() => Load::inverter(LONG_TAIL_PAIR),
                    (idx, _) if idx >= 3 || (idx >= 2 && self.power_stage.is_none()) => {
                        let per_section = (self.triodes / (count as u32 - 2)).max(1);
                        Load::preamp("12AX7", per_section.min(2))
                    }
                    _ => default_load(name, "EL34", PUSH_PULL).unwrap_or_else(|| Load::preamp("12AX7", 1)),
                };

                Section {
                    id: idx as u64 + 1,
                    name: name.to_string(),
                    filter_type: FilterType::RC,
                    resistance,
                    inductance: None,
                    capacitance,
                    load: Some(load),
                }
            })
            .collect();

        let mut config = SupplyConfig::new(self.vac, self.rectifier, stages);
        if let Some((tube, power_config, _)) = power {
            config = config.with_power_stage(tube, power_config);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library() {
        assert_eq!(PRESETS.len(), 14);
        assert_eq!(preset_names().next(), Some("Fender Twin Reverb"));
        assert!(find_preset("Vox AC30").is_some());
        assert!(find_preset("Vox AC50").is_none());
    }

    #[test]
    fn test_parse_power_stage() {
        assert_eq!(parse_power_stage("EL34 PP"), ("EL34", PUSH_PULL));
        assert_eq!(parse_power_stage("6V6 SE"), ("6V6", SINGLE_ENDED));
        assert_eq!(parse_power_stage("KT88"), ("KT88", PUSH_PULL));
    }

    #[test]
    fn test_jcm800_expansion() {
        let config = preset_config(&Catalog::standard(), "Marshall JCM800").unwrap();
        assert_eq!(config.vac, 340.0);
        assert_eq!(config.power_tube_type.as_deref(), Some("EL34"));
        assert_eq!(config.power_config.as_deref(), Some(PUSH_PULL));

        let loads: Vec<String> = config
            .stages
            .iter()
            .map(|s| s.load.as_ref().unwrap().description())
            .collect();
        // 6 triodes over 2 preamp sections, capped at two tubes
        assert_eq!(loads, vec!["Push-Pull EL34", "G2 EL34", "Long-tail pair", "2× 12AX7"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_triode_split_across_sections() {
        let config = preset_config(&Catalog::standard(), "Mesa Boogie Style").unwrap();
        // 7 triodes / 3 sections = 2 per section
        assert_eq!(config.stages[4].load.as_ref().unwrap().description(), "2× 12AX7");

        let williamson = preset_config(&Catalog::standard(), "Williamson Amplifier").unwrap();
        // 2 triodes / 2 sections = 1
        assert_eq!(williamson.stages[3].load.as_ref().unwrap().description(), "1× 12AX7");
    }

    #[test]
    fn test_unknown_output_tube_keeps_letter_defaults() {
        // "6V6" is catalogued as 6V6GT
        let config = preset_config(&Catalog::standard(), "Fender Deluxe Reverb").unwrap();
        assert!(config.power_tube_type.is_none());
        assert_eq!(config.stages[0].load.as_ref().unwrap().description(), "Push-Pull EL34");
        assert_eq!(config.stages[1].load.as_ref().unwrap().description(), "G2 EL34");
        assert_eq!(config.stages[2].load.as_ref().unwrap().description(), "Long-tail pair");
    }

    #[test]
    fn test_every_preset_validates() {
        let catalog = Catalog::standard();
        for name in preset_names() {
            let config = preset_config(&catalog, name).unwrap();
            assert!(config.validate().is_ok(), "{}", name);
            assert!(catalog.rectifier(&config.rectifier).is_some(), "{}", name);
        }
    }

    #[test]
    fn test_unknown_preset() {
        let err = preset_config(&Catalog::standard(), "Hiwatt DR103").unwrap_err();
        assert!(matches!(err, PsuError::UnknownPreset { .. }));
    }
}

//! Current draw and resistive drop of each kind of load.

use crate::catalog::{Catalog, LONG_TAIL_PAIR};
use crate::supply::Load;

/// Tail resistor assumed in the long-tail pair drop estimate [Ω].
pub const LTP_TAIL_RESISTOR: f64 = 470.0;

/// Fraction of the anode resistor counted in the long-tail pair drop.
pub const LTP_ANODE_FRACTION: f64 = 0.1;

/// DC current drawn by a load, in mA.
///
/// Unknown tube, configuration or topology names contribute nothing.
pub fn section_current(load: &Load, catalog: &Catalog) -> f64 {
    match load {
        Load::Power(power) => {
            let (Some(tube), Some(config)) = (
                catalog.power_tube(&power.tubes),
                catalog.power_config(&power.config),
            ) else {
                tracing::debug!(tubes = %power.tubes, config = %power.config, "power load not in catalog");
                return 0.0;
            };

            let anode = tube.anode_current * config.multiplier;
            let screen = if tube.kind.has_screen_grid() {
                tube.screen_current * config.multiplier
            } else {
                0.0
            };

            (anode + screen) * config.class.idle_current_factor()
        }

        Load::G2(screen) => {
            let Some(tube) = catalog.power_tube(&screen.tubes) else {
                tracing::debug!(tubes = %screen.tubes, "g2 tube not in catalog");
                return 0.0;
            };
            if !tube.kind.has_screen_grid() {
                return 0.0;
            }
            catalog
                .power_config(&screen.config)
                .map(|config| tube.screen_current * config.multiplier)
                .unwrap_or(0.0)
        }

        Load::Inverter(inverter) => catalog
            .inverter(&inverter.inverter_type)
            .map(|topology| topology.current)
            .unwrap_or(0.0),

        Load::Preamp(preamp) => {
            let Some(tube) = catalog.preamp_tube(&preamp.tubes) else {
                tracing::debug!(tubes = %preamp.tubes, "preamp tube not in catalog");
                return 0.0;
            };

            match preamp.explicit_currents() {
                Some(currents) => currents.iter().sum(),
                None => tube.anode_current * f64::from(preamp.triode_count()),
            }
        }

        Load::Other(_) => 0.0,
    }
}

/// Resistive drop inside a load beyond the section's filter element, in volts.
///
/// `sag_resistance` models rectifier/transformer sag and only applies to
/// the output stage.
pub fn voltage_drop(load: &Load, current_ma: f64, sag_resistance: f64) -> f64 {
    if current_ma == 0.0 {
        return 0.0;
    }

    match load {
        Load::Power(power) => (power.dcr() + sag_resistance) * current_ma / 1000.0,

        Load::G2(screen) => screen.resistor() * current_ma / 1000.0,

        Load::Inverter(inverter) => {
            if inverter.inverter_type == LONG_TAIL_PAIR {
                let ra = inverter.anode_resistor();
                (LTP_TAIL_RESISTOR + LTP_ANODE_FRACTION * ra) * current_ma / 1000.0
            } else {
                0.0
            }
        }

        Load::Preamp(preamp) => {
            let cathode = preamp.cathode_resistor() * current_ma / 1000.0;
            let anode = preamp.anode_resistor() * current_ma / 1000.0;
            cathode + anode
        }

        Load::Other(_) => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PUSH_PULL, SINGLE_ENDED};
    use crate::supply::{PowerLoad, PreampLoad, ScreenLoad};
    use approx::assert_relative_eq;

    #[test]
    fn test_power_current_push_pull() {
        let catalog = Catalog::standard();
        // (40 + 5) * 2 * 0.7
        assert_relative_eq!(section_current(&Load::power("EL34", PUSH_PULL), &catalog), 63.0, epsilon = 1e-9);
        // Single-ended keeps full idle current
        assert_relative_eq!(section_current(&Load::power("EL34", SINGLE_ENDED), &catalog), 45.0, epsilon = 1e-9);
        // Parallel push-pull: four tubes at class AB
        assert_relative_eq!(
            section_current(&Load::power("6L6GC", "Parallel Push-Pull"), &catalog),
            (35.0 + 4.0) * 4.0 * 0.7,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_triodes_have_no_screen_current() {
        let catalog = Catalog::standard();
        assert_relative_eq!(section_current(&Load::power("300B", SINGLE_ENDED), &catalog), 60.0, epsilon = 1e-9);
        assert_eq!(section_current(&Load::g2("300B", SINGLE_ENDED), &catalog), 0.0);
        assert_relative_eq!(section_current(&Load::g2("EL34", PUSH_PULL), &catalog), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_inverter_and_preamp_current() {
        let catalog = Catalog::standard();
        assert_eq!(section_current(&Load::inverter("Cathodyne"), &catalog), 1.5);
        assert_relative_eq!(section_current(&Load::preamp("12AX7", 2), &catalog), 4.8, epsilon = 1e-9);

        let explicit = Load::Preamp(PreampLoad {
            tubes: "12AX7".into(),
            count: 1,
            anode_resistor: None,
            cathode_resistor: None,
            separate_ra: true,
            anode_resistors: Some(vec![100_000.0, 220_000.0]),
            triode_currents: Some(vec![1.0, 0.6]),
        });
        assert_relative_eq!(section_current(&explicit, &catalog), 1.6, epsilon = 1e-9);
    }

    #[test]
    fn test_huge_tube_count_stays_finite() {
        let catalog = Catalog::standard();
        let current = section_current(&Load::preamp("12AX7", 3_000_000_000), &catalog);
        assert!(current.is_finite());
        assert_relative_eq!(current, f64::from(u32::MAX) * 1.2, max_relative = 1e-9);
    }

    #[test]
    fn test_unknown_names_draw_nothing() {
        let catalog = Catalog::standard();
        assert_eq!(section_current(&Load::power("EL35", PUSH_PULL), &catalog), 0.0);
        assert_eq!(section_current(&Load::power("EL34", "Ultralinear"), &catalog), 0.0);
        assert_eq!(section_current(&Load::inverter("Mystery"), &catalog), 0.0);
        assert_eq!(section_current(&Load::preamp("ECC99", 1), &catalog), 0.0);
        assert_eq!(section_current(&Load::bias("negative rail"), &catalog), 0.0);
        assert_eq!(section_current(&Load::power("EL34", PUSH_PULL), &Catalog::empty()), 0.0);
    }

    #[test]
    fn test_voltage_drops() {
        let power = Load::Power(PowerLoad {
            tubes: "EL34".into(),
            config: PUSH_PULL.into(),
            dcr: Some(100.0),
        });
        assert_relative_eq!(voltage_drop(&power, 63.0, 0.0), 6.3, epsilon = 1e-9);
        assert_relative_eq!(voltage_drop(&power, 63.0, 50.0), 9.45, epsilon = 1e-9);

        let screen = Load::G2(ScreenLoad {
            tubes: "EL34".into(),
            config: PUSH_PULL.into(),
            resistor: Some(1000.0),
            separate: false,
        });
        assert_relative_eq!(voltage_drop(&screen, 10.0, 0.0), 10.0, epsilon = 1e-9);

        // (470 + 0.1 * 100k) * 2.5 mA
        assert_relative_eq!(voltage_drop(&Load::inverter(LONG_TAIL_PAIR), 2.5, 0.0), 26.175, epsilon = 1e-9);
        assert_eq!(voltage_drop(&Load::inverter("Cathodyne"), 1.5, 0.0), 0.0);

        // (1.5k + 100k) * 4.8 mA
        assert_relative_eq!(voltage_drop(&Load::preamp("12AX7", 2), 4.8, 0.0), 487.2, epsilon = 1e-9);
        assert_eq!(voltage_drop(&Load::bias("negative rail"), 10.0, 0.0), 0.0);
        assert_eq!(voltage_drop(&power, 0.0, 100.0), 0.0);
    }

    #[test]
    fn test_missing_dcr_uses_default() {
        let power = Load::Power(PowerLoad {
            tubes: "EL34".into(),
            config: PUSH_PULL.into(),
            dcr: None,
        });
        assert_relative_eq!(voltage_drop(&power, 10.0, 0.0), 1.0, epsilon = 1e-9);
    }
}

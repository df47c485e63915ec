//! Design rules of thumb layered on top of the engine.

use std::fmt;

use serde::Serialize;

use crate::catalog::Catalog;
use crate::solver::TubeVoltages;
use crate::supply::Load;

/// How a supply's sag will feel under the fingers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SagFeel {
    Spongy,
    Moderate,
    Stiff,
}

impl fmt::Display for SagFeel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SagFeel::Spongy => "very spongy (vintage)",
            SagFeel::Moderate => "moderate sag (classic)",
            SagFeel::Stiff => "stiff (modern)",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SagEstimate {
    /// Drop at peak current [V]
    pub voltage_drop: f64,
    pub feel: SagFeel,
}

/// Sag across `sag_resistance` at `peak_current_ma`.
pub fn estimate_sag(sag_resistance: f64, peak_current_ma: f64) -> SagEstimate {
    let voltage_drop = sag_resistance * peak_current_ma / 1000.0;
    let feel = if voltage_drop > 20.0 {
        SagFeel::Spongy
    } else if voltage_drop > 10.0 {
        SagFeel::Moderate
    } else {
        SagFeel::Stiff
    };
    SagEstimate { voltage_drop, feel }
}

/// Qualitative tone prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToneCharacter {
    pub clarity: &'static str,
    pub dynamics: &'static str,
    pub headroom: &'static str,
    pub overall: &'static str,
}

/// Guess the tone character from the last node's voltage and ripple [mV]
/// and the sag drop [V].
pub fn predict_tone_character(final_voltage: f64, final_ripple: f64, sag_voltage: f64) -> ToneCharacter {
    let clarity = match final_ripple {
        r if r < 1.0 => "very clean",
        r if r < 3.0 => "clean",
        _ => "warm/vintage",
    };
    let dynamics = match sag_voltage {
        s if s > 15.0 => "very responsive",
        s if s > 8.0 => "responsive",
        _ => "stiff",
    };
    let headroom = match final_voltage {
        v if v > 450.0 => "very high",
        v if v > 350.0 => "high",
        _ => "moderate",
    };

    let overall = if final_ripple < 2.0 && sag_voltage > 10.0 {
        "classic tube tone with good dynamics"
    } else if final_ripple < 1.0 && sag_voltage < 8.0 {
        "hi-fi, precise tone"
    } else if final_ripple > 3.0 && sag_voltage > 15.0 {
        "vintage, warm tone with compression"
    } else {
        "balanced tone"
    };

    ToneCharacter {
        clarity,
        dynamics,
        headroom,
        overall,
    }
}

/// Supply targets for a named amp style.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleTarget {
    pub vac: f64,
    pub rectifier: &'static str,
    /// Target final ripple [mV]
    pub target_ripple: f64,
    /// Target sag [V]
    pub target_sag: f64,
    pub description: &'static str,
}

#[rustfmt::skip]
const STYLES: [(&str, f64, &str, f64, f64, &str); 4] = [
    ("Marshall Plexi",   350.0, "GZ34 / 5AR4",    2.0, 15.0, "classic rock/blues tone with moderate sag"),
    ("Fender Twin",      350.0, "Silicon Bridge", 0.8,  8.0, "clean, transparent tone with high headroom"),
    ("Vox AC30",         280.0, "GZ34 / 5AR4",    2.5, 18.0, "characteristic sag and compression"),
    ("High Gain Modern", 400.0, "Silicon Bridge", 0.5,  5.0, "stiff supply for high gain"),
];

/// Supply targets for `style`, falling back to the Plexi targets.
pub fn style_target(style: &str) -> StyleTarget {
    let (_, vac, rectifier, target_ripple, target_sag, description) = STYLES
        .iter()
        .find(|entry| entry.0 == style)
        .copied()
        .unwrap_or(STYLES[0]);

    StyleTarget {
        vac,
        rectifier,
        target_ripple,
        target_sag,
        description,
    }
}

pub fn style_names() -> impl Iterator<Item = &'static str> {
    STYLES.iter().map(|entry| entry.0)
}

/// Primary impedance assumed for the output transformer [Ω].
const OUTPUT_PRIMARY_IMPEDANCE: f64 = 2000.0;

/// Output impedance [Ω] seen from a load.
///
/// Power stages are reflected through an output transformer into
/// `speaker_impedance`; preamp stages are Ra in parallel with rp. Other loads
/// report zero.
pub fn output_impedance(load: &Load, catalog: &Catalog, speaker_impedance: f64) -> f64 {
    match load {
        Load::Power(power) => {
            let ratio_squared = OUTPUT_PRIMARY_IMPEDANCE / speaker_impedance;
            OUTPUT_PRIMARY_IMPEDANCE / ratio_squared + power.dcr() / ratio_squared
        }
        Load::Preamp(preamp) => {
            let Some(tube) = catalog.preamp_tube(&preamp.tubes) else {
                return 0.0;
            };
            let ra = preamp.anode_resistor();
            let rp = tube.small_signal().rp_ohms;
            ra * rp / (ra + rp)
        }
        Load::G2(_) | Load::Inverter(_) | Load::Other(_) => 0.0,
    }
}

/// Rough output power [W], rounded to the nearest watt.
pub fn estimate_output_power(catalog: &Catalog, tube: &str, config: &str, supply_voltage: f64) -> f64 {
    let (Some(tube), Some(config)) = (catalog.power_tube(tube), catalog.power_config(config)) else {
        return 0.0;
    };

    let anode_voltage = supply_voltage * 0.85;
    let rms_current = tube.anode_current * config.multiplier * 0.7;
    (anode_voltage * rms_current / 1000.0 * config.efficiency).round()
}

/// Supply voltage to aim for: typical anode voltage plus 15% and a
/// rectifier allowance, rounded up to 10 V. 350 V for unknown tubes.
pub fn recommended_supply_voltage(catalog: &Catalog, tube: &str) -> f64 {
    match catalog.power_tube(tube) {
        Some(tube) => ((tube.typical_anode_voltage * 1.15 + 20.0) / 10.0).ceil() * 10.0,
        None => 350.0,
    }
}

/// Outcome of a tube safety check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SafetyReport {
    pub safe: bool,
    pub warnings: Vec<String>,
}

/// Check an anode voltage and dissipation against a tube's ratings.
///
/// Above 90% of Va_max warns; above Va_max or Pa_max is unsafe.
pub fn check_tube_safety(
    catalog: &Catalog,
    tube: &str,
    anode_voltage: Option<f64>,
    dissipation: Option<f64>,
) -> SafetyReport {
    let Some(limits) = catalog.tube_limits(tube) else {
        return SafetyReport {
            safe: false,
            warnings: vec![format!("Unknown tube type {}", tube)],
        };
    };

    let mut warnings = Vec::new();
    let mut safe = true;

    if let Some(va) = anode_voltage {
        if va > limits.max_anode_voltage {
            warnings.push(format!(
                "Anode voltage {:.0}V exceeds maximum {:.0}V",
                va, limits.max_anode_voltage
            ));
            safe = false;
        } else if va > limits.max_anode_voltage * 0.9 {
            warnings.push(format!(
                "Anode voltage {:.0}V close to maximum {:.0}V",
                va, limits.max_anode_voltage
            ));
        }
    }

    if let (Some(pa), Some(max)) = (dissipation, limits.max_dissipation) {
        if pa > max {
            warnings.push(format!("Anode dissipation {:.1}W exceeds maximum {:.1}W", pa, max));
            safe = false;
        }
    }

    SafetyReport { safe, warnings }
}

/// Safety check for the tubes a section powers, when it powers any.
pub fn section_safety(catalog: &Catalog, load: &Load, voltages: &TubeVoltages) -> Option<SafetyReport> {
    let tube = match (load, voltages) {
        (Load::Power(power), TubeVoltages::Power(_)) => &power.tubes,
        (Load::Preamp(preamp), TubeVoltages::Preamp(_)) => &preamp.tubes,
        _ => return None,
    };
    Some(check_tube_safety(catalog, tube, voltages.anode_voltage(), voltages.dissipation()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PUSH_PULL;
    use approx::assert_relative_eq;

    #[test]
    fn test_sag_feel() {
        let est = estimate_sag(200.0, 150.0);
        assert_relative_eq!(est.voltage_drop, 30.0);
        assert_eq!(est.feel, SagFeel::Spongy);
        assert_eq!(estimate_sag(100.0, 150.0).feel, SagFeel::Moderate);
        assert_eq!(estimate_sag(0.0, 150.0).feel.to_string(), "stiff (modern)");
    }

    #[test]
    fn test_tone_character() {
        let tone = predict_tone_character(470.0, 0.5, 12.0);
        assert_eq!(tone.clarity, "very clean");
        assert_eq!(tone.dynamics, "responsive");
        assert_eq!(tone.headroom, "very high");
        assert_eq!(tone.overall, "classic tube tone with good dynamics");

        assert_eq!(predict_tone_character(300.0, 0.5, 2.0).overall, "hi-fi, precise tone");
        assert_eq!(predict_tone_character(300.0, 5.0, 20.0).overall, "vintage, warm tone with compression");
        assert_eq!(predict_tone_character(300.0, 2.5, 9.0).overall, "balanced tone");
    }

    #[test]
    fn test_style_targets() {
        assert_eq!(style_target("Vox AC30").vac, 280.0);
        assert_eq!(style_target("Unknown").rectifier, "GZ34 / 5AR4");
        assert_eq!(style_names().count(), 4);
    }

    #[test]
    fn test_output_impedance() {
        let catalog = Catalog::standard();
        // 2000 Ω primary into 8 Ω, 100 Ω DCR reflected
        assert_relative_eq!(output_impedance(&Load::power("EL34", PUSH_PULL), &catalog, 8.0), 8.4, epsilon = 1e-9);
        // 100k || 62.5k
        assert_relative_eq!(
            output_impedance(&Load::preamp("12AX7", 1), &catalog, 8.0),
            100_000.0 * 62_500.0 / 162_500.0,
            epsilon = 1e-6
        );
        assert_eq!(output_impedance(&Load::bias("negative rail"), &catalog, 8.0), 0.0);
    }

    #[test]
    fn test_output_power_and_supply() {
        let catalog = Catalog::standard();
        // 382.5 V * 56 mA * 0.65
        assert_eq!(estimate_output_power(&catalog, "EL34", PUSH_PULL, 450.0), 14.0);
        assert_eq!(estimate_output_power(&catalog, "EL99", PUSH_PULL, 450.0), 0.0);

        assert_eq!(recommended_supply_voltage(&catalog, "EL34"), 480.0);
        assert_eq!(recommended_supply_voltage(&catalog, "EL84"), 370.0);
        assert_eq!(recommended_supply_voltage(&catalog, "nonexistent"), 350.0);
    }

    #[test]
    fn test_tube_safety() {
        let catalog = Catalog::standard();

        let ok = check_tube_safety(&catalog, "EL34", Some(400.0), Some(20.0));
        assert!(ok.safe);
        assert!(ok.warnings.is_empty());

        let close = check_tube_safety(&catalog, "EL34", Some(480.0), None);
        assert!(close.safe);
        assert_eq!(close.warnings.len(), 1);

        let hot = check_tube_safety(&catalog, "EL34", Some(520.0), Some(30.0));
        assert!(!hot.safe);
        assert_eq!(hot.warnings.len(), 2);

        // Preamp tubes carry no dissipation rating
        assert!(check_tube_safety(&catalog, "12AX7", Some(250.0), Some(5.0)).safe);
        assert!(!check_tube_safety(&catalog, "EL99", None, None).safe);
    }

    #[test]
    fn test_section_safety() {
        let catalog = Catalog::standard();
        let load = Load::power("EL34", PUSH_PULL);
        let voltages = TubeVoltages::Power(crate::solver::PowerStageVoltages {
            anode_voltage: 510.0,
            anode_current: 4.0,
            transformer_drop: 0.4,
            sag_drop: 0.0,
            headroom: 0.4,
            dissipation: 2.04,
            converged: true,
        });

        let report = section_safety(&catalog, &load, &voltages).unwrap();
        assert!(!report.safe);
        assert!(section_safety(&catalog, &Load::bias("negative rail"), &TubeVoltages::None).is_none());
    }
}

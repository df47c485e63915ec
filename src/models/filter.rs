//! Ripple and filter attenuation.
//!
//! Ripple is estimated from the capacitor charge/discharge cycle at the
//! full-wave ripple frequency, then scaled by the section's own filter
//! attenuation. The RC response is first order; the LC response is a
//! second-order low-pass with fixed Butterworth damping.

use std::f64::consts::PI;

use crate::supply::{FilterElement, FilterType, Section};

/// Full-wave rectified ripple frequency [Hz] on 50 Hz mains.
pub const RIPPLE_FREQUENCY: f64 = 100.0;

/// Damping assumed for LC sections.
pub const BUTTERWORTH_Q: f64 = 0.707;

/// Peak-to-peak ripple [mV] across a reservoir of `capacitance_uf` feeding
/// `current_ma`, plus the resistive part across `esr_ohms`.
///
/// A non-positive capacitance contributes no capacitive ripple; chains are
/// expected to be validated before that matters.
pub fn ripple_voltage(current_ma: f64, capacitance_uf: f64, esr_ohms: f64) -> f64 {
    let capacitive = if capacitance_uf > 0.0 {
        let amps = current_ma / 1000.0;
        let farads = capacitance_uf * 1e-6;
        amps / (2.0 * RIPPLE_FREQUENCY * farads) * 1000.0
    } else {
        0.0
    };

    capacitive + current_ma * esr_ohms
}

/// Gain (0-1) of a first-order RC low-pass at `frequency`.
pub fn rc_attenuation(resistance: f64, capacitance_uf: f64, frequency: f64) -> f64 {
    let omega_rc = 2.0 * PI * frequency * resistance * capacitance_uf * 1e-6;
    1.0 / (1.0 + omega_rc * omega_rc).sqrt()
}

/// Gain (0-1) of a second-order LC low-pass at `frequency`.
///
/// The raw response rises slightly above unity below the corner frequency;
/// the result is clamped to 1.
pub fn lc_attenuation(inductance: f64, capacitance_uf: f64, frequency: f64) -> f64 {
    let corner = 1.0 / (2.0 * PI * (inductance * capacitance_uf * 1e-6).sqrt());
    let ratio = frequency / corner;

    let phase = 2.0 * (ratio / BUTTERWORTH_Q).atan();
    let gain = 1.0 / (1.0 + ratio.powi(4) - 2.0 * ratio * ratio * phase.cos()).sqrt();

    if gain.is_finite() {
        gain.min(1.0)
    } else {
        1.0
    }
}

/// Gain of a section's filter at `frequency`.
pub fn attenuation(section: &Section, frequency: f64) -> f64 {
    match section.filter_element() {
        FilterElement::Resistor(r) => rc_attenuation(r, section.capacitance, frequency),
        FilterElement::Inductor(l) => lc_attenuation(l, section.capacitance, frequency),
    }
}

/// Convert a linear gain to decibels.
pub fn attenuation_db(gain: f64) -> f64 {
    20.0 * gain.log10()
}

/// Reactance of a choke [Ω] at `frequency`.
pub fn inductor_reactance(inductance: f64, frequency: f64) -> f64 {
    2.0 * PI * frequency * inductance
}

/// Capacitance [µF] that brings ripple down to `target_ripple_mv` behind a
/// series resistor, or `None` when no finite value can.
///
/// Returns zero when the unfiltered ripple of a 1 µF reservoir is already
/// under target.
pub fn suggest_capacitor_crc(current_ma: f64, target_ripple_mv: f64, resistance: f64) -> Option<f64> {
    if current_ma <= 0.0 || target_ripple_mv <= 0.0 || resistance <= 0.0 {
        return None;
    }

    let unfiltered = ripple_voltage(current_ma, 1.0, 0.0);
    let required = target_ripple_mv / unfiltered;
    if required >= 1.0 {
        return Some(0.0);
    }

    let omega = 2.0 * PI * RIPPLE_FREQUENCY;
    let rc = (1.0 / (required * required) - 1.0).sqrt() / omega;
    Some(rc / resistance * 1e6)
}

/// Input capacitance [µF] for a choke-input-adjacent CLC filter.
///
/// Takes the smaller of the value the rectifier's peak current allows and
/// the value the ripple target asks for.
pub fn suggest_capacitor_clc(max_diode_current_ma: f64, target_ripple_mv: f64, vac: f64) -> Option<f64> {
    if max_diode_current_ma <= 0.0 || target_ripple_mv <= 0.0 || vac <= 0.0 {
        return None;
    }

    let peak = vac * 2f64.sqrt();
    let max_safe = max_diode_current_ma / (2.0 * PI * RIPPLE_FREQUENCY * peak) * 1e6;
    let for_ripple = max_diode_current_ma / (2.0 * RIPPLE_FREQUENCY * target_ripple_mv / 1000.0) * 1e6;

    Some(max_safe.min(for_ripple))
}

/// Suggest a capacitance for either filter type.
///
/// LC sections are sized against a 350 V AC secondary.
pub fn suggest_capacitor(
    filter_type: FilterType,
    current_ma: f64,
    target_ripple_mv: f64,
    resistance: f64,
) -> Option<f64> {
    match filter_type {
        FilterType::RC => suggest_capacitor_crc(current_ma, target_ripple_mv, resistance),
        FilterType::LC => suggest_capacitor_clc(current_ma, target_ripple_mv, 350.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supply::Load;
    use approx::assert_relative_eq;

    #[test]
    fn test_ripple_voltage() {
        // 63 mA into 47 µF at 100 Hz
        assert_relative_eq!(ripple_voltage(63.0, 47.0, 0.0), 6702.127659574468, epsilon = 1e-6);
        assert_relative_eq!(ripple_voltage(10.0, 100.0, 0.5), 500.0 + 5.0, epsilon = 1e-9);
        assert_eq!(ripple_voltage(0.0, 47.0, 0.0), 0.0);
        assert_eq!(ripple_voltage(10.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_rc_attenuation() {
        assert_eq!(rc_attenuation(0.0, 47.0, RIPPLE_FREQUENCY), 1.0);

        // 10k / 22 µF: ωRC ≈ 138.2
        let gain = rc_attenuation(10_000.0, 22.0, RIPPLE_FREQUENCY);
        assert_relative_eq!(gain, 1.0 / (1.0 + 138.23007675795088f64.powi(2)).sqrt(), epsilon = 1e-12);
        assert!(gain < 0.01);
    }

    #[test]
    fn test_rc_is_first_order() {
        // Doubling frequency far above the corner halves the gain
        let low = rc_attenuation(10_000.0, 47.0, 100.0);
        let high = rc_attenuation(10_000.0, 47.0, 200.0);
        assert_relative_eq!(high / low, 0.5, epsilon = 1e-4);
    }

    #[test]
    fn test_lc_is_second_order() {
        // 10 H / 47 µF corner ≈ 7.3 Hz
        let low = lc_attenuation(10.0, 47.0, 100.0);
        let high = lc_attenuation(10.0, 47.0, 200.0);
        assert!(low < 0.01);
        assert_relative_eq!(high / low, 0.25, epsilon = 0.01);
    }

    #[test]
    fn test_lc_never_amplifies() {
        // Half the corner frequency: raw response ≈ 1.056
        let corner = 1.0 / (2.0 * PI * (10.0f64 * 47e-6).sqrt());
        assert_eq!(lc_attenuation(10.0, 47.0, corner * 0.5), 1.0);
        assert_eq!(lc_attenuation(0.0, 47.0, 100.0), 1.0);
        assert_eq!(lc_attenuation(-1.0, 47.0, 100.0), 1.0);
    }

    #[test]
    fn test_section_attenuation_follows_type() {
        let rc = Section::rc(1, "B", 1_000.0, 47.0, Load::bias("negative rail"));
        assert_relative_eq!(
            attenuation(&rc, RIPPLE_FREQUENCY),
            rc_attenuation(1_000.0, 47.0, RIPPLE_FREQUENCY)
        );

        let lc = Section::lc(2, "C", 10.0, 47.0, Load::bias("negative rail"));
        assert_relative_eq!(attenuation(&lc, RIPPLE_FREQUENCY), lc_attenuation(10.0, 47.0, RIPPLE_FREQUENCY));
    }

    #[test]
    fn test_db_and_reactance() {
        assert_relative_eq!(attenuation_db(0.1), -20.0, epsilon = 1e-12);
        assert_relative_eq!(attenuation_db(1.0), 0.0);
        assert_relative_eq!(inductor_reactance(10.0, 100.0), 6283.185307179586, epsilon = 1e-9);
    }

    #[test]
    fn test_capacitor_suggestions() {
        // The suggested value meets the target
        let uf = suggest_capacitor_crc(10.0, 50.0, 10_000.0).unwrap();
        let achieved = ripple_voltage(10.0, 1.0, 0.0) * rc_attenuation(10_000.0, uf, RIPPLE_FREQUENCY);
        assert_relative_eq!(achieved, 50.0, epsilon = 1e-6);

        assert_eq!(suggest_capacitor_crc(0.01, 100_000.0, 1_000.0), Some(0.0));
        assert_eq!(suggest_capacitor_crc(10.0, 50.0, 0.0), None);

        let clc = suggest_capacitor_clc(100.0, 5.0, 350.0).unwrap();
        assert_relative_eq!(clc, 100.0 / (2.0 * PI * 100.0 * 350.0 * 2f64.sqrt()) * 1e6, epsilon = 1e-9);
        assert_eq!(suggest_capacitor(FilterType::LC, 100.0, 5.0, 0.0), Some(clc));
    }
}

//! Per-section electrical models.
//!
//! Pure functions of a section's load, element values and the catalog:
//!
//! - [`load`]: current drawn by each kind of load and the drop inside it
//! - [`filter`]: ripple and RC/LC attenuation at the ripple frequency
//! - [`design`]: sizing and sanity rules built on top of the above

pub mod design;
pub mod filter;
pub mod load;

pub use design::{
    check_tube_safety, estimate_output_power, estimate_sag, output_impedance, predict_tone_character,
    recommended_supply_voltage, section_safety, style_names, style_target, SafetyReport, SagEstimate,
    SagFeel, StyleTarget, ToneCharacter,
};
pub use filter::{
    attenuation, attenuation_db, inductor_reactance, lc_attenuation, rc_attenuation, ripple_voltage,
    suggest_capacitor, suggest_capacitor_clc, suggest_capacitor_crc, RIPPLE_FREQUENCY,
};
pub use load::{section_current, voltage_drop};

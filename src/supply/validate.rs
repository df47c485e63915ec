//! Section chain validation.

use std::collections::HashSet;

use super::Section;

/// Check a section chain, returning every problem found.
///
/// Checks:
/// - The chain is not empty
/// - Every section has a name and a unique id
/// - Resistances are non-negative, capacitances positive
/// - LC sections carry a non-negative inductance
pub fn validate_sections(sections: &[Section]) -> Vec<String> {
    let mut problems = Vec::new();

    if sections.is_empty() {
        problems.push("No filter sections".to_string());
    }

    let mut seen_ids = HashSet::new();
    for (idx, section) in sections.iter().enumerate() {
        let label = if section.name.is_empty() {
            problems.push(format!("Section {}: missing name", idx + 1));
            format!("{}", idx + 1)
        } else {
            section.name.clone()
        };

        if !seen_ids.insert(section.id) {
            problems.push(format!("Section {}: duplicate id {}", label, section.id));
        }

        if !section.resistance.is_finite() || section.resistance < 0.0 {
            problems.push(format!("Section {}: invalid resistor value", label));
        }

        if !section.capacitance.is_finite() || section.capacitance <= 0.0 {
            problems.push(format!("Section {}: invalid capacitor value", label));
        }

        if let Some(henries) = section.inductance {
            if !henries.is_finite() || henries < 0.0 {
                problems.push(format!("Section {}: invalid inductor value", label));
            }
        }
    }

    problems
}

//! Section-list editing.
//!
//! Each operation takes the current chain and returns a new one. The engine
//! never sees a partially edited chain: callers swap the whole list and
//! recompute.

use std::collections::HashSet;

use crate::catalog::{LONG_TAIL_PAIR, PUSH_PULL};
use crate::units::parse_resistance;

use super::types::{FilterType, Load, PreampLoad, Section, DEFAULT_ANODE_RESISTOR};

/// Resistance of a newly added section [Ω].
const NEW_SECTION_RESISTANCE: f64 = 10_000.0;

/// Capacitance of a newly added section [µF].
const NEW_SECTION_CAPACITANCE: f64 = 22.0;

/// A change to one field of one section.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionEdit {
    Name(String),
    FilterType(FilterType),
    /// Resistance in ohms
    Resistance(f64),
    /// Resistance as typed, run through the unit parser
    ResistanceText(String),
    /// Inductance in henries
    Inductance(Option<f64>),
    /// Capacitance in microfarads
    Capacitance(f64),
    Load(Option<Load>),
}

impl SectionEdit {
    fn apply(&self, section: &mut Section) {
        match self {
            SectionEdit::Name(name) => section.name = name.clone(),
            SectionEdit::FilterType(filter_type) => section.filter_type = *filter_type,
            SectionEdit::Resistance(ohms) => section.resistance = *ohms,
            SectionEdit::ResistanceText(text) => section.resistance = parse_resistance(text),
            SectionEdit::Inductance(henries) => section.inductance = *henries,
            SectionEdit::Capacitance(uf) => section.capacitance = *uf,
            SectionEdit::Load(load) => section.load = load.clone(),
        }
    }
}

/// Apply `edit` to the section with `id`. Unknown ids leave the chain as is.
pub fn update_section(sections: &[Section], id: u64, edit: &SectionEdit) -> Vec<Section> {
    sections
        .iter()
        .map(|section| {
            let mut section = section.clone();
            if section.id == id {
                edit.apply(&mut section);
            }
            section
        })
        .collect()
}

/// Append a section named after the next letter.
///
/// The first four letters get their customary load (power, g2, inverter,
/// preamp); later sections get two 12AX7s with individual anode resistors.
pub fn add_section(sections: &[Section]) -> Vec<Section> {
    let index = sections.len();
    let name = section_letter(index);
    let id = free_section_id(&sections.iter().map(|s| s.id).collect());

    let load = if index < 4 {
        default_load(&name, "EL34", PUSH_PULL)
    } else {
        Some(Load::Preamp(PreampLoad {
            tubes: "12AX7".to_string(),
            count: 2,
            anode_resistor: Some(DEFAULT_ANODE_RESISTOR),
            cathode_resistor: None,
            separate_ra: true,
            anode_resistors: Some(vec![DEFAULT_ANODE_RESISTOR; 4]),
            triode_currents: None,
        }))
    };

    let mut next = sections.to_vec();
    next.push(Section {
        id,
        name,
        filter_type: FilterType::RC,
        resistance: NEW_SECTION_RESISTANCE,
        inductance: None,
        capacitance: NEW_SECTION_CAPACITANCE,
        load,
    });
    next
}

/// Remove the section with `id`. The last remaining section is never removed.
pub fn delete_section(sections: &[Section], id: u64) -> Vec<Section> {
    if sections.len() <= 1 {
        return sections.to_vec();
    }
    sections.iter().filter(|s| s.id != id).cloned().collect()
}

/// Point every power and g2 load at the chosen output tube and configuration.
pub fn sync_power_tubes(sections: &[Section], tube: &str, config: &str) -> Vec<Section> {
    sections
        .iter()
        .map(|section| {
            let mut section = section.clone();
            match &mut section.load {
                Some(Load::Power(power)) => {
                    power.tubes = tube.to_string();
                    power.config = config.to_string();
                }
                Some(Load::G2(screen)) => {
                    screen.tubes = tube.to_string();
                    screen.config = config.to_string();
                }
                Some(Load::Inverter(_)) | Some(Load::Preamp(_)) | Some(Load::Other(_)) | None => {}
            }
            section
        })
        .collect()
}

/// The customary four-section starter chain for an output stage.
pub fn default_sections(tube: &str, config: &str) -> Vec<Section> {
    vec![
        Section::rc(1, "A", 0.0, 47.0, Load::power(tube, config)),
        Section::rc(2, "B", 1_000.0, 47.0, Load::g2(tube, config)),
        Section::rc(3, "C", 10_000.0, 22.0, Load::inverter(LONG_TAIL_PAIR)),
        Section::rc(4, "D", 47_000.0, 22.0, Load::preamp("12AX7", 2)),
    ]
}

/// Customary load for a section letter, if that letter has one.
pub fn default_load(name: &str, tube: &str, config: &str) -> Option<Load> {
    match name {
        "A" => Some(Load::power(tube, config)),
        "B" => Some(Load::g2(tube, config)),
        "C" => Some(Load::inverter(LONG_TAIL_PAIR)),
        "D" => Some(Load::preamp("12AX7", 2)),
        "E" => Some(Load::preamp("12AX7", 1)),
        "F" => Some(Load::bias("Bias supply for the power tubes")),
        _ => None,
    }
}

/// One past the highest id in `used`, or the smallest free non-zero id once
/// the highest is `u64::MAX`.
pub(crate) fn free_section_id(used: &HashSet<u64>) -> u64 {
    match used.iter().copied().max() {
        None => 1,
        Some(highest) => highest
            .checked_add(1)
            .or_else(|| (1..=u64::MAX).find(|id| !used.contains(id)))
            .unwrap_or(0),
    }
}

/// "A" for 0, "B" for 1, ... wrapping to "AA" after "Z".
pub fn section_letter(index: usize) -> String {
    let mut name = String::new();
    let mut n = index;
    loop {
        name.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_by_id_is_pure() {
        let chain = default_sections("EL34", PUSH_PULL);
        let edited = update_section(&chain, 3, &SectionEdit::ResistanceText("4k7".into()));

        assert_eq!(chain[2].resistance, 10_000.0);
        assert_eq!(edited[2].resistance, 4_700.0);
        assert_eq!(edited[0], chain[0]);

        let untouched = update_section(&chain, 99, &SectionEdit::Capacitance(100.0));
        assert_eq!(untouched, chain);
    }

    #[test]
    fn test_add_section_defaults() {
        let chain = default_sections("EL34", PUSH_PULL);
        let grown = add_section(&chain);
        let added = grown.last().unwrap();

        assert_eq!(grown.len(), 5);
        assert_eq!(added.name, "E");
        assert_eq!(added.id, 5);
        assert_eq!(added.resistance, 10_000.0);
        assert_eq!(added.capacitance, 22.0);
        match &added.load {
            Some(Load::Preamp(p)) => {
                assert!(p.separate_ra);
                assert_eq!(p.anode_resistors.as_deref(), Some(&[100_000.0; 4][..]));
            }
            other => panic!("expected preamp load, got {:?}", other),
        }

        let from_empty = add_section(&[]);
        assert_eq!(from_empty[0].name, "A");
        assert!(matches!(from_empty[0].load, Some(Load::Power(_))));
    }

    #[test]
    fn test_add_section_after_max_id() {
        let mut chain = default_sections("EL34", PUSH_PULL);
        chain[3].id = u64::MAX;
        let grown = add_section(&chain);

        let ids: HashSet<u64> = grown.iter().map(|s| s.id).collect();
        assert_eq!(ids.len(), 5);
        assert_eq!(grown[4].id, 4);
        assert!(!ids.contains(&0));
    }

    #[test]
    fn test_bias_letter_gets_bias_load() {
        let load = default_load("F", "EL34", PUSH_PULL).unwrap();
        assert_eq!(
            serde_json::to_value(&load).unwrap(),
            serde_json::json!({"type": "bias", "description": "Bias supply for the power tubes"})
        );
    }

    #[test]
    fn test_delete_keeps_last_section() {
        let chain = default_sections("EL34", PUSH_PULL);
        let shorter = delete_section(&chain, 2);
        assert_eq!(shorter.len(), 3);
        assert!(shorter.iter().all(|s| s.id != 2));

        let single = vec![chain[0].clone()];
        assert_eq!(delete_section(&single, 1), single);
    }

    #[test]
    fn test_sync_power_tubes() {
        let chain = default_sections("EL34", PUSH_PULL);
        let synced = sync_power_tubes(&chain, "6V6GT", "Single-Ended");

        assert_eq!(synced[0].load.as_ref().unwrap().description(), "Single-Ended 6V6GT");
        assert_eq!(synced[1].load.as_ref().unwrap().description(), "G2 6V6GT");
        assert_eq!(synced[2], chain[2]);
    }

    #[test]
    fn test_section_letters() {
        assert_eq!(section_letter(0), "A");
        assert_eq!(section_letter(25), "Z");
        assert_eq!(section_letter(26), "AA");
    }
}

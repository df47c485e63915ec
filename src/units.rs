//! Component value parsing and display formatting.
//!
//! Resistor values are typed by hand in a handful of notations: plain ohms
//! (`"470"`), SI-style suffixes (`"4.7k"`, `"1M"`) and the RKM code used on
//! schematics (`"4k7"`, `"100r"`). [`parse_resistance`] accepts all of them.
//! Malformed text parses to `0.0`; the calculator never refuses a value.

/// Shorthand values that appear on almost every guitar amp schematic.
const STANDARD_VALUES: &[(&str, f64)] = &[
    ("100r", 100.0),
    ("220r", 220.0),
    ("470r", 470.0),
    ("1k", 1_000.0),
    ("1k5", 1_500.0),
    ("2k2", 2_200.0),
    ("4k7", 4_700.0),
    ("10k", 10_000.0),
    ("22k", 22_000.0),
    ("47k", 47_000.0),
    ("100k", 100_000.0),
    ("220k", 220_000.0),
    ("470k", 470_000.0),
    ("1m", 1_000_000.0),
];

/// Multiplier markers, checked in order. `m` is mega: nobody specifies
/// milliohm resistors in a B+ filter.
const MULTIPLIERS: &[(char, f64)] = &[('k', 1e3), ('m', 1e6), ('r', 1.0)];

/// A resistance as it arrives from a form field or a config file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResistanceInput<'a> {
    /// Already numeric, in ohms
    Ohms(f64),
    /// Free text such as `"4k7"` or `"1 M"`
    Text(&'a str),
}

impl From<f64> for ResistanceInput<'_> {
    fn from(value: f64) -> Self {
        ResistanceInput::Ohms(value)
    }
}

impl<'a> From<&'a str> for ResistanceInput<'a> {
    fn from(value: &'a str) -> Self {
        ResistanceInput::Text(value)
    }
}

impl<'a> From<&'a String> for ResistanceInput<'a> {
    fn from(value: &'a String) -> Self {
        ResistanceInput::Text(value.as_str())
    }
}

/// Parse a resistance into ohms.
///
/// Numeric input is returned unchanged. Text is lowercased and stripped of
/// whitespace, then matched against the standard shorthand table, then
/// interpreted with a `k`/`m`/`r` multiplier (either as suffix, `"4.7k"`,
/// or as RKM decimal marker, `"2k7"`), and finally as a bare number.
/// Anything unparseable yields `0.0`.
pub fn parse_resistance<'a>(input: impl Into<ResistanceInput<'a>>) -> f64 {
    match input.into() {
        ResistanceInput::Ohms(ohms) => ohms,
        ResistanceInput::Text(text) => parse_text(text),
    }
}

fn parse_text(text: &str) -> f64 {
    let normalized: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    if let Some(&(_, ohms)) = STANDARD_VALUES.iter().find(|(key, _)| *key == normalized) {
        return ohms;
    }

    for &(marker, multiplier) in MULTIPLIERS {
        if let Some(pos) = normalized.find(marker) {
            let head = &normalized[..pos];
            let tail = &normalized[pos + marker.len_utf8()..];

            // RKM: the marker doubles as the decimal point ("2k7" = 2.7k)
            let is_rkm = !head.contains('.')
                && !tail.is_empty()
                && tail.chars().all(|c| c.is_ascii_digit());
            let value = if is_rkm {
                leading_float(&format!("{}.{}", head, tail))
            } else {
                leading_float(head)
            };

            return value.map(|v| v * multiplier).unwrap_or(0.0);
        }
    }

    leading_float(&normalized).unwrap_or(0.0)
}

/// Parse the longest numeric prefix of `text`, ignoring trailing garbage.
fn leading_float(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'-' || bytes[end] == b'+') {
        end += 1;
    }

    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }

    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            digits += 1;
        }
    }

    if digits == 0 {
        return None;
    }

    // Exponent only counts when digits follow it
    if end < bytes.len() && bytes[end] == b'e' {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'-' || bytes[exp_end] == b'+') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    text[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

// ============ Display formatting ============

/// Format a ripple voltage given in millivolts.
pub fn format_ripple(millivolts: f64) -> String {
    if millivolts < 1.0 {
        format!("{:.0}μV", millivolts * 1000.0)
    } else if millivolts < 1000.0 {
        format!("{:.1}mV", millivolts)
    } else {
        format!("{:.2}V", millivolts / 1000.0)
    }
}

/// Format a resistance given in ohms.
pub fn format_resistance(ohms: f64) -> String {
    if ohms >= 1_000_000.0 {
        format!("{:.1}M", ohms / 1_000_000.0)
    } else if ohms >= 1000.0 {
        format!("{:.1}k", ohms / 1000.0)
    } else {
        format!("{}", ohms)
    }
}

/// Format a power given in watts.
pub fn format_power(watts: f64) -> String {
    if watts < 1.0 {
        format!("{:.0}mW", watts * 1000.0)
    } else {
        format!("{:.1}W", watts)
    }
}

/// Format a voltage given in volts.
pub fn format_voltage(volts: f64) -> String {
    if volts < 1.0 {
        format!("{:.0}mV", volts * 1000.0)
    } else {
        format!("{:.1}V", volts)
    }
}

/// Format a current given in milliamps.
pub fn format_current(milliamps: f64) -> String {
    if milliamps < 1.0 {
        format!("{:.0}μA", milliamps * 1000.0)
    } else if milliamps >= 1000.0 {
        format!("{:.2}A", milliamps / 1000.0)
    } else {
        format!("{:.1}mA", milliamps)
    }
}

/// Format a capacitance given in microfarads.
pub fn format_capacitance(microfarads: f64) -> String {
    if microfarads < 1.0 {
        format!("{:.0}nF", microfarads * 1000.0)
    } else if microfarads >= 1000.0 {
        format!("{:.1}mF", microfarads / 1000.0)
    } else {
        format!("{}μF", microfarads)
    }
}

/// Format an inductance given in henries.
pub fn format_inductance(henries: f64) -> String {
    if henries < 1.0 {
        format!("{:.0}mH", henries * 1000.0)
    } else {
        format!("{:.1}H", henries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_standard_shorthand() {
        assert_relative_eq!(parse_resistance("4.7k"), 4700.0);
        assert_relative_eq!(parse_resistance("1M"), 1_000_000.0);
        assert_relative_eq!(parse_resistance("100"), 100.0);
        assert_relative_eq!(parse_resistance("4k7"), 4700.0);
        assert_relative_eq!(parse_resistance("100R"), 100.0);
        assert_relative_eq!(parse_resistance("1K5"), 1500.0);
    }

    #[test]
    fn test_parse_numeric_passthrough() {
        assert_relative_eq!(parse_resistance(33_000.0), 33_000.0);
        assert_relative_eq!(parse_resistance(0.0), 0.0);
    }

    #[test]
    fn test_parse_whitespace_and_case() {
        assert_relative_eq!(parse_resistance(" 47 K "), 47_000.0);
        assert_relative_eq!(parse_resistance("2.2 m"), 2_200_000.0);
    }

    #[test]
    fn test_parse_rkm_outside_table() {
        assert_relative_eq!(parse_resistance("2k7"), 2700.0);
        assert_relative_eq!(parse_resistance("3m3"), 3_300_000.0);
        assert_relative_eq!(parse_resistance("4r7"), 4.7);
        assert_relative_eq!(parse_resistance("330r"), 330.0);
    }

    #[test]
    fn test_parse_trailing_garbage() {
        assert_relative_eq!(parse_resistance("1500 Ω"), 1500.0);
        assert_relative_eq!(parse_resistance("1e3"), 1000.0);
    }

    #[test]
    fn test_parse_malformed_is_zero() {
        assert_eq!(parse_resistance("abc"), 0.0);
        assert_eq!(parse_resistance(""), 0.0);
        assert_eq!(parse_resistance("k"), 0.0);
        assert_eq!(parse_resistance("."), 0.0);
    }

    #[test]
    fn test_formatters() {
        assert_eq!(format_ripple(0.25), "250μV");
        assert_eq!(format_ripple(12.34), "12.3mV");
        assert_eq!(format_ripple(1500.0), "1.50V");
        assert_eq!(format_resistance(470.0), "470");
        assert_eq!(format_resistance(4700.0), "4.7k");
        assert_eq!(format_resistance(1_000_000.0), "1.0M");
        assert_eq!(format_power(0.5), "500mW");
        assert_eq!(format_power(2.34), "2.3W");
        assert_eq!(format_current(63.0), "63.0mA");
        assert_eq!(format_current(0.5), "500μA");
        assert_eq!(format_current(1200.0), "1.20A");
        assert_eq!(format_capacitance(0.1), "100nF");
        assert_eq!(format_capacitance(47.0), "47μF");
        assert_eq!(format_inductance(0.5), "500mH");
        assert_eq!(format_inductance(10.0), "10.0H");
        assert_eq!(format_voltage(487.27), "487.3V");
    }
}

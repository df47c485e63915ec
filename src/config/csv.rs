//! Spreadsheet export of propagation results.

use std::io::Write;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{PsuError, Result};
use crate::solver::SectionResult;

const HEADER: [&str; 8] = [
    "Section",
    "Load type",
    "R [Ω]",
    "C [µF]",
    "U [V]",
    "I [mA]",
    "Ripple [mV]",
    "Power on R [W]",
];

/// Write `results` as CSV, preceded by `#` comment lines naming the
/// transformer voltage and rectifier.
pub fn write_csv<W: Write>(
    writer: &mut W,
    results: &[SectionResult],
    vac: f64,
    rectifier: &str,
    exported_at: DateTime<Utc>,
) -> Result<()> {
    write_rows(writer, results, vac, rectifier, exported_at).map_err(|e| PsuError::output(e.to_string()))
}

fn write_rows<W: Write>(
    writer: &mut W,
    results: &[SectionResult],
    vac: f64,
    rectifier: &str,
    exported_at: DateTime<Utc>,
) -> std::io::Result<()> {
    writeln!(
        writer,
        "# PSU Designer Export - {}",
        exported_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    )?;
    writeln!(writer, "# Transformer: {}V AC, Rectifier: {}", vac, rectifier)?;
    writeln!(writer, "#")?;
    writeln!(writer, "{}", HEADER.join(","))?;

    for r in results {
        let load = if r.load_description.is_empty() {
            "None"
        } else {
            r.load_description.as_str()
        };
        writeln!(
            writer,
            "{},{},{},{},{:.1},{:.1},{:.2},{:.3}",
            r.name, load, r.series_resistance, r.capacitance, r.voltage, r.current, r.ripple_mv, r.resistor_power
        )?;
    }

    Ok(())
}

/// Render `results` as a CSV string stamped with the current time.
pub fn to_csv(results: &[SectionResult], vac: f64, rectifier: &str) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(&mut buf, results, vac, rectifier, Utc::now())?;
    String::from_utf8(buf).map_err(|e| PsuError::output(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, PUSH_PULL};
    use crate::solver::ChainPropagator;
    use crate::supply::default_sections;
    use chrono::TimeZone;

    #[test]
    fn test_csv_layout() {
        let catalog = Catalog::standard();
        let results = ChainPropagator::new(&catalog).propagate(350.0, 1.4, &default_sections("EL34", PUSH_PULL));
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 18, 22, 5).unwrap();

        let mut buf = Vec::new();
        write_csv(&mut buf, &results, 350.0, "Silicon Bridge", at).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "# PSU Designer Export - 2025-03-01T18:22:05.000Z");
        assert_eq!(lines[1], "# Transformer: 350V AC, Rectifier: Silicon Bridge");
        assert_eq!(lines[2], "#");
        assert!(lines[3].starts_with("Section,Load type,R [Ω]"));
        assert_eq!(lines.len(), 4 + results.len());

        let a: Vec<&str> = lines[4].split(',').collect();
        assert_eq!(a[0], "A");
        assert_eq!(a[1], "Push-Pull EL34");
        assert_eq!(a[2], "0");
        assert_eq!(a[3], "47");
        assert_eq!(a[4], format!("{:.1}", results[0].voltage));
        assert_eq!(a[5], "63.0");
        assert_eq!(a[7], "0.000");

        let b: Vec<&str> = lines[5].split(',').collect();
        // 1k at 10 mA
        assert_eq!(b[7], "0.100");
    }

    #[test]
    fn test_to_csv_has_header() {
        let text = to_csv(&[], 300.0, "5Y3").unwrap();
        assert!(text.starts_with("# PSU Designer Export - "));
        assert_eq!(text.lines().count(), 4);
    }
}

//! psu - Tube Amplifier Power Supply Calculator
//!
//! Computes node voltages, currents and ripple along a B+ filter chain.
//!
//! # Usage
//!
//! ```bash
//! psu design.json
//! psu --preset "Fender Deluxe Reverb" --sag 150
//! psu --preset "Marshall JCM800" --csv > jcm800.csv
//! RUST_LOG=debug psu design.json --json
//! ```

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use tube_psu_core::{
    catalog::{Catalog, PUSH_PULL},
    config::{self, SupplyConfig},
    error::{PsuError, Result},
    models::{estimate_sag, predict_tone_character, section_safety},
    supply::default_sections,
    units::{format_current, format_power, format_resistance, format_ripple, format_voltage},
    Analysis, PropagatorConfig, DEFAULT_RECTIFIER, DEFAULT_VAC,
};

/// Tube amplifier power supply calculator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a saved design (.json)
    #[arg(value_name = "CONFIG_FILE", conflicts_with = "preset")]
    config_file: Option<PathBuf>,

    /// Start from a library preset instead of a file
    #[arg(short, long)]
    preset: Option<String>,

    /// Output stage sag resistance in ohms
    #[arg(long, default_value_t = 0.0)]
    sag: f64,

    /// Print results as CSV
    #[arg(long, conflicts_with = "json")]
    csv: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Write the design (stamped) to this path
    #[arg(long, value_name = "PATH")]
    save: Option<PathBuf>,

    /// List the preset library and exit
    #[arg(long)]
    list_presets: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let catalog = Catalog::standard();

    if args.list_presets {
        for preset in config::PRESETS {
            println!("{:<24} {:<8} {}", preset.name, preset.category, preset.description);
        }
        return Ok(());
    }

    let design = match (&args.config_file, &args.preset) {
        (Some(path), _) => SupplyConfig::load(path)?,
        (None, Some(name)) => config::preset_config(&catalog, name)?,
        (None, None) => SupplyConfig::new(DEFAULT_VAC, DEFAULT_RECTIFIER, default_sections("EL34", PUSH_PULL))
            .with_power_stage("EL34", PUSH_PULL),
    };

    design.validate()?;

    if let Some(path) = &args.save {
        design.save(path)?;
        tracing::info!(path = %path.display(), "saved design");
    }

    let propagator = PropagatorConfig::new().with_sag_resistance(args.sag);
    let analysis = design.analyze(&catalog, propagator);

    let mut out = std::io::stdout().lock();
    if args.csv {
        config::write_csv(&mut out, &analysis.results, design.vac, &design.rectifier, chrono::Utc::now())
    } else if args.json {
        serde_json::to_writer_pretty(&mut out, &analysis).map_err(|e| PsuError::output(e.to_string()))?;
        writeln!(out).map_err(|e| PsuError::output(e.to_string()))
    } else {
        print_report(&mut out, &catalog, &design, &analysis, args.sag).map_err(|e| PsuError::output(e.to_string()))
    }
}

fn print_report(
    out: &mut impl Write,
    catalog: &Catalog,
    design: &SupplyConfig,
    analysis: &Analysis,
    sag_resistance: f64,
) -> std::io::Result<()> {
    let stats = &analysis.statistics;

    writeln!(out, "Transformer: {}V AC, Rectifier: {}", design.vac, design.rectifier)?;
    writeln!(out, "Peak voltage: {}", format_voltage(stats.peak_voltage))?;
    writeln!(out)?;
    writeln!(
        out,
        "{:<4} {:<4} {:>8} {:>8} {:>10} {:>10} {:>10} {:>8}  Load",
        "Sec", "Type", "R", "C [µF]", "U", "I", "Ripple", "P(R)"
    )?;

    for result in &analysis.results {
        writeln!(
            out,
            "{:<4} {:<4} {:>8} {:>8} {:>10} {:>10} {:>10} {:>8}  {}",
            result.name,
            result.filter_type.to_string(),
            format_resistance(result.series_resistance),
            result.capacitance,
            format_voltage(result.voltage),
            format_current(result.current),
            format_ripple(result.ripple_mv),
            format_power(result.resistor_power),
            result.load_description,
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Total current: {}", format_current(stats.total_current))?;
    writeln!(out, "Total drop:    {}", format_voltage(stats.voltage_drop))?;
    writeln!(out, "Final ripple:  {}", format_ripple(stats.final_ripple))?;
    writeln!(out, "Resistor loss: {}", format_power(stats.total_resistor_power))?;
    writeln!(out, "Efficiency:    {:.1}%", stats.efficiency)?;

    if let Some(last) = analysis.results.last() {
        let peak_current = analysis.results.first().map_or(0.0, |r| r.current);
        let sag = estimate_sag(sag_resistance, peak_current);
        let tone = predict_tone_character(last.voltage, last.ripple_mv, sag.voltage_drop);
        writeln!(out, "Sag:           {} ({})", format_voltage(sag.voltage_drop), sag.feel)?;
        writeln!(out, "Character:     {}", tone.overall)?;
    }

    let warnings: Vec<String> = design
        .stages
        .iter()
        .zip(&analysis.results)
        .filter_map(|(stage, result)| {
            let load = stage.load.as_ref()?;
            let report = section_safety(catalog, load, &result.tube_voltages)?;
            Some(report.warnings.into_iter().map(move |w| format!("{}: {}", result.name, w)))
        })
        .flatten()
        .collect();

    if !warnings.is_empty() {
        writeln!(out)?;
        writeln!(out, "Warnings:")?;
        for warning in warnings {
            writeln!(out, "  - {warning}")?;
        }
    }

    Ok(())
}

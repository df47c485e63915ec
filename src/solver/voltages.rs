//! Per-tube electrode voltages at a section's node.

use serde::Serialize;

use crate::catalog::Catalog;
use crate::models::section_current;
use crate::supply::{InverterLoad, Load, PowerLoad, PreampLoad, ScreenLoad, DEFAULT_ANODE_RESISTOR};

use super::OperatingPointSolver;

/// Output stage anode conditions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerStageVoltages {
    /// Anode voltage [V]
    pub anode_voltage: f64,
    /// Anode current per tube [mA]
    pub anode_current: f64,
    /// Drop across the output transformer primary [V]
    pub transformer_drop: f64,
    /// Drop across the sag resistance [V]
    pub sag_drop: f64,
    /// Node voltage minus anode voltage [V]
    pub headroom: f64,
    /// Anode dissipation per tube [W]
    pub dissipation: f64,
    pub converged: bool,
}

/// Screen grid voltage behind one dropping resistor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenTap {
    /// 1-based tube index
    pub tube: usize,
    pub screen_voltage: f64,
    pub current: f64,
    pub drop: f64,
    /// Power in the dropping resistor [W]
    pub resistor_power: f64,
}

/// Screen supply conditions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenVoltages {
    /// Screen voltage [V] (first tube when resistors are separate)
    pub screen_voltage: f64,
    /// Total screen current [mA]
    pub current: f64,
    /// Drop across the dropping resistor [V]
    pub drop: f64,
    /// Total power in the dropping resistor(s) [W]
    pub resistor_power: f64,
    /// Per-tube taps, empty when one resistor is shared
    pub taps: Vec<ScreenTap>,
}

/// Phase inverter conditions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InverterVoltages {
    pub anode_voltage: f64,
    pub current: f64,
    pub drop: f64,
    /// Phase balance (0-1), when the topology is known
    pub balance: Option<f64>,
}

/// One triode's operating point in a preamp stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriodePoint {
    /// 1-based triode index across the stage
    pub triode: usize,
    /// 1-based envelope index
    pub tube: usize,
    /// Triode section within the envelope (1 or 2)
    pub unit: usize,
    pub anode_resistor: f64,
    pub anode_voltage: f64,
    pub anode_current: f64,
    pub drop: f64,
    /// Anode dissipation [W]
    pub dissipation: f64,
    pub gain: f64,
    pub converged: bool,
}

/// Preamp stage conditions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreampVoltages {
    /// Anode voltage [V], averaged over triodes with separate resistors
    pub anode_voltage: f64,
    /// Total anode current [mA]
    pub total_current: f64,
    pub drop: f64,
    /// Stage gain with a shared anode resistor
    pub gain: Option<f64>,
    /// Per-triode points, empty when one resistor value is shared
    pub triodes: Vec<TriodePoint>,
}

/// Electrode conditions for whatever a section powers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TubeVoltages {
    Power(PowerStageVoltages),
    Screen(ScreenVoltages),
    Inverter(InverterVoltages),
    Preamp(PreampVoltages),
    /// Nothing modelled at this node
    None,
}

impl TubeVoltages {
    /// Anode (or screen) voltage, if there is one.
    pub fn anode_voltage(&self) -> Option<f64> {
        match self {
            TubeVoltages::Power(p) => Some(p.anode_voltage),
            TubeVoltages::Screen(s) => Some(s.screen_voltage),
            TubeVoltages::Inverter(i) => Some(i.anode_voltage),
            TubeVoltages::Preamp(p) => Some(p.anode_voltage),
            TubeVoltages::None => None,
        }
    }

    /// Highest per-tube anode dissipation [W], if computed.
    pub fn dissipation(&self) -> Option<f64> {
        match self {
            TubeVoltages::Power(p) => Some(p.dissipation),
            TubeVoltages::Preamp(p) => p.triodes.iter().map(|t| t.dissipation).reduce(f64::max),
            TubeVoltages::Screen(_) | TubeVoltages::Inverter(_) | TubeVoltages::None => None,
        }
    }
}

/// Derive electrode voltages for `load` given its node voltage.
pub(crate) fn tube_voltages(
    load: &Load,
    node_voltage: f64,
    catalog: &Catalog,
    solver: &OperatingPointSolver,
    sag_resistance: f64,
    grid_voltage: f64,
) -> TubeVoltages {
    match load {
        Load::Power(power) => power_stage(power, node_voltage, catalog, solver, sag_resistance, grid_voltage),
        Load::G2(screen) => screen_supply(load, screen, node_voltage, catalog),
        Load::Inverter(inverter) => inverter_stage(load, inverter, node_voltage, catalog),
        Load::Preamp(preamp) => preamp_stage(preamp, node_voltage, catalog, solver, grid_voltage),
        Load::Other(_) => TubeVoltages::None,
    }
}

fn power_stage(
    power: &PowerLoad,
    node_voltage: f64,
    catalog: &Catalog,
    solver: &OperatingPointSolver,
    sag_resistance: f64,
    grid_voltage: f64,
) -> TubeVoltages {
    let Some(tube) = catalog.power_tube(&power.tubes) else {
        return TubeVoltages::None;
    };

    let dcr = power.dcr();
    let op = solver.solve_biased(tube, node_voltage, dcr + sag_resistance, grid_voltage);

    TubeVoltages::Power(PowerStageVoltages {
        anode_voltage: op.anode_voltage,
        anode_current: op.anode_current,
        transformer_drop: dcr * op.anode_current / 1000.0,
        sag_drop: sag_resistance * op.anode_current / 1000.0,
        headroom: node_voltage - op.anode_voltage,
        dissipation: op.anode_voltage * op.anode_current / 1000.0,
        converged: op.converged,
    })
}

fn screen_supply(load: &Load, screen: &ScreenLoad, node_voltage: f64, catalog: &Catalog) -> TubeVoltages {
    let current = section_current(load, catalog);
    let resistor = screen.resistor();

    let tube_count = catalog
        .power_config(&screen.config)
        .map(|config| config.multiplier.max(1.0) as usize)
        .unwrap_or(1);

    if screen.separate && tube_count > 1 {
        let per_tube = current / tube_count as f64;
        let drop = resistor * per_tube / 1000.0;
        let power = resistor * (per_tube / 1000.0).powi(2);

        let taps: Vec<ScreenTap> = (1..=tube_count)
            .map(|tube| ScreenTap {
                tube,
                screen_voltage: node_voltage - drop,
                current: per_tube,
                drop,
                resistor_power: power,
            })
            .collect();

        return TubeVoltages::Screen(ScreenVoltages {
            screen_voltage: node_voltage - drop,
            current,
            drop,
            resistor_power: power * tube_count as f64,
            taps,
        });
    }

    let drop = resistor * current / 1000.0;
    TubeVoltages::Screen(ScreenVoltages {
        screen_voltage: node_voltage - drop,
        current,
        drop,
        resistor_power: resistor * (current / 1000.0).powi(2),
        taps: Vec::new(),
    })
}

fn inverter_stage(load: &Load, inverter: &InverterLoad, node_voltage: f64, catalog: &Catalog) -> TubeVoltages {
    let current = section_current(load, catalog);
    let drop = inverter.anode_resistor() * current / 1000.0;

    TubeVoltages::Inverter(InverterVoltages {
        anode_voltage: node_voltage - drop,
        current,
        drop,
        balance: catalog.inverter(&inverter.inverter_type).map(|t| t.balance),
    })
}

fn preamp_stage(
    preamp: &PreampLoad,
    node_voltage: f64,
    catalog: &Catalog,
    solver: &OperatingPointSolver,
    grid_voltage: f64,
) -> TubeVoltages {
    let Some(tube) = catalog.preamp_tube(&preamp.tubes) else {
        return TubeVoltages::None;
    };
    let small_signal = tube.small_signal();
    let triode_count = preamp.triode_count() as usize;

    let resistors = match (&preamp.anode_resistors, preamp.separate_ra) {
        (Some(resistors), true) if !resistors.is_empty() => resistors,
        _ => {
            let ra = preamp.anode_resistor();
            let op = solver.solve_biased(tube, node_voltage, ra, grid_voltage);
            return TubeVoltages::Preamp(PreampVoltages {
                anode_voltage: op.anode_voltage,
                total_current: op.anode_current * triode_count as f64,
                drop: node_voltage - op.anode_voltage,
                gain: Some(small_signal.stage_gain(ra)),
                triodes: Vec::new(),
            });
        }
    };

    let triodes: Vec<TriodePoint> = resistors
        .iter()
        .take(triode_count)
        .enumerate()
        .map(|(idx, &ra)| {
            let ra = if ra > 0.0 { ra } else { DEFAULT_ANODE_RESISTOR };
            let op = solver.solve_biased(tube, node_voltage, ra, grid_voltage);
            TriodePoint {
                triode: idx + 1,
                tube: idx / 2 + 1,
                unit: idx % 2 + 1,
                anode_resistor: ra,
                anode_voltage: op.anode_voltage,
                anode_current: op.anode_current,
                drop: node_voltage - op.anode_voltage,
                dissipation: op.anode_voltage * op.anode_current / 1000.0,
                gain: small_signal.stage_gain(ra),
                converged: op.converged,
            }
        })
        .collect();

    let average = if triodes.is_empty() {
        node_voltage
    } else {
        triodes.iter().map(|t| t.anode_voltage).sum::<f64>() / triodes.len() as f64
    };

    TubeVoltages::Preamp(PreampVoltages {
        anode_voltage: average,
        total_current: triodes.iter().map(|t| t.anode_current).sum(),
        drop: node_voltage - average,
        gain: None,
        triodes,
    })
}

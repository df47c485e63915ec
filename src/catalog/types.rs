//! Reference record types for tubes, rectifiers and stage topologies.

use std::fmt;

use serde::Serialize;

/// Anode voltage assumed when a tube record carries no typical value.
pub const DEFAULT_TYPICAL_ANODE_VOLTAGE: f64 = 400.0;

/// Electrode structure of a tube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TubeKind {
    /// True pentode (EL34, EL84, EF86)
    Pentode,
    /// Beam tetrode (6L6, KT88)
    Beam,
    /// Single triode (300B, 2A3)
    Triode,
    /// Two triodes in one envelope (12AX7 family)
    DualTriode,
}

impl TubeKind {
    /// Whether the tube has a screen grid drawing its own current.
    pub fn has_screen_grid(&self) -> bool {
        matches!(self, TubeKind::Pentode | TubeKind::Beam)
    }
}

impl fmt::Display for TubeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TubeKind::Pentode => "pentode",
            TubeKind::Beam => "beam",
            TubeKind::Triode => "triode",
            TubeKind::DualTriode => "dual-triode",
        };
        f.write_str(name)
    }
}

/// Anything with a nominal anode operating point the solver can anchor to.
pub trait AnodeModel {
    /// Quiescent anode current in mA.
    fn nominal_anode_current(&self) -> f64;

    /// Anode voltage at which the nominal current is specified.
    fn typical_anode_voltage(&self) -> f64 {
        DEFAULT_TYPICAL_ANODE_VOLTAGE
    }
}

/// An output (power) tube.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerTube {
    /// Idle anode current per tube [mA]
    pub anode_current: f64,
    /// Screen grid current per tube [mA]
    pub screen_current: f64,
    /// Typical screen voltage [V]
    pub screen_voltage: f64,
    pub kind: TubeKind,
    /// Typical anode voltage [V]
    pub typical_anode_voltage: f64,
    /// Absolute maximum anode voltage [V]
    pub max_anode_voltage: f64,
    /// Maximum anode dissipation [W]
    pub max_dissipation: f64,
}

impl AnodeModel for PowerTube {
    fn nominal_anode_current(&self) -> f64 {
        self.anode_current
    }

    fn typical_anode_voltage(&self) -> f64 {
        self.typical_anode_voltage
    }
}

/// A small-signal (preamp) tube. Currents are per triode section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreampTube {
    /// Anode current per triode [mA]
    pub anode_current: f64,
    /// Amplification factor (0 for pentodes)
    pub mu: f64,
    /// Transconductance [mA/V]
    pub gm: f64,
    /// Plate resistance [kΩ] (0 for pentodes)
    pub rp_kohm: f64,
    pub kind: TubeKind,
    /// Customary anode resistor [Ω]
    pub typical_anode_resistor: f64,
    /// Absolute maximum anode voltage [V]
    pub max_anode_voltage: f64,
}

impl PreampTube {
    /// Small-signal figures, falling back to 12AX7 values where the
    /// catalog has none (pentodes list mu and rp as zero).
    pub fn small_signal(&self) -> SmallSignal {
        SmallSignal {
            mu: if self.mu > 0.0 { self.mu } else { 100.0 },
            gm: if self.gm > 0.0 { self.gm } else { 1.6 },
            rp_ohms: if self.rp_kohm > 0.0 { self.rp_kohm } else { 62.5 } * 1000.0,
        }
    }
}

impl AnodeModel for PreampTube {
    fn nominal_anode_current(&self) -> f64 {
        self.anode_current
    }
}

/// Small-signal triode parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SmallSignal {
    pub mu: f64,
    /// Transconductance [mA/V]
    pub gm: f64,
    /// Plate resistance [Ω]
    pub rp_ohms: f64,
}

impl SmallSignal {
    /// Voltage gain of a common-cathode stage with anode resistor `ra`.
    pub fn stage_gain(&self, ra: f64) -> f64 {
        -(ra / (self.rp_ohms + ra)) * self.mu
    }
}

/// A phase inverter topology.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InverterType {
    /// Typical total current draw [mA]
    pub current: f64,
    /// Number of anode resistors
    pub anode_resistors: u32,
    /// Phase balance (0-1)
    pub balance: f64,
    /// Gain per phase
    pub gain: f64,
}

/// Class of operation of an output stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OperatingClass {
    A,
    AB,
}

impl OperatingClass {
    /// Fraction of full idle current drawn at rest.
    pub fn idle_current_factor(&self) -> f64 {
        match self {
            OperatingClass::A => 1.0,
            OperatingClass::AB => 0.7,
        }
    }
}

/// An output stage configuration (single-ended, push-pull, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerConfig {
    /// Number of output tubes
    pub multiplier: f64,
    pub class: OperatingClass,
    /// Conversion efficiency (0-1)
    pub efficiency: f64,
    /// Typical distortion [%]
    pub thd_typical: f64,
    /// Output power relative to the tube's rating
    pub power_factor: f64,
}

/// Rectifier technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RectifierKind {
    SolidState,
    Tube,
}

/// A rectifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rectifier {
    /// Forward voltage drop [V]
    pub drop: f64,
    pub kind: RectifierKind,
    /// Load regulation (0-1)
    pub regulation: f64,
    /// Maximum DC output current [mA]
    pub max_current: f64,
}

/// Absolute ratings used by the safety check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TubeLimits {
    pub max_anode_voltage: f64,
    /// Maximum anode dissipation [W], when rated
    pub max_dissipation: Option<f64>,
}

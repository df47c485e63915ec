//! The calculation engine.
//!
//! ## Propagation
//!
//! The rectified peak `Vpk = Vac·√2 − Vrect` enters the first section. For
//! each section in order:
//!
//! ```text
//! I   = load current
//! V  -= load drop(I)
//! V  -= R_series · I          (choke DCR for LC sections)
//! Vr  = ripple(I, C) · H(100 Hz)
//! ```
//!
//! and the node voltage `V` carries forward. Tube electrode voltages are
//! then found at each node with the operating point solver, a fixed-point
//! iteration between anode current and anode resistor drop.
//!
//! Nothing here returns an error: unknown catalog names contribute zero and
//! the solver always terminates.

mod chain;
mod operating_point;
mod stats;
mod voltages;

pub use chain::{peak_voltage, Analysis, ChainPropagator, PropagatorConfig, SectionResult};
pub use operating_point::{OperatingPoint, OperatingPointSolver};
pub use stats::Statistics;
pub use voltages::{
    InverterVoltages, PowerStageVoltages, PreampVoltages, ScreenTap, ScreenVoltages, TriodePoint,
    TubeVoltages,
};

/// Convergence tolerance for the operating point iteration [V].
pub const CONVERGENCE_TOLERANCE: f64 = 1.0;

/// Maximum operating point iterations.
pub const MAX_ITERATIONS: usize = 10;

/// DC resistance assumed for a filter choke [Ω].
pub const COIL_DCR: f64 = 10.0;

/// Default grid bias [V].
pub const DEFAULT_GRID_VOLTAGE: f64 = -2.0;

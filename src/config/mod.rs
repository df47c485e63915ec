//! Saved designs: the JSON file format, validation, CSV export and the
//! preset library.
//!
//! ```json
//! { "version": "6.0", "timestamp": "2025-03-01T18:22:05.123Z",
//!   "vac": 350, "rectifier": "Silicon Bridge",
//!   "powerTubeType": "EL34", "powerConfig": "Push-Pull",
//!   "stages": [ { "id": 1, "name": "A", "R": 0, "C": 47, "filterType": "RC",
//!                 "load": { "type": "power", "tubes": "EL34",
//!                           "config": "Push-Pull", "dcr": 100 } } ] }
//! ```

mod csv;
mod format;
mod presets;
mod validate;

pub use csv::{to_csv, write_csv};
pub use format::{SupplyConfig, CONFIG_VERSION};
pub use presets::{find_preset, parse_power_stage, preset_config, preset_names, Preset, PRESETS};
pub use validate::{validate_config, VAC_RANGE};

//! Filter chain data model.
//!
//! A supply is an ordered list of [`Section`]s. Each section is a series
//! element (resistor or choke) followed by a shunt capacitor, and powers one
//! [`Load`]. Voltage flows strictly from the first section to the last.

mod edit;
mod types;
mod validate;

pub use edit::{
    add_section, default_load, default_sections, delete_section, section_letter, sync_power_tubes,
    update_section, SectionEdit,
};
pub(crate) use edit::free_section_id;
pub use types::*;
pub use validate::validate_sections;

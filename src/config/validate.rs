//! Saved-design validation.

use crate::error::{PsuError, Result};
use crate::supply::validate_sections;

use super::SupplyConfig;

/// Accepted transformer secondary range [V AC].
pub const VAC_RANGE: std::ops::RangeInclusive<f64> = 200.0..=500.0;

/// Check a saved design, returning every problem found.
pub fn validate_config(config: &SupplyConfig) -> Vec<String> {
    let mut problems = Vec::new();

    if config.version.is_empty() {
        problems.push("Missing version".to_string());
    }

    if !VAC_RANGE.contains(&config.vac) {
        problems.push(format!("Invalid transformer voltage {}V", config.vac));
    }

    if config.rectifier.is_empty() {
        problems.push("Missing rectifier".to_string());
    }

    problems.extend(validate_sections(&config.stages));
    problems
}

impl SupplyConfig {
    /// Fail with every validation problem, if there are any.
    pub fn validate(&self) -> Result<()> {
        let problems = validate_config(self);
        if problems.is_empty() {
            Ok(())
        } else {
            Err(PsuError::invalid_config(problems))
        }
    }
}

//! Error types for the tube PSU calculator.
//!
//! The calculation engine itself is total: malformed numbers and unknown
//! catalog keys degrade to zero contributions instead of failing. Only the
//! outer surfaces (configuration import/export, validation, preset lookup)
//! can fail, and they report through [`PsuError`].

use thiserror::Error;

/// Result type alias using [`PsuError`].
pub type Result<T> = std::result::Result<T, PsuError>;

/// Unified error type for all fallible PSU operations.
#[derive(Error, Debug)]
pub enum PsuError {
    // ============ Configuration Format Errors ============
    /// Configuration JSON could not be parsed or produced
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration parsed but failed validation
    #[error("Configuration is invalid: {}", .problems.join("; "))]
    InvalidConfig { problems: Vec<String> },

    /// Preset name not present in the preset library
    #[error("Unknown preset '{name}'")]
    UnknownPreset { name: String },

    // ============ I/O Errors ============
    /// Error reading a configuration file
    #[error("Failed to read configuration file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing an exported file
    #[error("Failed to write '{path}': {source}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing report output
    #[error("Output error: {message}")]
    OutputError { message: String },
}

impl PsuError {
    /// Create a validation error from a list of problems
    pub fn invalid_config(problems: Vec<String>) -> Self {
        Self::InvalidConfig { problems }
    }

    /// Create an unknown preset error
    pub fn unknown_preset(name: impl Into<String>) -> Self {
        Self::UnknownPreset { name: name.into() }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::OutputError {
            message: message.into(),
        }
    }
}

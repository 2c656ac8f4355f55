//! Error types for the Skirmish audio subsystem.

use thiserror::Error;

/// Top-level error type for Skirmish operations.
#[derive(Debug, Error)]
pub enum SkirmishError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration and static-table errors.
///
/// These are raised once at startup and are fatal for initialization, unlike
/// runtime audio failures which are always absorbed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A catalog slot does not hold the entry for its identifier.
    #[error("Catalog '{catalog}' slot {index}: expected {expected}, found {found}")]
    CatalogMismatch {
        /// Catalog name
        catalog: &'static str,
        /// Slot index
        index: usize,
        /// Identifier the slot should describe
        expected: String,
        /// Identifier actually found
        found: String,
    },

    /// A configuration value is out of range.
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Why the value was rejected
        reason: String,
    },

    /// A configuration file could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Result type alias for Skirmish operations.
pub type SkirmishResult<T> = Result<T, SkirmishError>;

/// Result type alias for configuration checks.
pub type ConfigResult<T> = Result<T, ConfigError>;

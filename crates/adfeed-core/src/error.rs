//! Configuration error types.

use thiserror::Error;

/// Errors raised while building or loading engine configuration.
///
/// The placement engine itself never fails; every rejection happens when a
/// configuration is constructed.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Slot interval must be at least one content item.
    #[error("interval must be at least 1, got {0}")]
    InvalidInterval(i64),

    /// A count that must be non-negative was negative.
    #[error("{field} must be non-negative, got {value}")]
    NegativeValue {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: i64,
    },

    /// A value does not fit the engine's counter type.
    #[error("{field} is too large: {value}")]
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: i64,
    },

    /// A keyword list could not be compiled into a matcher.
    #[error("Invalid keyword list: {0}")]
    InvalidKeyword(#[from] regex::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error (e.g., reading a config file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigurationError>;

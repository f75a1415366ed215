//! Core error types for the storefront suite.
//!
//! Configuration problems are reported here and surface at process start,
//! before any browser is launched.

use thiserror::Error;

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An environment value could not be coerced to its declared type
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Environment variable name
        field: String,
        /// Reason for invalidity
        reason: String,
    },

    /// I/O error while preparing report directories or log files
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::invalid("TIMEOUT", "not a number");
        assert_eq!(
            err.to_string(),
            "invalid config value for TIMEOUT: not a number"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: ConfigError = io_err.into();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

//! Configuration error types.

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable was not set.
    #[error("missing required environment variable: {name}")]
    MissingEnvVar {
        /// Name of the missing variable.
        name: &'static str,
    },

    /// A numeric environment variable could not be parsed.
    #[error("failed to parse {name}='{value}' as a number: {source}")]
    NumberParseError {
        /// Name of the offending variable.
        name: &'static str,
        /// Raw value that failed to parse.
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Bind address string could not be parsed.
    #[error("failed to parse bind address '{value}': {source}")]
    InvalidBindAddr {
        /// Raw value that failed to parse.
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

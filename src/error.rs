//! Error types for corral operations.
//!
//! Two tiers: configuration and argument errors abort the call before any
//! backend traffic, while backend errors wrap the driver's error and
//! propagate, so "no matches" and "operation failed" stay distinguishable.

use std::num::ParseIntError;
use thiserror::Error;

/// Main error type for corral operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Required environment variable is absent.
    #[error("missing environment variable {name}")]
    MissingVar { name: &'static str },

    /// Configuration parameter is present but empty.
    #[error("configuration field `{name}` must not be empty")]
    EmptyField { name: &'static str },

    /// Port could not be parsed as a number.
    #[error("invalid port `{value}`: {source}")]
    InvalidPort {
        value: String,
        source: ParseIntError,
    },

    /// Required operation argument is empty.
    #[error("{0} must not be empty")]
    InvalidArgument(&'static str),

    /// The driver reported a failure (network, write conflict, auth, ...).
    #[error("MongoDB operation failed: {0}")]
    Backend(#[from] mongodb::error::Error),
}

/// Result type alias for corral operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::MissingVar { name: "MONGO_USER" };
        assert_eq!(err.to_string(), "missing environment variable MONGO_USER");

        let err = Error::EmptyField { name: "host" };
        assert_eq!(err.to_string(), "configuration field `host` must not be empty");

        let err = Error::InvalidArgument("query");
        assert_eq!(err.to_string(), "query must not be empty");
    }

    #[test]
    fn invalid_port_carries_source() {
        let source = "not-a-port".parse::<u16>().unwrap_err();
        let err = Error::InvalidPort {
            value: "not-a-port".into(),
            source,
        };
        assert!(err.to_string().contains("not-a-port"));
    }
}

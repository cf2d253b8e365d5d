//! Session error types.

use std::path::PathBuf;
use thiserror::Error;

use hv_model::FilterError;

/// Errors raised by session construction and configuration.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A configuration value is out of range.
    #[error("invalid session configuration: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`SessionConfig`](crate::SessionConfig).
    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A predicate was set with an unknown name or invalid value.
    #[error(transparent)]
    Filter(#[from] FilterError),
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Failure reported by an event handler or render consumer.
///
/// Handler failures are logged and isolated; they never reach the caller
/// that triggered the emission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

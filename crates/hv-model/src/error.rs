//! Error types for query-level misuse.

use thiserror::Error;

use crate::filter::FilterField;

/// Errors raised when the UI glue sets a predicate incorrectly.
///
/// The filter specification is never modified when one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// The predicate name is not one of the known filter fields.
    #[error("unknown filter field '{name}'")]
    UnknownField { name: String },

    /// The value could not be parsed for the given predicate.
    #[error("invalid value '{value}' for filter {field}: {reason}")]
    InvalidValue {
        field: FilterField,
        value: String,
        reason: String,
    },
}

impl FilterError {
    pub(crate) fn invalid(field: FilterField, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for filter operations.
pub type Result<T> = std::result::Result<T, FilterError>;

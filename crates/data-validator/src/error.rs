//! Validation Error Types

use thiserror::Error;

/// Errors for a single request field
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Value could not be parsed
    #[error("{field} must be {expected}")]
    InvalidFormat {
        field: &'static str,
        expected: &'static str,
    },

    /// Value is not one of the accepted labels
    #[error("{field} must be one of: {allowed}")]
    InvalidChoice {
        field: &'static str,
        allowed: String,
    },

    /// Missing required field
    #[error("{0} is required")]
    MissingField(&'static str),
}

impl ValidationError {
    /// Name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::InvalidChoice { field, .. }
            | ValidationError::MissingField(field) => *field,
        }
    }
}

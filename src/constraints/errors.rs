//! Errors raised while compiling constraint declarations

use thiserror::Error;

use super::types::ConstraintKind;

/// A constraint declaration that cannot be applied to its field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
    #[error("field '{field}': '{constraint}' does not apply to type {field_type}")]
    NotApplicable {
        field: String,
        constraint: ConstraintKind,
        field_type: &'static str,
    },

    #[error("field '{field}': invalid pattern: {reason}")]
    InvalidPattern { field: String, reason: String },

    #[error("field '{field}': bound for '{constraint}' is invalid: {reason}")]
    InvalidBound {
        field: String,
        constraint: ConstraintKind,
        reason: String,
    },

    #[error("field '{field}': '{lower}' is greater than '{upper}'")]
    InvertedBounds {
        field: String,
        lower: ConstraintKind,
        upper: ConstraintKind,
    },
}

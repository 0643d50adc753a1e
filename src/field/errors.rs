//! Cast error type for a single cell

use thiserror::Error;

/// Result type for cast operations
pub type CastResult<T> = Result<T, CastError>;

/// Why a raw string could not be turned into (or produced from) a typed value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CastError {
    #[error("'{raw}' is not a valid {expected}")]
    Invalid { expected: &'static str, raw: String },

    #[error("'{raw}' is out of range for {expected}")]
    OutOfRange { expected: &'static str, raw: String },

    #[error("unsupported format '{format}' for {expected}")]
    UnsupportedFormat { expected: &'static str, format: String },

    #[error("cannot format {actual} value as {expected}")]
    ValueMismatch {
        expected: &'static str,
        actual: &'static str,
    },
}

impl CastError {
    pub(crate) fn invalid(expected: &'static str, raw: &str) -> Self {
        CastError::Invalid {
            expected,
            raw: raw.to_string(),
        }
    }

    pub(crate) fn out_of_range(expected: &'static str, raw: &str) -> Self {
        CastError::OutOfRange {
            expected,
            raw: raw.to_string(),
        }
    }

    pub(crate) fn unsupported_format(expected: &'static str, format: &str) -> Self {
        CastError::UnsupportedFormat {
            expected,
            format: format.to_string(),
        }
    }
}

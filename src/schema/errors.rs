//! Schema error types
//!
//! Error codes:
//! - TABLE_SCHEMA_INVALID
//! - TABLE_SCHEMA_MALFORMED
//! - TABLE_HEADER_MISMATCH
//! - TABLE_ROW_WIDTH_MISMATCH
//! - TABLE_CAST_FAILED
//! - TABLE_CONSTRAINT_VIOLATED
//! - TABLE_PATH_REJECTED
//! - TABLE_SOURCE_FAILED

use std::fmt;

use crate::constraints::ConstraintError;
use crate::datasource::{SecurityError, SourceError, StructuralError};
use crate::field::CastError;

use super::session::{CellFailure, FailureKind};

/// Schema error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Field list, primary key or constraint declarations are inconsistent
    TableSchemaInvalid,
    /// Schema document could not be read or parsed
    TableSchemaMalformed,
    /// Data header does not line up with the schema fields
    TableHeaderMismatch,
    /// A row has a different width from the header
    TableRowWidthMismatch,
    /// A cell did not cast to its field type
    TableCastFailed,
    /// A cast value violated a constraint
    TableConstraintViolated,
    /// A path left the working root
    TablePathRejected,
    /// Reading or writing the underlying data failed
    TableSourceFailed,
}

impl SchemaErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::TableSchemaInvalid => "TABLE_SCHEMA_INVALID",
            SchemaErrorCode::TableSchemaMalformed => "TABLE_SCHEMA_MALFORMED",
            SchemaErrorCode::TableHeaderMismatch => "TABLE_HEADER_MISMATCH",
            SchemaErrorCode::TableRowWidthMismatch => "TABLE_ROW_WIDTH_MISMATCH",
            SchemaErrorCode::TableCastFailed => "TABLE_CAST_FAILED",
            SchemaErrorCode::TableConstraintViolated => "TABLE_CONSTRAINT_VIOLATED",
            SchemaErrorCode::TablePathRejected => "TABLE_PATH_REJECTED",
            SchemaErrorCode::TableSourceFailed => "TABLE_SOURCE_FAILED",
        }
    }

    /// Whether the failure comes from the data rather than the schema
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            SchemaErrorCode::TableHeaderMismatch
                | SchemaErrorCode::TableRowWidthMismatch
                | SchemaErrorCode::TableCastFailed
                | SchemaErrorCode::TableConstraintViolated
        )
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type with context
#[derive(Debug, Clone)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    /// Field name if applicable
    field: Option<String>,
    /// 1-based data row if applicable
    row: Option<usize>,
}

impl SchemaError {
    fn new(code: SchemaErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
            row: None,
        }
    }

    /// Two or more fields share a name
    pub fn duplicate_field(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            message: format!("field '{}' is declared more than once", name),
            field: Some(name),
            ..Self::new(SchemaErrorCode::TableSchemaInvalid, "")
        }
    }

    /// A primary key names a field that does not exist
    pub fn unknown_key_field(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            message: format!("primary key references unknown field '{}'", name),
            field: Some(name),
            ..Self::new(SchemaErrorCode::TableSchemaInvalid, "")
        }
    }

    /// A field declares a format its type cannot use
    pub fn unsupported_format(name: impl Into<String>, err: &CastError) -> Self {
        let name = name.into();
        Self {
            message: format!("field '{}': {}", name, err),
            field: Some(name),
            ..Self::new(SchemaErrorCode::TableSchemaInvalid, "")
        }
    }

    /// Create an error for a malformed schema document
    pub fn malformed_schema(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            SchemaErrorCode::TableSchemaMalformed,
            format!("malformed schema document '{}': {}", path.into(), reason.into()),
        )
    }

    /// Data header does not match the schema
    pub fn header_mismatch(missing: &[String], extra: &[String], duplicated: &[String]) -> Self {
        Self::new(
            SchemaErrorCode::TableHeaderMismatch,
            format!(
                "header does not match schema (missing: {:?}, extra: {:?}, duplicated: {:?})",
                missing, extra, duplicated
            ),
        )
    }

    /// A row failed structurally
    pub fn structural(err: StructuralError) -> Self {
        let row = match &err {
            StructuralError::RowWidth { row, .. } => Some(*row),
            _ => None,
        };
        let code = match &err {
            StructuralError::RowWidth { .. } => SchemaErrorCode::TableRowWidthMismatch,
            _ => SchemaErrorCode::TableHeaderMismatch,
        };
        Self {
            row,
            ..Self::new(code, err.to_string())
        }
    }

    /// A cell in `row` failed to cast or violated a constraint
    pub fn cell_failed(row: usize, failure: &CellFailure) -> Self {
        let code = match failure.kind {
            FailureKind::Cast(_) => SchemaErrorCode::TableCastFailed,
            FailureKind::Constraint(_) => SchemaErrorCode::TableConstraintViolated,
        };
        Self {
            field: Some(failure.field.clone()),
            row: Some(row),
            ..Self::new(code, format!("row {}: {}", row, failure))
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the field name if applicable
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Returns the data row if applicable
    pub fn row(&self) -> Option<usize> {
        self.row
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

impl From<ConstraintError> for SchemaError {
    fn from(err: ConstraintError) -> Self {
        let field = match &err {
            ConstraintError::NotApplicable { field, .. }
            | ConstraintError::InvalidPattern { field, .. }
            | ConstraintError::InvalidBound { field, .. }
            | ConstraintError::InvertedBounds { field, .. } => field.clone(),
        };
        Self {
            field: Some(field),
            ..Self::new(SchemaErrorCode::TableSchemaInvalid, err.to_string())
        }
    }
}

impl From<SourceError> for SchemaError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Security(e) => Self::new(SchemaErrorCode::TablePathRejected, e.to_string()),
            SourceError::Structural(e) => Self::structural(e),
            other => Self::new(SchemaErrorCode::TableSourceFailed, other.to_string()),
        }
    }
}

impl From<SecurityError> for SchemaError {
    fn from(err: SecurityError) -> Self {
        Self::new(SchemaErrorCode::TablePathRejected, err.to_string())
    }
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

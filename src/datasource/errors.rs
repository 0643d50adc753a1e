//! # Data Source Errors

use std::io;

use thiserror::Error;

use super::path::SecurityError;

/// Result type for data source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Table shape errors: the affected row (or the whole write) fails instead
/// of being padded, truncated or emitted on a wrong alignment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("row {row}: expected {expected} cells, found {found}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error(
        "output header does not match data columns (missing: {missing:?}, duplicated: {duplicated:?}, unknown: {unknown:?})"
    )]
    ColumnMismatch {
        missing: Vec<String>,
        duplicated: Vec<String>,
        unknown: Vec<String>,
    },

    #[error("header repeats column names: {0:?}")]
    DuplicateHeader(Vec<String>),

    #[error("expected {expected} header labels, found {found}")]
    LabelCount { expected: usize, found: usize },
}

/// Data source errors
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Security(#[from] SecurityError),

    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error fetching {url}: {reason}")]
    Http { url: String, reason: String },

    #[error("unsupported URL scheme: {0}")]
    UnsupportedUrl(String),

    #[error("unreadable archive {path}: {reason}")]
    Archive { path: String, reason: String },

    #[error("archive entry '{entry}' not found in {archive}")]
    EntryNotFound { archive: String, entry: String },

    #[error("invalid dialect: {0}")]
    InvalidDialect(String),
}

impl SourceError {
    pub(crate) fn io(path: impl Into<String>, source: io::Error) -> Self {
        SourceError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the failure is a containment violation
    pub fn is_security(&self) -> bool {
        matches!(self, SourceError::Security(_))
    }

    /// Whether one record failed to decode while the stream itself is intact,
    /// e.g. a row that is not valid UTF-8. Reading can carry on past it.
    pub fn is_record_decode(&self) -> bool {
        matches!(self, SourceError::Csv(e) if !e.is_io_error())
    }
}

//! Table validation against a data source
//!
//! `Schema::validate` streams rows and collects every violation into a
//! `ValidationReport`. Row-level structural failures become report entries;
//! failures to read the source abort the pass.

use serde::{Deserialize, Serialize};

use crate::constraints::ConstraintKind;
use crate::datasource::{StructuralError, TabularDataSource};
use crate::field::Value;
use crate::observability::{log_event, log_event_with_fields, Event};

use super::errors::{SchemaError, SchemaResult};
use super::session::{CellFailure, FailureKind, HeaderPolicy};
use super::types::Schema;

/// Stable classification of a report entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    CastFailed,
    ConstraintViolated,
    RowWidthMismatch,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::CastFailed => "CAST_FAILED",
            ErrorKind::ConstraintViolated => "CONSTRAINT_VIOLATED",
            ErrorKind::RowWidthMismatch => "ROW_WIDTH_MISMATCH",
        }
    }
}

/// One violation found during validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// 1-based data row, header excluded
    pub row: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<ConstraintKind>,
    pub message: String,
}

impl ReportEntry {
    fn from_failure(row: usize, failure: CellFailure) -> Self {
        let message = failure.to_string();
        let (kind, constraints) = match failure.kind {
            FailureKind::Cast(_) => (ErrorKind::CastFailed, Vec::new()),
            FailureKind::Constraint(kinds) => (ErrorKind::ConstraintViolated, kinds),
        };
        Self {
            row,
            field: Some(failure.field),
            kind,
            raw: Some(failure.raw),
            constraints,
            message,
        }
    }

    fn from_structural(row: usize, err: StructuralError) -> Self {
        Self {
            row,
            field: None,
            kind: ErrorKind::RowWidthMismatch,
            raw: None,
            constraints: Vec::new(),
            message: err.to_string(),
        }
    }
}

/// Outcome of a validation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub rows_checked: usize,
    pub entries: Vec<ReportEntry>,
    /// True when `fail_fast` stopped the pass at the first entry
    pub stopped_early: bool,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of entries of one kind
    pub fn count(&self, kind: ErrorKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }
}

/// Validation settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Stop at the first violation
    pub fail_fast: bool,
    pub header_policy: HeaderPolicy,
}

impl Schema {
    /// Validates every row of `source`.
    ///
    /// # Errors
    ///
    /// `TABLE_HEADER_MISMATCH` when the source header does not fit the
    /// schema, `TABLE_PATH_REJECTED` or `TABLE_SOURCE_FAILED` when the
    /// source cannot be read. Cell and row violations are not errors; they
    /// are returned in the report.
    pub fn validate(
        &self,
        source: &TabularDataSource,
        options: &ValidateOptions,
    ) -> SchemaResult<ValidationReport> {
        log_event(Event::ValidationBegin);

        let mut session = self.session(source.header()?, options.header_policy)?;
        let mut report = ValidationReport::default();

        for (idx, row) in source.rows()?.enumerate() {
            let row_number = idx + 1;
            let row = row?;
            report.rows_checked = row_number;

            match session.cast_row(&row) {
                Ok(cells) => report.entries.extend(
                    cells
                        .into_iter()
                        .filter_map(Result::err)
                        .map(|failure| ReportEntry::from_failure(row_number, failure)),
                ),
                Err(structural) => report
                    .entries
                    .push(ReportEntry::from_structural(row_number, structural)),
            }

            if options.fail_fast && !report.entries.is_empty() {
                report.entries.truncate(1);
                report.stopped_early = true;
                let row_text = row_number.to_string();
                log_event_with_fields(Event::ValidationFailFast, &[("row", row_text.as_str())]);
                break;
            }
        }

        let rows = report.rows_checked.to_string();
        let errors = report.error_count().to_string();
        log_event_with_fields(
            Event::ValidationComplete,
            &[("errors", errors.as_str()), ("rows", rows.as_str())],
        );
        Ok(report)
    }

    /// Casts every row of `source` into typed values.
    ///
    /// Loads the whole table into memory. The first failing cell or row
    /// aborts with its error.
    pub fn cast_table(&self, source: &TabularDataSource) -> SchemaResult<Vec<Vec<Value>>> {
        let mut session = self.session(source.header()?, HeaderPolicy::Strict)?;
        let mut table = Vec::new();

        for (idx, row) in source.rows()?.enumerate() {
            let cells = session
                .cast_row(&row?)
                .map_err(SchemaError::structural)?;
            let values = cells
                .into_iter()
                .collect::<Result<Vec<_>, _>>()
                .map_err(|failure| SchemaError::cell_failed(idx + 1, &failure))?;
            table.push(values);
        }

        Ok(table)
    }
}

//! Table schemas
//!
//! A schema describes the expected columns of a table and turns raw rows
//! into typed values.
//!
//! # Design Principles
//!
//! - Columns are matched to fields by name, never by position
//! - A row of the wrong width fails as a whole
//! - Cell failures are collected, not thrown
//! - Uniqueness state belongs to one validation session

mod errors;
mod loader;
mod output;
mod report;
mod session;
mod types;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult};
pub use loader::SchemaLoader;
pub use report::{ErrorKind, ReportEntry, ValidateOptions, ValidationReport};
pub use session::{CastResult, CellFailure, FailureKind, HeaderPolicy, ValidationSession};
pub use types::{HeaderCheck, Schema};

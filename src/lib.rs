//! tableschema - typed schemas for tabular data
//!
//! Describe the columns of a table, infer or check that description
//! against raw rows, cast cells into typed values, and read or write the
//! table without path traversal or column-order surprises.
//!
//! ```ignore
//! use tableschema::datasource::TabularDataSource;
//! use tableschema::inference::TypeInferrer;
//! use tableschema::schema::ValidateOptions;
//!
//! let source = TabularDataSource::from_file("people.csv", "/data");
//! let schema = TypeInferrer::default().infer_from_source(&source)?;
//! let report = schema.validate(&source, &ValidateOptions::default())?;
//! ```

pub mod cli;
pub mod config;
pub mod constraints;
pub mod datasource;
pub mod field;
pub mod inference;
pub mod observability;
pub mod schema;

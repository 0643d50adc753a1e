//! # Tabular Data Sources
//!
//! Raw header and row access for files, URLs, tar or zip members and inline text,
//! plus name-matched column reordering on write.
//!
//! Every file or archive path is resolved against the working root before
//! it is opened or created.

pub mod archive;
pub mod dialect;
pub mod errors;
pub mod path;
pub mod source;
pub mod writer;

pub use dialect::{Dialect, LineTerminator};
pub use errors::{SourceError, SourceResult, StructuralError};
pub use path::{PathResolver, ResolvedPath, SecurityError};
pub use source::{Origin, RowIter, TabularDataSource};
pub use writer::{column_permutation, ColumnPolicy};

//! Writing a source in schema field order
//!
//! Data columns are matched to fields by name. The header row carries each
//! field's output name, which differs from the field name only when a
//! header-name override is set.

use std::io::Write;
use std::path::Path;

use crate::datasource::TabularDataSource;

use super::errors::SchemaResult;
use super::types::Schema;

impl Schema {
    /// Writes every row of `source` to `out` with columns in field order.
    ///
    /// # Errors
    ///
    /// `TABLE_HEADER_MISMATCH` unless every data column names exactly one
    /// field, `TABLE_ROW_WIDTH_MISMATCH` for a ragged row.
    pub fn write<W: Write>(&self, source: &TabularDataSource, out: W) -> SchemaResult<usize> {
        Ok(source.write_labeled(out, &self.headers(), &self.output_headers())?)
    }

    /// Like `write`, into a file inside the source's working root. A failed
    /// write leaves `path` untouched.
    pub fn write_to_path(&self, source: &TabularDataSource, path: impl AsRef<Path>) -> SchemaResult<usize> {
        Ok(source.write_labeled_to_path(path, &self.headers(), &self.output_headers())?)
    }
}

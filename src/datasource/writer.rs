//! Writing rows with columns reordered by name
//!
//! The output header decides column order. Each data column is mapped to
//! its output position by exact name match, so the source's natural order
//! never leaks into the output.

use std::collections::HashMap;
use std::io::Write;

use super::dialect::Dialect;
use super::errors::{SourceError, SourceResult, StructuralError};

/// How strictly the output header must cover the data columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnPolicy {
    /// Every data column appears exactly once in the output header
    #[default]
    Exact,
    /// The output header may leave data columns out (explicit projection)
    Subset,
}

/// Maps each data column position to its output position.
///
/// `None` marks a column dropped under `ColumnPolicy::Subset`.
///
/// # Errors
///
/// `StructuralError::DuplicateHeader` if the data header repeats a name,
/// `StructuralError::ColumnMismatch` if the output header repeats a name,
/// names a column the data does not have, or (under `Exact`) omits one.
pub fn column_permutation(
    data_header: &[String],
    output_header: &[String],
    policy: ColumnPolicy,
) -> Result<Vec<Option<usize>>, StructuralError> {
    let repeated = |names: &[String]| {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for name in names {
            *counts.entry(name.as_str()).or_default() += 1;
        }
        let mut repeated: Vec<String> = names
            .iter()
            .filter(|n| counts[n.as_str()] > 1)
            .cloned()
            .collect();
        repeated.sort();
        repeated.dedup();
        repeated
    };

    let data_dupes = repeated(data_header);
    if !data_dupes.is_empty() {
        return Err(StructuralError::DuplicateHeader(data_dupes));
    }

    let output_positions: HashMap<&str, usize> = output_header
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    let duplicated = repeated(output_header);
    let unknown: Vec<String> = output_header
        .iter()
        .filter(|name| !data_header.contains(name))
        .cloned()
        .collect();
    let missing: Vec<String> = match policy {
        ColumnPolicy::Exact => data_header
            .iter()
            .filter(|name| !output_positions.contains_key(name.as_str()))
            .cloned()
            .collect(),
        ColumnPolicy::Subset => Vec::new(),
    };

    if !missing.is_empty() || !duplicated.is_empty() || !unknown.is_empty() {
        return Err(StructuralError::ColumnMismatch {
            missing,
            duplicated,
            unknown,
        });
    }

    Ok(data_header
        .iter()
        .map(|name| output_positions.get(name.as_str()).copied())
        .collect())
}

/// Writes `rows` (in data column order) through the `csv` writer, permuted
/// to `output_header`.
///
/// The header row carries `labels` when given (one per output column), so
/// columns can be matched by one name and published under another. Rows
/// are streamed; a row whose width differs from the data header fails the
/// write. Returns the number of data rows written.
pub fn write_rows<W, I>(
    out: W,
    dialect: &Dialect,
    data_header: &[String],
    output_header: &[String],
    labels: Option<&[String]>,
    policy: ColumnPolicy,
    rows: I,
) -> SourceResult<usize>
where
    W: Write,
    I: IntoIterator<Item = SourceResult<Vec<String>>>,
{
    let permutation = column_permutation(data_header, output_header, policy)?;
    let labels = match labels {
        Some(labels) if labels.len() != output_header.len() => {
            return Err(StructuralError::LabelCount {
                expected: output_header.len(),
                found: labels.len(),
            }
            .into());
        }
        Some(labels) => labels,
        None => output_header,
    };

    let mut writer = dialect.writer_builder().from_writer(out);
    if dialect.has_header {
        writer.write_record(labels)?;
    }

    let mut written = 0usize;
    for (idx, row) in rows.into_iter().enumerate() {
        let row = row?;
        if row.len() != permutation.len() {
            return Err(StructuralError::RowWidth {
                row: idx + 1,
                expected: permutation.len(),
                found: row.len(),
            }
            .into());
        }

        let mut sorted = vec![String::new(); output_header.len()];
        for (cell, target) in row.into_iter().zip(&permutation) {
            if let Some(pos) = target {
                sorted[*pos] = cell;
            }
        }
        writer.write_record(&sorted)?;
        written += 1;
    }

    writer
        .flush()
        .map_err(|e| SourceError::io("<output>", e))?;
    Ok(written)
}

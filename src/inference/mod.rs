//! Type inference
//!
//! Builds a schema from a header and a bounded sample of raw rows. Each
//! column gets the most specific type that accepts enough of its sampled
//! cells. Inference never fails on the data itself: the worst outcome is a
//! schema of string columns.

mod candidate;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::datasource::TabularDataSource;
use crate::field::{CastOptions, Field};
use crate::observability::{log_event_with_fields, Event};
use crate::schema::{Schema, SchemaResult};

pub use candidate::{TypeCandidate, PRIORITY};

/// Default number of rows sampled per inference
pub const DEFAULT_SAMPLE_ROWS: usize = 100;

/// Inference settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InferOptions {
    /// Upper bound on rows read from the source
    pub sample_rows: usize,
    /// Share of non-missing cells a type must accept, in `(0, 1]`
    pub confidence: f64,
    /// Raw cells ignored while tallying
    pub missing_values: Vec<String>,
}

impl Default for InferOptions {
    fn default() -> Self {
        Self {
            sample_rows: DEFAULT_SAMPLE_ROWS,
            confidence: 1.0,
            missing_values: vec![String::new()],
        }
    }
}

/// Infers column types from sample rows
#[derive(Debug, Clone, Default)]
pub struct TypeInferrer {
    options: InferOptions,
    cast_options: CastOptions,
}

impl TypeInferrer {
    pub fn new(options: InferOptions) -> Self {
        Self {
            options,
            cast_options: CastOptions::default(),
        }
    }

    pub fn options(&self) -> &InferOptions {
        &self.options
    }

    /// Infers a schema from `header` and at most `sample_rows` of `rows`.
    ///
    /// Cells beyond the header width are ignored and short rows contribute
    /// only the cells they have. Empty or repeated header names are
    /// replaced so the resulting field names are unique.
    pub fn infer<I>(&self, header: &[String], rows: I) -> Schema
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let mut candidates = vec![TypeCandidate::new(); header.len()];
        let mut sampled = 0usize;

        for row in rows.into_iter().take(self.options.sample_rows) {
            sampled += 1;
            for (candidate, cell) in candidates.iter_mut().zip(&row) {
                if self.is_missing(cell) {
                    continue;
                }
                candidate.update(cell, &self.cast_options);
            }
        }

        let confidence = self.effective_confidence();
        let fields: Vec<Field> = unique_names(header)
            .into_iter()
            .zip(&candidates)
            .map(|(name, candidate)| Field::new(name, candidate.decide(confidence)))
            .collect();

        let columns = fields.len().to_string();
        let rows = sampled.to_string();
        log_event_with_fields(
            Event::InferComplete,
            &[("columns", columns.as_str()), ("rows", rows.as_str())],
        );

        Schema::unconstrained(fields).with_missing_values(self.options.missing_values.clone())
    }

    /// Infers a schema from the header and first rows of `source`.
    ///
    /// Only the sampled rows are read. A row that cannot be decoded is left
    /// out of the sample; errors come from opening or reading the source,
    /// never from the data.
    pub fn infer_from_source(&self, source: &TabularDataSource) -> SchemaResult<Schema> {
        let origin = source.origin().to_string();
        log_event_with_fields(Event::InferBegin, &[("origin", origin.as_str())]);

        let header = source.header()?;
        let mut sample = Vec::with_capacity(self.options.sample_rows.min(1024));
        for row in source.rows()?.take(self.options.sample_rows) {
            match row {
                Ok(row) => sample.push(row),
                Err(e) if e.is_record_decode() => {
                    let reason = e.to_string();
                    log_event_with_fields(Event::InferRowSkipped, &[("reason", reason.as_str())]);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(self.infer(header, sample))
    }

    fn is_missing(&self, cell: &str) -> bool {
        self.options.missing_values.iter().any(|m| m == cell)
    }

    /// Confidence outside `(0, 1]` falls back to requiring every cell.
    fn effective_confidence(&self) -> f64 {
        let c = self.options.confidence;
        if c > 0.0 && c <= 1.0 {
            c
        } else {
            1.0
        }
    }
}

/// Replaces empty names with `fieldN` and suffixes repeats with `_N`.
fn unique_names(header: &[String]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    header
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let base = if name.is_empty() {
                format!("field{}", idx + 1)
            } else {
                name.clone()
            };
            let mut candidate = base.clone();
            let mut n = 2;
            while !taken.insert(candidate.clone()) {
                candidate = format!("{}_{}", base, n);
                n += 1;
            }
            candidate
        })
        .collect()
}

//! Per-column tallies of which field types accept each sampled cell

use crate::field::{CastOptions, FieldType};

/// Candidate types, most specific first. `String` accepts everything and
/// is always last.
pub const PRIORITY: [FieldType; 11] = [
    FieldType::Integer,
    FieldType::Number,
    FieldType::Boolean,
    FieldType::Date,
    FieldType::Time,
    FieldType::DateTime,
    FieldType::YearMonth,
    FieldType::GeoPoint,
    FieldType::Object,
    FieldType::Array,
    FieldType::String,
];

/// Success counts for one column
#[derive(Debug, Clone, Default)]
pub struct TypeCandidate {
    non_empty: usize,
    successes: [usize; PRIORITY.len()],
}

impl TypeCandidate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one non-missing cell.
    pub fn update(&mut self, value: &str, options: &CastOptions) {
        self.non_empty += 1;
        for (count, field_type) in self.successes.iter_mut().zip(PRIORITY) {
            if field_type.parse(value, None, options).is_ok() {
                *count += 1;
            }
        }
    }

    pub fn non_empty(&self) -> usize {
        self.non_empty
    }

    /// Picks the first type in priority order whose success ratio reaches
    /// `confidence`. Columns with no values are strings.
    pub fn decide(&self, confidence: f64) -> FieldType {
        if self.non_empty == 0 {
            return FieldType::String;
        }
        let total = self.non_empty as f64;
        PRIORITY
            .iter()
            .zip(self.successes)
            .find(|(_, count)| *count as f64 / total >= confidence)
            .map(|(field_type, _)| *field_type)
            .unwrap_or(FieldType::String)
    }
}

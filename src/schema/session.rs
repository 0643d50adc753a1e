//! Validation sessions
//!
//! A session is one pass over a table. It borrows the schema, owns the
//! name-matched column map and all cross-row state (unique values, primary
//! keys, row counter). Two sessions on the same schema never see each
//! other's rows.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constraints::{ConstraintKind, UniqueTracker};
use crate::datasource::StructuralError;
use crate::field::{CastError, Field, Value};

use super::errors::{SchemaError, SchemaResult};
use super::types::Schema;

/// How a data header may differ from the schema field names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HeaderPolicy {
    /// Header names and schema fields must match one to one
    #[default]
    Strict,
    /// Columns no field declares are skipped; missing fields still fail
    IgnoreExtra,
}

/// Why one cell was rejected
#[derive(Debug, Clone, PartialEq)]
pub enum FailureKind {
    Cast(CastError),
    Constraint(Vec<ConstraintKind>),
}

/// A rejected cell
#[derive(Debug, Clone, PartialEq)]
pub struct CellFailure {
    pub field: String,
    pub raw: String,
    pub kind: FailureKind,
}

impl CellFailure {
    pub(crate) fn cast(field: &Field, raw: &str, err: CastError) -> Self {
        Self {
            field: field.name.clone(),
            raw: raw.to_string(),
            kind: FailureKind::Cast(err),
        }
    }

    fn constraint(field: &Field, raw: &str, violated: Vec<ConstraintKind>) -> Self {
        Self {
            field: field.name.clone(),
            raw: raw.to_string(),
            kind: FailureKind::Constraint(violated),
        }
    }
}

impl fmt::Display for CellFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FailureKind::Cast(e) => write!(f, "field '{}': {}", self.field, e),
            FailureKind::Constraint(kinds) => {
                let names: Vec<&str> = kinds.iter().map(ConstraintKind::as_str).collect();
                write!(
                    f,
                    "field '{}': value '{}' violates {}",
                    self.field,
                    self.raw,
                    names.join(", ")
                )
            }
        }
    }
}

/// Outcome of casting one cell
pub type CastResult = Result<Value, CellFailure>;

/// One validation pass over rows sharing a header
#[derive(Debug)]
pub struct ValidationSession<'a> {
    schema: &'a Schema,
    /// Raw column position of each schema field
    columns: Vec<usize>,
    width: usize,
    unique: UniqueTracker,
    primary_keys: HashSet<String>,
    rows: usize,
}

impl Schema {
    /// Starts a validation pass for rows laid out as `header`.
    ///
    /// # Errors
    ///
    /// `TABLE_HEADER_MISMATCH` if the header repeats a name, lacks a
    /// schema field, or (under `HeaderPolicy::Strict`) has extra columns.
    pub fn session(&self, header: &[String], policy: HeaderPolicy) -> SchemaResult<ValidationSession<'_>> {
        let check = self.validate_header(header);
        let extra_fails = policy == HeaderPolicy::Strict && !check.extra.is_empty();
        if !check.missing.is_empty() || !check.duplicated.is_empty() || extra_fails {
            let extra: &[String] = if extra_fails { &check.extra } else { &[] };
            return Err(SchemaError::header_mismatch(
                &check.missing,
                extra,
                &check.duplicated,
            ));
        }

        let columns = self
            .fields()
            .iter()
            .filter_map(|field| header.iter().position(|name| *name == field.name))
            .collect();

        Ok(ValidationSession {
            schema: self,
            columns,
            width: header.len(),
            unique: UniqueTracker::new(),
            primary_keys: HashSet::new(),
            rows: 0,
        })
    }

    /// Casts a single row against `header` in a fresh session.
    ///
    /// Unique and primary key checks only see this one row.
    pub fn cast_row(&self, header: &[String], raw: &[String]) -> SchemaResult<Vec<CastResult>> {
        self.session(header, HeaderPolicy::Strict)?
            .cast_row(raw)
            .map_err(SchemaError::structural)
    }
}

impl<'a> ValidationSession<'a> {
    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// Rows seen so far, including rejected ones
    pub fn rows_seen(&self) -> usize {
        self.rows
    }

    /// Casts and checks one raw row.
    ///
    /// Results are in schema field order. A row whose width differs from
    /// the header fails as a whole and produces no cell results.
    pub fn cast_row(&mut self, raw: &[String]) -> Result<Vec<CastResult>, StructuralError> {
        self.rows += 1;
        if raw.len() != self.width {
            return Err(StructuralError::RowWidth {
                row: self.rows,
                expected: self.width,
                found: raw.len(),
            });
        }

        let schema = self.schema;
        let key_fields = schema.primary_key();
        let mut key_parts: Vec<Option<String>> = Vec::with_capacity(key_fields.len());
        let mut results = Vec::with_capacity(schema.fields().len());

        for (slot, (field, checks)) in schema.fields().iter().zip(schema.checks()).enumerate() {
            let cell = raw[self.columns[slot]].as_str();

            let value = if schema.is_missing(cell) {
                Value::Null
            } else {
                match field.cast(cell) {
                    Ok(value) => value,
                    Err(e) => {
                        results.push(Err(CellFailure::cast(field, cell, e)));
                        if key_fields.contains(&field.name) {
                            key_parts.push(None);
                        }
                        continue;
                    }
                }
            };

            let mut violated = checks.check(&value, cell);
            let in_key = key_fields.contains(&field.name);

            if value.is_null() {
                if in_key && !violated.contains(&ConstraintKind::Required) {
                    violated.push(ConstraintKind::Required);
                }
            } else if checks.is_unique() {
                let key = canonical_text(field, &value, cell);
                if self.unique.observe(slot, key) {
                    violated.push(ConstraintKind::Unique);
                }
            }

            if in_key {
                key_parts.push((!value.is_null()).then(|| canonical_text(field, &value, cell)));
            }

            if violated.is_empty() {
                results.push(Ok(value));
            } else {
                results.push(Err(CellFailure::constraint(field, cell, violated)));
            }
        }

        if !key_fields.is_empty() {
            self.check_primary_key(key_parts, raw, &mut results);
        }

        Ok(results)
    }

    /// Marks the first key field when the full key was seen before.
    /// Keys with a missing or uncastable part are not recorded.
    fn check_primary_key(
        &mut self,
        parts: Vec<Option<String>>,
        raw: &[String],
        results: &mut [CastResult],
    ) {
        let Some(parts) = parts.into_iter().collect::<Option<Vec<String>>>() else {
            return;
        };
        let key = serde_json::to_string(&parts).unwrap_or_else(|_| parts.join("\u{1f}"));
        if self.primary_keys.insert(key) {
            return;
        }

        let schema = self.schema;
        let Some(slot) = schema
            .fields()
            .iter()
            .position(|f| schema.primary_key().first() == Some(&f.name))
        else {
            return;
        };
        let field = &schema.fields()[slot];
        let cell = raw[self.columns[slot]].as_str();

        results[slot] = match std::mem::replace(&mut results[slot], Ok(Value::Null)) {
            Ok(_) => Err(CellFailure::constraint(field, cell, vec![ConstraintKind::PrimaryKey])),
            Err(mut failure) => {
                if let FailureKind::Constraint(kinds) = &mut failure.kind {
                    kinds.push(ConstraintKind::PrimaryKey);
                }
                Err(failure)
            }
        };
    }
}

/// Uniqueness key for a value: its formatted text, falling back to the raw
/// cell when the value cannot be formatted back.
fn canonical_text(field: &Field, value: &Value, raw: &str) -> String {
    field.format_value(value).unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::Constraints;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn id_name_schema() -> Schema {
        Schema::new(vec![Field::integer("id"), Field::string("name")]).unwrap()
    }

    #[test]
    fn test_single_cast_failure() {
        let schema = id_name_schema();
        let results = schema
            .cast_row(&names(&["id", "name"]), &names(&["abc", "X"]))
            .unwrap();

        assert_eq!(results.len(), 2);
        let failure = results[0].as_ref().unwrap_err();
        assert_eq!(failure.field, "id");
        assert_eq!(failure.raw, "abc");
        assert!(matches!(failure.kind, FailureKind::Cast(_)));
        assert_eq!(results[1], Ok(Value::String("X".into())));
    }

    #[test]
    fn test_results_follow_schema_order() {
        let schema = id_name_schema();
        let results = schema
            .cast_row(&names(&["name", "id"]), &names(&["X", "7"]))
            .unwrap();
        assert_eq!(results[0], Ok(Value::Integer(7)));
        assert_eq!(results[1], Ok(Value::String("X".into())));
    }

    #[test]
    fn test_width_mismatch_has_no_partial_results() {
        let schema = id_name_schema();
        let mut session = schema.session(&names(&["id", "name"]), HeaderPolicy::Strict).unwrap();

        let err = session.cast_row(&names(&["1"])).unwrap_err();
        assert_eq!(
            err,
            StructuralError::RowWidth {
                row: 1,
                expected: 2,
                found: 1
            }
        );
        assert!(session.cast_row(&names(&["1", "a", "extra"])).is_err());
        assert_eq!(session.rows_seen(), 2);
    }

    #[test]
    fn test_unique_fails_on_second_occurrence_only() {
        let schema = Schema::new(vec![
            Field::integer("id").with_constraints(Constraints::unique())
        ])
        .unwrap();
        let mut session = schema.session(&names(&["id"]), HeaderPolicy::Strict).unwrap();

        assert!(session.cast_row(&names(&["1"])).unwrap()[0].is_ok());
        assert!(session.cast_row(&names(&["2"])).unwrap()[0].is_ok());
        let second = session.cast_row(&names(&["1"])).unwrap();
        assert_eq!(
            second[0].as_ref().unwrap_err().kind,
            FailureKind::Constraint(vec![ConstraintKind::Unique])
        );
        // A third occurrence fails too
        assert!(session.cast_row(&names(&["1"])).unwrap()[0].is_err());
    }

    #[test]
    fn test_unique_uses_canonical_value() {
        let schema = Schema::new(vec![
            Field::number("n").with_constraints(Constraints::unique())
        ])
        .unwrap();
        let mut session = schema.session(&names(&["n"]), HeaderPolicy::Strict).unwrap();
        assert!(session.cast_row(&names(&["1.0"])).unwrap()[0].is_ok());
        assert!(session.cast_row(&names(&["1"])).unwrap()[0].is_err());
    }

    #[test]
    fn test_sessions_are_independent() {
        let schema = Schema::new(vec![
            Field::integer("id").with_constraints(Constraints::unique())
        ])
        .unwrap();
        let header = names(&["id"]);
        let mut first = schema.session(&header, HeaderPolicy::Strict).unwrap();
        let mut second = schema.session(&header, HeaderPolicy::Strict).unwrap();

        assert!(first.cast_row(&names(&["1"])).unwrap()[0].is_ok());
        assert!(second.cast_row(&names(&["1"])).unwrap()[0].is_ok());
    }

    #[test]
    fn test_missing_values_are_null_and_skip_unique() {
        let schema = Schema::new(vec![
            Field::integer("id").with_constraints(Constraints::unique())
        ])
        .unwrap()
        .with_missing_values(names(&["", "NA"]));
        let mut session = schema.session(&names(&["id"]), HeaderPolicy::Strict).unwrap();

        assert_eq!(session.cast_row(&names(&["NA"])).unwrap()[0], Ok(Value::Null));
        assert_eq!(session.cast_row(&names(&[""])).unwrap()[0], Ok(Value::Null));
    }

    #[test]
    fn test_required_fails_on_missing() {
        let schema = Schema::new(vec![
            Field::string("name").with_constraints(Constraints::required())
        ])
        .unwrap();
        let results = schema.cast_row(&names(&["name"]), &names(&[""])).unwrap();
        assert_eq!(
            results[0].as_ref().unwrap_err().kind,
            FailureKind::Constraint(vec![ConstraintKind::Required])
        );
    }

    #[test]
    fn test_header_policy() {
        let schema = id_name_schema();
        let header = names(&["id", "name", "note"]);

        assert!(schema.session(&header, HeaderPolicy::Strict).is_err());

        let mut session = schema.session(&header, HeaderPolicy::IgnoreExtra).unwrap();
        let results = session.cast_row(&names(&["1", "a", "ignored"])).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(Result::is_ok));

        let err = schema
            .session(&names(&["id"]), HeaderPolicy::IgnoreExtra)
            .unwrap_err();
        assert_eq!(err.code().code(), "TABLE_HEADER_MISMATCH");
    }

    #[test]
    fn test_composite_primary_key() {
        let schema = Schema::new(vec![Field::string("a"), Field::integer("b")])
            .unwrap()
            .with_primary_key(names(&["a", "b"]))
            .unwrap();
        let mut session = schema.session(&names(&["a", "b"]), HeaderPolicy::Strict).unwrap();

        assert!(session.cast_row(&names(&["x", "1"])).unwrap().iter().all(Result::is_ok));
        assert!(session.cast_row(&names(&["x", "2"])).unwrap().iter().all(Result::is_ok));

        let dup = session.cast_row(&names(&["x", "1"])).unwrap();
        assert_eq!(
            dup[0].as_ref().unwrap_err().kind,
            FailureKind::Constraint(vec![ConstraintKind::PrimaryKey])
        );
        assert!(dup[1].is_ok());

        let missing = session.cast_row(&names(&["", "3"])).unwrap();
        assert_eq!(
            missing[0].as_ref().unwrap_err().kind,
            FailureKind::Constraint(vec![ConstraintKind::Required])
        );
    }

    #[test]
    fn test_failure_display() {
        let schema = id_name_schema();
        let results = schema
            .cast_row(&names(&["id", "name"]), &names(&["abc", "X"]))
            .unwrap();
        let message = results[0].as_ref().unwrap_err().to_string();
        assert!(message.contains("field 'id'"));
        assert!(message.contains("abc"));
    }
}

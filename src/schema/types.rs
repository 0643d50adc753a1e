//! Schema type definitions
//!
//! A `Schema` is an ordered list of uniquely named fields plus the table
//! level settings: missing-value markers and an optional primary key.
//! Constraints are compiled once when the schema is built.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::constraints::ConstraintSet;
use crate::datasource::StructuralError;
use crate::field::{Field, Value};

use super::errors::{SchemaError, SchemaResult};
use super::session::CellFailure;

fn default_missing_values() -> Vec<String> {
    vec![String::new()]
}

/// Primary key as written in a document: one name or a list of names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum PrimaryKeyDecl {
    One(String),
    Many(Vec<String>),
}

impl From<PrimaryKeyDecl> for Vec<String> {
    fn from(decl: PrimaryKeyDecl) -> Self {
        match decl {
            PrimaryKeyDecl::One(name) => vec![name],
            PrimaryKeyDecl::Many(names) => names,
        }
    }
}

/// Serialized form of a schema document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaDescriptor {
    fields: Vec<Field>,
    #[serde(default = "default_missing_values")]
    missing_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    primary_key: Option<PrimaryKeyDecl>,
}

/// A validated table schema
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SchemaDescriptor", into = "SchemaDescriptor")]
pub struct Schema {
    fields: Vec<Field>,
    checks: Vec<ConstraintSet>,
    missing_values: Vec<String>,
    primary_key: Vec<String>,
}

/// Result of comparing a raw header with the schema field names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderCheck {
    /// Schema fields absent from the header
    pub missing: Vec<String>,
    /// Header names no field declares
    pub extra: Vec<String>,
    /// Header names that appear more than once
    pub duplicated: Vec<String>,
}

impl HeaderCheck {
    pub fn is_ok(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty() && self.duplicated.is_empty()
    }
}

impl Schema {
    /// Builds a schema from `fields`.
    ///
    /// # Errors
    ///
    /// `TABLE_SCHEMA_INVALID` if two fields share a name, a field declares
    /// a format its type cannot use, or a field's constraints do not
    /// compile.
    pub fn new(fields: Vec<Field>) -> SchemaResult<Self> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::duplicate_field(&field.name));
            }
            field
                .field_type
                .check_format(field.format.as_deref())
                .map_err(|e| SchemaError::unsupported_format(&field.name, &e))?;
        }

        let checks = fields
            .iter()
            .map(ConstraintSet::compile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            fields,
            checks,
            missing_values: default_missing_values(),
            primary_key: Vec::new(),
        })
    }

    /// Builds a schema whose fields carry no constraints.
    ///
    /// Field names must already be unique.
    pub(crate) fn unconstrained(fields: Vec<Field>) -> Self {
        debug_assert!(fields.iter().all(|f| f.constraints.is_empty()));
        Self {
            checks: vec![ConstraintSet::default(); fields.len()],
            fields,
            missing_values: default_missing_values(),
            primary_key: Vec::new(),
        }
    }

    /// Replaces the raw markers that cast to `Value::Null`.
    pub fn with_missing_values(mut self, missing_values: Vec<String>) -> Self {
        self.missing_values = missing_values;
        self
    }

    /// Sets the primary key. Every key field is then required and the key
    /// tuple must be unique across the table.
    pub fn with_primary_key(mut self, names: Vec<String>) -> SchemaResult<Self> {
        for name in &names {
            if self.field(name).is_none() {
                return Err(SchemaError::unknown_key_field(name));
            }
        }
        self.primary_key = names;
        Ok(self)
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Looks up a field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn missing_values(&self) -> &[String] {
        &self.missing_values
    }

    pub fn primary_key(&self) -> &[String] {
        &self.primary_key
    }

    pub(crate) fn checks(&self) -> &[ConstraintSet] {
        &self.checks
    }

    /// Whether `raw` is one of the missing-value markers
    pub fn is_missing(&self, raw: &str) -> bool {
        self.missing_values.iter().any(|m| m == raw)
    }

    /// Field names in schema order
    pub fn headers(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// Output names in schema order, honouring header-name overrides
    pub fn output_headers(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.header_name().to_string()).collect()
    }

    /// Compares `raw_header` with the field names, by name.
    pub fn validate_header(&self, raw_header: &[String]) -> HeaderCheck {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for name in raw_header {
            *counts.entry(name.as_str()).or_default() += 1;
        }

        let missing = self
            .fields
            .iter()
            .filter(|f| !counts.contains_key(f.name.as_str()))
            .map(|f| f.name.clone())
            .collect();

        let mut extra = Vec::new();
        let mut duplicated = Vec::new();
        let mut reported = HashSet::new();
        for name in raw_header {
            if !reported.insert(name.as_str()) {
                continue;
            }
            if self.field(name).is_none() {
                extra.push(name.clone());
            }
            if counts[name.as_str()] > 1 {
                duplicated.push(name.clone());
            }
        }

        HeaderCheck {
            missing,
            extra,
            duplicated,
        }
    }

    /// Formats one typed row (schema order) back to raw text.
    ///
    /// `Value::Null` becomes the first missing-value marker.
    pub fn format_row(&self, values: &[Value]) -> SchemaResult<Vec<String>> {
        if values.len() != self.fields.len() {
            return Err(SchemaError::structural(StructuralError::RowWidth {
                row: 0,
                expected: self.fields.len(),
                found: values.len(),
            }));
        }

        let null_marker = self.missing_values.first().cloned().unwrap_or_default();
        self.fields
            .iter()
            .zip(values)
            .map(|(field, value)| match value {
                Value::Null => Ok(null_marker.clone()),
                other => field
                    .format_value(other)
                    .map_err(|e| SchemaError::cell_failed(0, &CellFailure::cast(field, "", e))),
            })
            .collect()
    }
}

impl TryFrom<SchemaDescriptor> for Schema {
    type Error = SchemaError;

    fn try_from(descriptor: SchemaDescriptor) -> SchemaResult<Self> {
        let schema = Schema::new(descriptor.fields)?.with_missing_values(descriptor.missing_values);
        match descriptor.primary_key {
            Some(decl) => schema.with_primary_key(decl.into()),
            None => Ok(schema),
        }
    }
}

impl From<Schema> for SchemaDescriptor {
    fn from(schema: Schema) -> Self {
        let primary_key = match schema.primary_key.len() {
            0 => None,
            1 => schema.primary_key.into_iter().next().map(PrimaryKeyDecl::One),
            _ => Some(PrimaryKeyDecl::Many(schema.primary_key)),
        };
        Self {
            fields: schema.fields,
            missing_values: schema.missing_values,
            primary_key,
        }
    }
}

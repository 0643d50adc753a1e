//! Field type definitions
//!
//! Supported types:
//! - string, integer, number, boolean
//! - date, time, datetime, year, yearmonth
//! - geopoint, object, array
//! - any

use serde::{Deserialize, Serialize};

use crate::constraints::Constraints;

use super::errors::CastResult;
use super::value::Value;

/// Logical type of a column. Closed set; dispatch is by tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    Integer,
    Number,
    Boolean,
    Date,
    Time,
    DateTime,
    Year,
    YearMonth,
    GeoPoint,
    Object,
    Array,
    Any,
}

impl FieldType {
    /// Returns the type name as written in schema documents
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::DateTime => "datetime",
            FieldType::Year => "year",
            FieldType::YearMonth => "yearmonth",
            FieldType::GeoPoint => "geopoint",
            FieldType::Object => "object",
            FieldType::Array => "array",
            FieldType::Any => "any",
        }
    }

    /// Whether `minimum`/`maximum` make sense for this type
    pub fn is_ordered(&self) -> bool {
        matches!(
            self,
            FieldType::Integer
                | FieldType::Number
                | FieldType::Date
                | FieldType::Time
                | FieldType::DateTime
                | FieldType::Year
                | FieldType::YearMonth
        )
    }

    /// Whether `minLength`/`maxLength` make sense for this type
    pub fn has_length(&self) -> bool {
        matches!(
            self,
            FieldType::String | FieldType::Array | FieldType::Object
        )
    }
}

/// Type-specific parsing knobs carried by a field descriptor.
///
/// Boolean tokens are matched exactly (case-sensitive); case variants are
/// accepted only when listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CastOptions {
    pub true_values: Vec<String>,
    pub false_values: Vec<String>,
    /// When false, leading/trailing non-numeric text ("$", "%") is stripped
    pub bare_number: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_char: Option<char>,
    pub decimal_char: char,
}

impl Default for CastOptions {
    fn default() -> Self {
        Self {
            true_values: vec!["true".into(), "True".into(), "TRUE".into(), "1".into()],
            false_values: vec!["false".into(), "False".into(), "FALSE".into(), "0".into()],
            bare_number: true,
            group_char: None,
            decimal_char: '.',
        }
    }
}

/// A typed column descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Constraints::is_empty")]
    pub constraints: Constraints,
    #[serde(flatten)]
    pub options: CastOptions,
    /// Output-only alias; never affects casting
    #[serde(skip)]
    header_name: Option<String>,
}

impl Field {
    /// Create a field with default format, options and no constraints
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            format: None,
            title: None,
            description: None,
            constraints: Constraints::default(),
            options: CastOptions::default(),
            header_name: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Integer)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Date)
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_options(mut self, options: CastOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the name this field is written under on output.
    pub fn with_header_name(mut self, header: impl Into<String>) -> Self {
        self.header_name = Some(header.into());
        self
    }

    /// Name used in output headers: the override if set, else `name`.
    pub fn header_name(&self) -> &str {
        self.header_name.as_deref().unwrap_or(&self.name)
    }

    /// Parses a raw cell with this field's type, format and options.
    pub fn cast(&self, raw: &str) -> CastResult<Value> {
        self.field_type
            .parse(raw, self.format.as_deref(), &self.options)
    }

    /// Formats a value so that `cast(format_value(v)) == v`.
    pub fn format_value(&self, value: &Value) -> CastResult<String> {
        self.field_type
            .format(value, self.format.as_deref(), &self.options)
    }
}

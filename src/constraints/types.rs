//! Declared constraints as they appear in a schema document

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Kinds of constraint a cast value can violate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConstraintKind {
    Required,
    Unique,
    Minimum,
    Maximum,
    Pattern,
    Enum,
    MinLength,
    MaxLength,
    /// Schema-level: the primary key value was seen before
    PrimaryKey,
}

impl ConstraintKind {
    /// Returns the key used in schema documents
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintKind::Required => "required",
            ConstraintKind::Unique => "unique",
            ConstraintKind::Minimum => "minimum",
            ConstraintKind::Maximum => "maximum",
            ConstraintKind::Pattern => "pattern",
            ConstraintKind::Enum => "enum",
            ConstraintKind::MinLength => "minLength",
            ConstraintKind::MaxLength => "maxLength",
            ConstraintKind::PrimaryKey => "primaryKey",
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Constraint declarations on one field.
///
/// Bounds stay as raw JSON here; `ConstraintSet::compile` casts them with
/// the owning field so that, e.g., a date minimum is compared as a date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<JsonValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl Constraints {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    pub fn unique() -> Self {
        Self {
            unique: true,
            ..Self::default()
        }
    }

    pub fn with_required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn with_minimum(mut self, bound: impl Into<JsonValue>) -> Self {
        self.minimum = Some(bound.into());
        self
    }

    pub fn with_maximum(mut self, bound: impl Into<JsonValue>) -> Self {
        self.maximum = Some(bound.into());
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_enum(mut self, values: Vec<JsonValue>) -> Self {
        self.enum_values = Some(values);
        self
    }

    pub fn with_length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }
}

//! Compiled per-field constraint checks

use std::cmp::Ordering;

use regex::Regex;
use serde_json::Value as JsonValue;

use crate::field::{Field, FieldType, Value};

use super::errors::ConstraintError;
use super::types::ConstraintKind;

/// Constraints of one field with bounds cast to the field's own type.
///
/// `check` is a pure function of one value. Uniqueness needs table
/// context and is tracked by `UniqueTracker` instead.
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    required: bool,
    unique: bool,
    minimum: Option<Value>,
    maximum: Option<Value>,
    pattern: Option<Regex>,
    enum_values: Option<Vec<Value>>,
    min_length: Option<usize>,
    max_length: Option<usize>,
}

impl ConstraintSet {
    /// Compiles the declarations on `field`.
    ///
    /// # Errors
    ///
    /// - range or length constraints on a type they do not apply to
    /// - a pattern that is not a valid regex
    /// - bounds or enum members that do not cast with the field
    /// - a lower bound above its upper bound
    pub fn compile(field: &Field) -> Result<Self, ConstraintError> {
        let declared = &field.constraints;
        let field_type = field.field_type;

        let not_applicable = |constraint| ConstraintError::NotApplicable {
            field: field.name.clone(),
            constraint,
            field_type: field_type.type_name(),
        };

        if !field_type.is_ordered() {
            if declared.minimum.is_some() {
                return Err(not_applicable(ConstraintKind::Minimum));
            }
            if declared.maximum.is_some() {
                return Err(not_applicable(ConstraintKind::Maximum));
            }
        }
        if !field_type.has_length() {
            if declared.min_length.is_some() {
                return Err(not_applicable(ConstraintKind::MinLength));
            }
            if declared.max_length.is_some() {
                return Err(not_applicable(ConstraintKind::MaxLength));
            }
        }

        let minimum = declared
            .minimum
            .as_ref()
            .map(|b| bound_value(field, ConstraintKind::Minimum, b))
            .transpose()?;
        let maximum = declared
            .maximum
            .as_ref()
            .map(|b| bound_value(field, ConstraintKind::Maximum, b))
            .transpose()?;

        if let (Some(lo), Some(hi)) = (&minimum, &maximum) {
            if lo.compare(hi) == Some(Ordering::Greater) {
                return Err(ConstraintError::InvertedBounds {
                    field: field.name.clone(),
                    lower: ConstraintKind::Minimum,
                    upper: ConstraintKind::Maximum,
                });
            }
        }
        if let (Some(lo), Some(hi)) = (declared.min_length, declared.max_length) {
            if lo > hi {
                return Err(ConstraintError::InvertedBounds {
                    field: field.name.clone(),
                    lower: ConstraintKind::MinLength,
                    upper: ConstraintKind::MaxLength,
                });
            }
        }

        // Patterns match the whole raw cell
        let pattern = declared
            .pattern
            .as_ref()
            .map(|p| {
                Regex::new(&format!("^(?:{})$", p)).map_err(|e| ConstraintError::InvalidPattern {
                    field: field.name.clone(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let enum_values = declared
            .enum_values
            .as_ref()
            .map(|values| {
                values
                    .iter()
                    .map(|v| bound_value(field, ConstraintKind::Enum, v))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        Ok(Self {
            required: declared.required,
            unique: declared.unique,
            minimum,
            maximum,
            pattern,
            enum_values,
            min_length: declared.min_length,
            max_length: declared.max_length,
        })
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Returns every per-value constraint `value` violates.
    ///
    /// `raw` is the cell text the value was cast from; `pattern` matches
    /// against it. A null value only ever violates `required`.
    pub fn check(&self, value: &Value, raw: &str) -> Vec<ConstraintKind> {
        let mut violated = Vec::new();

        if value.is_null() {
            if self.required {
                violated.push(ConstraintKind::Required);
            }
            return violated;
        }

        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(raw) {
                violated.push(ConstraintKind::Pattern);
            }
        }
        if let Some(min) = &self.minimum {
            if value.compare(min) == Some(Ordering::Less) {
                violated.push(ConstraintKind::Minimum);
            }
        }
        if let Some(max) = &self.maximum {
            if value.compare(max) == Some(Ordering::Greater) {
                violated.push(ConstraintKind::Maximum);
            }
        }
        if let Some(allowed) = &self.enum_values {
            if !allowed.contains(value) {
                violated.push(ConstraintKind::Enum);
            }
        }
        if let Some(len) = value.length() {
            if self.min_length.is_some_and(|min| len < min) {
                violated.push(ConstraintKind::MinLength);
            }
            if self.max_length.is_some_and(|max| len > max) {
                violated.push(ConstraintKind::MaxLength);
            }
        }

        violated
    }
}

/// Casts a JSON bound with the owning field.
fn bound_value(
    field: &Field,
    constraint: ConstraintKind,
    bound: &JsonValue,
) -> Result<Value, ConstraintError> {
    let invalid = |reason: String| ConstraintError::InvalidBound {
        field: field.name.clone(),
        constraint,
        reason,
    };

    let direct = match (field.field_type, bound) {
        (FieldType::Boolean, JsonValue::Bool(b)) => Some(Value::Boolean(*b)),
        (FieldType::Integer, JsonValue::Number(n)) => n.as_i64().map(Value::Integer),
        (FieldType::Number, JsonValue::Number(n)) => n.as_f64().map(Value::Number),
        (FieldType::Year, JsonValue::Number(n)) => {
            n.as_i64().and_then(|y| i32::try_from(y).ok()).map(Value::Year)
        }
        _ => None,
    };
    if let Some(value) = direct {
        return Ok(value);
    }

    let text = match bound {
        JsonValue::Null => return Err(invalid("null bound".into())),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    };
    field.cast(&text).map_err(|e| invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::Constraints;
    use serde_json::json;

    fn compile(field: Field) -> ConstraintSet {
        ConstraintSet::compile(&field).unwrap()
    }

    #[test]
    fn test_integer_range() {
        let set = compile(
            Field::integer("age").with_constraints(Constraints::default().with_minimum(0).with_maximum(130)),
        );

        assert!(set.check(&Value::Integer(30), "30").is_empty());
        assert_eq!(set.check(&Value::Integer(-1), "-1"), vec![ConstraintKind::Minimum]);
        assert_eq!(set.check(&Value::Integer(131), "131"), vec![ConstraintKind::Maximum]);
    }

    #[test]
    fn test_date_bounds_cast_with_field() {
        let set = compile(
            Field::date("day").with_constraints(Constraints::default().with_minimum("2020-01-01")),
        );
        let early = Field::date("day").cast("2019-12-31").unwrap();
        assert_eq!(set.check(&early, "2019-12-31"), vec![ConstraintKind::Minimum]);
    }

    #[test]
    fn test_pattern_matches_whole_raw_value() {
        let set = compile(
            Field::string("code").with_constraints(Constraints::default().with_pattern("[A-Z]{3}")),
        );
        assert!(set.check(&Value::String("ABC".into()), "ABC").is_empty());
        assert_eq!(
            set.check(&Value::String("ABCD".into()), "ABCD"),
            vec![ConstraintKind::Pattern]
        );
    }

    #[test]
    fn test_enum_membership() {
        let set = compile(
            Field::integer("level").with_constraints(Constraints::default().with_enum(vec![json!(1), json!("2")])),
        );
        assert!(set.check(&Value::Integer(2), "2").is_empty());
        assert_eq!(set.check(&Value::Integer(3), "3"), vec![ConstraintKind::Enum]);
    }

    #[test]
    fn test_length_bounds() {
        let set = compile(
            Field::string("name").with_constraints(Constraints::default().with_length(Some(2), Some(4))),
        );
        assert_eq!(set.check(&Value::String("a".into()), "a"), vec![ConstraintKind::MinLength]);
        assert_eq!(
            set.check(&Value::String("abcde".into()), "abcde"),
            vec![ConstraintKind::MaxLength]
        );
        assert!(set.check(&Value::String("abc".into()), "abc").is_empty());
    }

    #[test]
    fn test_multiple_violations_reported_together() {
        let set = compile(
            Field::string("tag").with_constraints(
                Constraints::default()
                    .with_pattern("[a-z]+")
                    .with_length(None, Some(2)),
            ),
        );
        let violated = set.check(&Value::String("ABC".into()), "ABC");
        assert_eq!(violated, vec![ConstraintKind::Pattern, ConstraintKind::MaxLength]);
    }

    #[test]
    fn test_null_only_checks_required() {
        let set = compile(
            Field::integer("id").with_constraints(Constraints::required().with_minimum(10)),
        );
        assert_eq!(set.check(&Value::Null, ""), vec![ConstraintKind::Required]);

        let optional = compile(Field::integer("id").with_constraints(Constraints::default().with_minimum(10)));
        assert!(optional.check(&Value::Null, "").is_empty());
    }

    #[test]
    fn test_not_applicable_constraints_rejected() {
        let err = ConstraintSet::compile(
            &Field::boolean("flag").with_constraints(Constraints::default().with_minimum(1)),
        )
        .unwrap_err();
        assert!(matches!(err, ConstraintError::NotApplicable { constraint: ConstraintKind::Minimum, .. }));

        let err = ConstraintSet::compile(
            &Field::integer("n").with_constraints(Constraints::default().with_length(Some(1), None)),
        )
        .unwrap_err();
        assert!(matches!(err, ConstraintError::NotApplicable { constraint: ConstraintKind::MinLength, .. }));
    }

    #[test]
    fn test_bad_declarations_rejected() {
        assert!(matches!(
            ConstraintSet::compile(&Field::string("s").with_constraints(Constraints::default().with_pattern("("))),
            Err(ConstraintError::InvalidPattern { .. })
        ));
        assert!(matches!(
            ConstraintSet::compile(&Field::integer("n").with_constraints(Constraints::default().with_minimum("ten"))),
            Err(ConstraintError::InvalidBound { .. })
        ));
        assert!(matches!(
            ConstraintSet::compile(
                &Field::integer("n").with_constraints(Constraints::default().with_minimum(5).with_maximum(1))
            ),
            Err(ConstraintError::InvertedBounds { .. })
        ));
    }
}

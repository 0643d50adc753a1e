//! Per-type parse and format rules
//!
//! Every variant is reached through `FieldType::parse` / `FieldType::format`
//! so callers never special-case a type. Numeric rules fail on overflow or
//! fractional input instead of truncating.

use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use regex::Regex;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::errors::{CastError, CastResult};
use super::types::{CastOptions, FieldType};
use super::value::Value;

const DEFAULT_DATE: &str = "%Y-%m-%d";
const DEFAULT_TIME: &str = "%H:%M:%S%.f";

const ANY_DATE: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%d %B %Y",
    "%B %d, %Y",
];
const ANY_TIME: &[&str] = &["%H:%M:%S%.f", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];
const ANY_DATETIME: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// How a `format` string is interpreted for temporal types
enum Layout<'a> {
    Default,
    Any,
    Pattern(&'a str),
}

fn layout<'a>(format: Option<&'a str>, expected: &'static str) -> CastResult<Layout<'a>> {
    match format {
        None | Some("default") => Ok(Layout::Default),
        Some("any") => Ok(Layout::Any),
        Some(f) => {
            let pattern = f.strip_prefix("fmt:").unwrap_or(f);
            let well_formed = !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error));
            if pattern.contains('%') && well_formed {
                Ok(Layout::Pattern(pattern))
            } else {
                Err(CastError::unsupported_format(expected, f))
            }
        }
    }
}

impl FieldType {
    /// Checks that `format` names a layout this type understands.
    ///
    /// Run once when a schema is built, so an unknown name or a malformed
    /// strftime pattern is a schema error rather than a failure per cell.
    pub fn check_format(&self, format: Option<&str>) -> CastResult<()> {
        match (self, format) {
            (_, None) | (_, Some("default")) => Ok(()),
            (FieldType::String, Some("email" | "uri" | "binary" | "uuid")) => Ok(()),
            (FieldType::GeoPoint, Some("array" | "object")) => Ok(()),
            (FieldType::Date | FieldType::Time | FieldType::DateTime, f) => {
                layout(f, self.type_name()).map(|_| ())
            }
            (FieldType::String | FieldType::GeoPoint, Some(other)) => {
                Err(CastError::unsupported_format(self.type_name(), other))
            }
            _ => Ok(()),
        }
    }

    /// Parses `raw` as this type.
    pub fn parse(&self, raw: &str, format: Option<&str>, options: &CastOptions) -> CastResult<Value> {
        match self {
            FieldType::String => parse_string(raw, format),
            FieldType::Integer => parse_integer(raw, options),
            FieldType::Number => parse_number(raw, options),
            FieldType::Boolean => parse_boolean(raw, options),
            FieldType::Date => parse_date(raw, format),
            FieldType::Time => parse_time(raw, format),
            FieldType::DateTime => parse_datetime(raw, format),
            FieldType::Year => parse_year(raw),
            FieldType::YearMonth => parse_yearmonth(raw),
            FieldType::GeoPoint => parse_geopoint(raw, format),
            FieldType::Object => match parse_json(raw, "object")? {
                JsonValue::Object(map) => Ok(Value::Object(map)),
                _ => Err(CastError::invalid("object", raw)),
            },
            FieldType::Array => match parse_json(raw, "array")? {
                JsonValue::Array(items) => Ok(Value::Array(items)),
                _ => Err(CastError::invalid("array", raw)),
            },
            FieldType::Any => Ok(Value::String(raw.to_string())),
        }
    }

    /// Formats `value` as this type. `Null` always formats as an empty cell.
    pub fn format(&self, value: &Value, format: Option<&str>, options: &CastOptions) -> CastResult<String> {
        let mismatch = || CastError::ValueMismatch {
            expected: self.type_name(),
            actual: value.type_name(),
        };

        match (self, value) {
            (_, Value::Null) => Ok(String::new()),
            (FieldType::String | FieldType::Any, Value::String(s)) => Ok(s.clone()),
            (FieldType::Integer, Value::Integer(i)) => Ok(i.to_string()),
            (FieldType::Number, Value::Number(n)) => Ok(format_number(*n, options)),
            (FieldType::Boolean, Value::Boolean(b)) => Ok(format_boolean(*b, options)),
            (FieldType::Date, Value::Date(d)) => Ok(match layout(format, "date")? {
                Layout::Pattern(p) => d.format(p).to_string(),
                _ => d.format(DEFAULT_DATE).to_string(),
            }),
            (FieldType::Time, Value::Time(t)) => Ok(match layout(format, "time")? {
                Layout::Pattern(p) => t.format(p).to_string(),
                _ => t.format(DEFAULT_TIME).to_string(),
            }),
            (FieldType::DateTime, Value::DateTime(dt)) => Ok(match layout(format, "datetime")? {
                Layout::Pattern(p) => dt.format(p).to_string(),
                _ => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            }),
            (FieldType::Year, Value::Year(y)) => Ok(y.to_string()),
            (FieldType::YearMonth, Value::YearMonth { year, month }) => {
                Ok(format!("{:04}-{:02}", year, month))
            }
            (FieldType::GeoPoint, Value::GeoPoint { lon, lat }) => match format {
                Some("array") => Ok(serde_json::json!([lon, lat]).to_string()),
                Some("object") => Ok(serde_json::json!({ "lon": lon, "lat": lat }).to_string()),
                _ => Ok(format!("{}, {}", lon, lat)),
            },
            (FieldType::Object, Value::Object(map)) => Ok(JsonValue::Object(map.clone()).to_string()),
            (FieldType::Array, Value::Array(items)) => Ok(JsonValue::Array(items.clone()).to_string()),
            _ => Err(mismatch()),
        }
    }
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"))
}

fn uri_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:\S+$").expect("valid uri regex"))
}

fn parse_string(raw: &str, format: Option<&str>) -> CastResult<Value> {
    let ok = match format {
        None | Some("default") => true,
        Some("email") => email_regex().is_match(raw),
        Some("uri") => uri_regex().is_match(raw),
        Some("binary") => BASE64.decode(raw).is_ok(),
        Some("uuid") => Uuid::parse_str(raw).is_ok(),
        Some(other) => return Err(CastError::unsupported_format("string", other)),
    };
    if ok {
        Ok(Value::String(raw.to_string()))
    } else {
        Err(CastError::invalid("string", raw))
    }
}

/// Applies `bareNumber`, `groupChar` and `decimalChar` to numeric text.
fn normalize_numeric(raw: &str, options: &CastOptions, keep_decimal: bool) -> String {
    let mut text = raw;
    if !options.bare_number {
        let is_numeric = |c: char| {
            c.is_ascii_digit() || c == '-' || c == '+' || (keep_decimal && c == options.decimal_char)
        };
        text = text.trim_start_matches(|c: char| !is_numeric(c));
        text = text.trim_end_matches(|c: char| !c.is_ascii_digit());
    }

    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if Some(c) == options.group_char {
            continue;
        }
        if keep_decimal && c == options.decimal_char {
            out.push('.');
        } else {
            out.push(c);
        }
    }
    out
}

fn parse_integer(raw: &str, options: &CastOptions) -> CastResult<Value> {
    let text = normalize_numeric(raw, options, false);
    match text.parse::<i64>() {
        Ok(i) => Ok(Value::Integer(i)),
        Err(_) => {
            let digits = text.strip_prefix(['-', '+']).unwrap_or(&text);
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                Err(CastError::out_of_range("integer", raw))
            } else {
                Err(CastError::invalid("integer", raw))
            }
        }
    }
}

fn parse_number(raw: &str, options: &CastOptions) -> CastResult<Value> {
    match raw {
        "NaN" | "nan" => return Ok(Value::Number(f64::NAN)),
        "INF" | "inf" | "+INF" => return Ok(Value::Number(f64::INFINITY)),
        "-INF" | "-inf" => return Ok(Value::Number(f64::NEG_INFINITY)),
        _ => {}
    }

    let text = normalize_numeric(raw, options, true);
    // Rust also accepts "infinity"; only the literals above are allowed
    if text.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return Err(CastError::invalid("number", raw));
    }
    match text.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(Value::Number(n)),
        Ok(_) => Err(CastError::out_of_range("number", raw)),
        Err(_) => Err(CastError::invalid("number", raw)),
    }
}

fn format_number(n: f64, options: &CastOptions) -> String {
    if n.is_nan() {
        return "NaN".into();
    }
    if n.is_infinite() {
        return if n > 0.0 { "INF".into() } else { "-INF".into() };
    }
    let text = n.to_string();
    if options.decimal_char == '.' {
        text
    } else {
        text.replace('.', &options.decimal_char.to_string())
    }
}

fn parse_boolean(raw: &str, options: &CastOptions) -> CastResult<Value> {
    if options.true_values.iter().any(|t| t == raw) {
        Ok(Value::Boolean(true))
    } else if options.false_values.iter().any(|f| f == raw) {
        Ok(Value::Boolean(false))
    } else {
        Err(CastError::invalid("boolean", raw))
    }
}

fn format_boolean(b: bool, options: &CastOptions) -> String {
    let tokens = if b {
        &options.true_values
    } else {
        &options.false_values
    };
    tokens
        .first()
        .cloned()
        .unwrap_or_else(|| b.to_string())
}

fn parse_date(raw: &str, format: Option<&str>) -> CastResult<Value> {
    let parsed = match layout(format, "date")? {
        Layout::Default => NaiveDate::parse_from_str(raw, DEFAULT_DATE).ok(),
        Layout::Any => ANY_DATE
            .iter()
            .find_map(|p| NaiveDate::parse_from_str(raw, p).ok()),
        Layout::Pattern(p) => NaiveDate::parse_from_str(raw, p).ok(),
    };
    parsed
        .map(Value::Date)
        .ok_or_else(|| CastError::invalid("date", raw))
}

fn parse_time(raw: &str, format: Option<&str>) -> CastResult<Value> {
    let parsed = match layout(format, "time")? {
        Layout::Default => NaiveTime::parse_from_str(raw, DEFAULT_TIME).ok(),
        Layout::Any => ANY_TIME
            .iter()
            .find_map(|p| NaiveTime::parse_from_str(raw, p).ok()),
        Layout::Pattern(p) => NaiveTime::parse_from_str(raw, p).ok(),
    };
    parsed
        .map(Value::Time)
        .ok_or_else(|| CastError::invalid("time", raw))
}

fn parse_datetime(raw: &str, format: Option<&str>) -> CastResult<Value> {
    let rfc3339 = || {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    };
    let naive = |pattern: &str| {
        NaiveDateTime::parse_from_str(raw, pattern)
            .ok()
            .map(|dt| dt.and_utc())
    };

    let parsed = match layout(format, "datetime")? {
        Layout::Default => rfc3339(),
        Layout::Any => rfc3339().or_else(|| ANY_DATETIME.iter().find_map(|p| naive(p))),
        Layout::Pattern(p) if p.contains("%z") || p.contains("%:z") => {
            DateTime::parse_from_str(raw, p)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        }
        Layout::Pattern(p) => naive(p),
    };
    parsed
        .map(Value::DateTime)
        .ok_or_else(|| CastError::invalid("datetime", raw))
}

fn parse_year(raw: &str) -> CastResult<Value> {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(CastError::invalid("year", raw));
    }
    raw.parse::<i32>()
        .map(Value::Year)
        .map_err(|_| CastError::out_of_range("year", raw))
}

fn parse_yearmonth(raw: &str) -> CastResult<Value> {
    let (year, month) = raw
        .split_once('-')
        .ok_or_else(|| CastError::invalid("yearmonth", raw))?;
    if year.is_empty() || !year.chars().all(|c| c.is_ascii_digit()) || month.len() != 2 {
        return Err(CastError::invalid("yearmonth", raw));
    }
    let year: i32 = year
        .parse()
        .map_err(|_| CastError::out_of_range("yearmonth", raw))?;
    let month: u32 = month
        .parse()
        .map_err(|_| CastError::invalid("yearmonth", raw))?;
    if !(1..=12).contains(&month) {
        return Err(CastError::out_of_range("yearmonth", raw));
    }
    Ok(Value::YearMonth { year, month })
}

fn parse_geopoint(raw: &str, format: Option<&str>) -> CastResult<Value> {
    let invalid = || CastError::invalid("geopoint", raw);

    let (lon, lat) = match format {
        None | Some("default") => {
            let (lon, lat) = raw.split_once(',').ok_or_else(invalid)?;
            let lon: f64 = lon.trim().parse().map_err(|_| invalid())?;
            let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
            (lon, lat)
        }
        Some("array") => {
            let pair: Vec<f64> = serde_json::from_str(raw).map_err(|_| invalid())?;
            match pair.as_slice() {
                [lon, lat] => (*lon, *lat),
                _ => return Err(invalid()),
            }
        }
        Some("object") => {
            let doc: JsonValue = serde_json::from_str(raw).map_err(|_| invalid())?;
            let lon = doc.get("lon").and_then(JsonValue::as_f64).ok_or_else(invalid)?;
            let lat = doc.get("lat").and_then(JsonValue::as_f64).ok_or_else(invalid)?;
            (lon, lat)
        }
        Some(other) => return Err(CastError::unsupported_format("geopoint", other)),
    };

    if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
        return Err(CastError::out_of_range("geopoint", raw));
    }
    Ok(Value::GeoPoint { lon, lat })
}

fn parse_json(raw: &str, expected: &'static str) -> CastResult<JsonValue> {
    serde_json::from_str(raw).map_err(|_| CastError::invalid(expected, raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(ty: FieldType, raw: &str) -> CastResult<Value> {
        ty.parse(raw, None, &CastOptions::default())
    }

    fn parse_fmt(ty: FieldType, raw: &str, format: &str) -> CastResult<Value> {
        ty.parse(raw, Some(format), &CastOptions::default())
    }

    fn round_trip(ty: FieldType, format: Option<&str>, value: Value) {
        let options = CastOptions::default();
        let text = ty.format(&value, format, &options).unwrap();
        assert_eq!(ty.parse(&text, format, &options).unwrap(), value, "via '{}'", text);
    }

    #[test]
    fn test_malformed_strftime_pattern_is_unsupported() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let err = FieldType::Date
            .format(&Value::Date(date), Some("%Q"), &CastOptions::default())
            .unwrap_err();
        assert!(matches!(err, CastError::UnsupportedFormat { .. }));

        let time = NaiveTime::from_hms_opt(8, 30, 0).unwrap();
        assert!(FieldType::Time
            .format(&Value::Time(time), Some("%H:%Q"), &CastOptions::default())
            .is_err());
        assert!(parse_fmt(FieldType::DateTime, "2024", "%Q").is_err());
    }

    #[test]
    fn test_check_format() {
        assert!(FieldType::Date.check_format(Some("%d/%m/%Y")).is_ok());
        assert!(FieldType::Date.check_format(Some("any")).is_ok());
        assert!(FieldType::Date.check_format(Some("%Q")).is_err());
        assert!(FieldType::DateTime.check_format(Some("dmy")).is_err());
        assert!(FieldType::String.check_format(Some("email")).is_ok());
        assert!(FieldType::String.check_format(Some("phone")).is_err());
        assert!(FieldType::GeoPoint.check_format(Some("array")).is_ok());
        assert!(FieldType::Integer.check_format(None).is_ok());
    }

    #[test]
    fn test_integer_rejects_fraction_and_text() {
        assert_eq!(parse(FieldType::Integer, "42").unwrap(), Value::Integer(42));
        assert_eq!(parse(FieldType::Integer, "-7").unwrap(), Value::Integer(-7));
        assert!(matches!(
            parse(FieldType::Integer, "1.5"),
            Err(CastError::Invalid { .. })
        ));
        assert!(matches!(
            parse(FieldType::Integer, "abc"),
            Err(CastError::Invalid { .. })
        ));
        assert!(parse(FieldType::Integer, "").is_err());
    }

    #[test]
    fn test_integer_overflow_fails() {
        assert!(matches!(
            parse(FieldType::Integer, "9223372036854775808"),
            Err(CastError::OutOfRange { .. })
        ));
        assert_eq!(
            parse(FieldType::Integer, "9223372036854775807").unwrap(),
            Value::Integer(i64::MAX)
        );
    }

    #[test]
    fn test_integer_bare_number_and_group_char() {
        let options = CastOptions {
            bare_number: false,
            group_char: Some(','),
            ..CastOptions::default()
        };
        assert_eq!(
            FieldType::Integer.parse("$1,200", None, &options).unwrap(),
            Value::Integer(1200)
        );
        assert_eq!(
            FieldType::Integer.parse("95%", None, &options).unwrap(),
            Value::Integer(95)
        );
        assert!(FieldType::Integer.parse("$1,200", None, &CastOptions::default()).is_err());
    }

    #[test]
    fn test_number_parsing() {
        assert_eq!(parse(FieldType::Number, "2.5").unwrap(), Value::Number(2.5));
        assert_eq!(parse(FieldType::Number, "3").unwrap(), Value::Number(3.0));
        assert_eq!(parse(FieldType::Number, "1e3").unwrap(), Value::Number(1000.0));
        assert_eq!(
            parse(FieldType::Number, "-INF").unwrap(),
            Value::Number(f64::NEG_INFINITY)
        );
        assert!(matches!(parse(FieldType::Number, "NaN").unwrap(), Value::Number(n) if n.is_nan()));
        assert!(parse(FieldType::Number, "infinity").is_err());
        assert!(parse(FieldType::Number, "twelve").is_err());
    }

    #[test]
    fn test_number_decimal_char() {
        let options = CastOptions {
            decimal_char: ',',
            group_char: Some('.'),
            ..CastOptions::default()
        };
        assert_eq!(
            FieldType::Number.parse("1.234,5", None, &options).unwrap(),
            Value::Number(1234.5)
        );
        assert_eq!(
            FieldType::Number.format(&Value::Number(1234.5), None, &options).unwrap(),
            "1234,5"
        );
    }

    #[test]
    fn test_boolean_exact_tokens() {
        assert_eq!(parse(FieldType::Boolean, "TRUE").unwrap(), Value::Boolean(true));
        assert_eq!(parse(FieldType::Boolean, "0").unwrap(), Value::Boolean(false));
        assert!(parse(FieldType::Boolean, "tRuE").is_err());
        assert!(parse(FieldType::Boolean, "yes").is_err());

        let options = CastOptions {
            true_values: vec!["Y".into()],
            false_values: vec!["N".into()],
            ..CastOptions::default()
        };
        assert_eq!(
            FieldType::Boolean.parse("Y", None, &options).unwrap(),
            Value::Boolean(true)
        );
        assert!(FieldType::Boolean.parse("true", None, &options).is_err());
        assert_eq!(
            FieldType::Boolean.format(&Value::Boolean(false), None, &options).unwrap(),
            "N"
        );
    }

    #[test]
    fn test_string_formats() {
        assert!(parse_fmt(FieldType::String, "a@b.io", "email").is_ok());
        assert!(parse_fmt(FieldType::String, "not-an-email", "email").is_err());
        assert!(parse_fmt(FieldType::String, "https://example.com/x", "uri").is_ok());
        assert!(parse_fmt(FieldType::String, "no scheme", "uri").is_err());
        assert!(parse_fmt(FieldType::String, "aGVsbG8=", "binary").is_ok());
        assert!(parse_fmt(FieldType::String, "%%%", "binary").is_err());
        assert!(parse_fmt(FieldType::String, "67e55044-10b1-426f-9247-bb680e5fe0c8", "uuid").is_ok());
        assert!(parse_fmt(FieldType::String, "67e55044", "uuid").is_err());
        assert!(matches!(
            parse_fmt(FieldType::String, "x", "ipv9"),
            Err(CastError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_date_formats() {
        let expected = Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(parse(FieldType::Date, "2024-02-29").unwrap(), expected);
        assert_eq!(parse_fmt(FieldType::Date, "29/02/2024", "%d/%m/%Y").unwrap(), expected);
        assert_eq!(parse_fmt(FieldType::Date, "29/02/2024", "fmt:%d/%m/%Y").unwrap(), expected);
        assert_eq!(parse_fmt(FieldType::Date, "2024/02/29", "any").unwrap(), expected);
        assert!(parse(FieldType::Date, "2023-02-29").is_err());
        assert!(parse(FieldType::Date, "29/02/2024").is_err());
        assert!(matches!(
            parse_fmt(FieldType::Date, "2024-02-29", "dd-mm"),
            Err(CastError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_time_and_datetime() {
        assert_eq!(
            parse(FieldType::Time, "13:45:00").unwrap(),
            Value::Time(NaiveTime::from_hms_opt(13, 45, 0).unwrap())
        );
        assert!(parse(FieldType::Time, "25:00:00").is_err());

        let utc = parse(FieldType::DateTime, "2024-01-01T12:00:00+02:00").unwrap();
        assert_eq!(
            FieldType::DateTime.format(&utc, None, &CastOptions::default()).unwrap(),
            "2024-01-01T10:00:00Z"
        );
        assert!(parse(FieldType::DateTime, "2024-01-01 12:00").is_err());
        assert!(parse_fmt(FieldType::DateTime, "2024-01-01 12:00", "any").is_ok());
    }

    #[test]
    fn test_year_and_yearmonth() {
        assert_eq!(parse(FieldType::Year, "1999").unwrap(), Value::Year(1999));
        assert!(parse(FieldType::Year, "19x9").is_err());
        assert_eq!(
            parse(FieldType::YearMonth, "2024-03").unwrap(),
            Value::YearMonth { year: 2024, month: 3 }
        );
        assert!(matches!(
            parse(FieldType::YearMonth, "2024-13"),
            Err(CastError::OutOfRange { .. })
        ));
        assert!(parse(FieldType::YearMonth, "2024-3").is_err());
    }

    #[test]
    fn test_geopoint_formats() {
        let expected = Value::GeoPoint { lon: 90.5, lat: 45.0 };
        assert_eq!(parse(FieldType::GeoPoint, "90.5, 45").unwrap(), expected);
        assert_eq!(parse_fmt(FieldType::GeoPoint, "[90.5, 45]", "array").unwrap(), expected);
        assert_eq!(
            parse_fmt(FieldType::GeoPoint, r#"{"lon": 90.5, "lat": 45}"#, "object").unwrap(),
            expected
        );
        assert!(matches!(
            parse(FieldType::GeoPoint, "200, 10"),
            Err(CastError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_object_and_array() {
        assert!(matches!(parse(FieldType::Object, r#"{"a": 1}"#).unwrap(), Value::Object(_)));
        assert!(parse(FieldType::Object, "[1]").is_err());
        assert!(matches!(parse(FieldType::Array, "[1, 2]").unwrap(), Value::Array(v) if v.len() == 2));
        assert!(parse(FieldType::Array, "{").is_err());
    }

    #[test]
    fn test_any_keeps_text() {
        assert_eq!(parse(FieldType::Any, " 12 ").unwrap(), Value::String(" 12 ".into()));
    }

    #[test]
    fn test_format_rejects_mismatched_value() {
        let err = FieldType::Integer
            .format(&Value::String("x".into()), None, &CastOptions::default())
            .unwrap_err();
        assert!(matches!(err, CastError::ValueMismatch { expected: "integer", actual: "string" }));
    }

    #[test]
    fn test_null_formats_empty() {
        assert_eq!(
            FieldType::Date.format(&Value::Null, None, &CastOptions::default()).unwrap(),
            ""
        );
    }

    #[test]
    fn test_round_trip_law() {
        round_trip(FieldType::Integer, None, Value::Integer(-120));
        round_trip(FieldType::Number, None, Value::Number(0.1));
        round_trip(FieldType::Number, None, Value::Number(1e300));
        round_trip(FieldType::Number, None, Value::Number(f64::INFINITY));
        round_trip(FieldType::Boolean, None, Value::Boolean(true));
        round_trip(FieldType::String, None, Value::String("héllo, \"world\"".into()));
        round_trip(
            FieldType::Date,
            Some("%d %B %Y"),
            Value::Date(NaiveDate::from_ymd_opt(2021, 7, 4).unwrap()),
        );
        round_trip(
            FieldType::Time,
            None,
            Value::Time(NaiveTime::from_hms_milli_opt(8, 30, 5, 250).unwrap()),
        );
        round_trip(
            FieldType::DateTime,
            None,
            Value::DateTime(
                NaiveDate::from_ymd_opt(2020, 5, 17)
                    .unwrap()
                    .and_hms_opt(23, 59, 1)
                    .unwrap()
                    .and_utc(),
            ),
        );
        round_trip(FieldType::Year, None, Value::Year(2000));
        round_trip(FieldType::YearMonth, None, Value::YearMonth { year: 987, month: 11 });
        round_trip(FieldType::GeoPoint, None, Value::GeoPoint { lon: -0.5, lat: 51.25 });
        round_trip(FieldType::GeoPoint, Some("object"), Value::GeoPoint { lon: 3.0, lat: -4.0 });
        round_trip(FieldType::Array, None, Value::Array(vec![serde_json::json!(1), serde_json::json!("a")]));
    }
}

//! Rendering of document fields into notification text.
//!
//! Documents arrive as relaxed extended JSON, so numeric and date values may
//! be wrapped (`{"$numberDecimal": "1.5"}`, `{"$date": "..."}`).

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde_json::{Map, Number, Value};

use crate::errors::FormatError;

const NUMBER_WRAPPERS: [&str; 4] = ["$numberDecimal", "$numberLong", "$numberInt", "$numberDouble"];

fn lookup<'a>(doc: &'a Value, field: &str) -> Result<&'a Value, FormatError> {
    match doc.get(field) {
        None | Some(Value::Null) => Err(FormatError::MissingField(field.to_string())),
        Some(value) => Ok(value),
    }
}

fn render_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

fn unwrap_number(obj: &Map<String, Value>) -> Option<String> {
    NUMBER_WRAPPERS
        .iter()
        .find_map(|key| obj.get(*key))
        .and_then(|inner| match inner {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(render_number(n)),
            _ => None,
        })
}

/// Renders a scalar field as display text.
///
/// Strings are used verbatim, integral numbers lose any trailing `.0`.
pub fn render_field(doc: &Value, field: &str) -> Result<String, FormatError> {
    match lookup(doc, field)? {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(render_number(n)),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Object(obj) => {
            unwrap_number(obj).ok_or_else(|| FormatError::invalid(field, "object is not a number"))
        }
        Value::Array(_) => Err(FormatError::invalid(field, "arrays cannot be rendered")),
        Value::Null => Err(FormatError::MissingField(field.to_string())),
    }
}

fn from_millis(field: &str, millis: i64) -> Result<DateTime<Utc>, FormatError> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| FormatError::invalid(field, format!("timestamp {} out of range", millis)))
}

/// Accepts RFC 3339, offset-less ISO 8601 date-times and dates (read as UTC),
/// and RFC 2822.
fn parse_date_string(field: &str, s: &str) -> Result<DateTime<Utc>, FormatError> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    if let Some(midnight) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc());
    }
    DateTime::parse_from_rfc2822(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| FormatError::invalid(field, format!("'{}': {}", s, e)))
}

fn parse_instant(field: &str, value: &Value) -> Result<DateTime<Utc>, FormatError> {
    match value {
        Value::String(s) => parse_date_string(field, s),
        Value::Number(n) => {
            let millis = n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
                .ok_or_else(|| FormatError::invalid(field, "not a finite number"))?;
            from_millis(field, millis)
        }
        Value::Object(obj) => match obj.get("$date") {
            Some(Value::Object(inner)) => {
                let millis = unwrap_number(inner)
                    .and_then(|s| s.parse::<i64>().ok())
                    .ok_or_else(|| FormatError::invalid(field, "malformed $date"))?;
                from_millis(field, millis)
            }
            Some(inner) => parse_instant(field, inner),
            None => Err(FormatError::invalid(field, "object is not a date")),
        },
        _ => Err(FormatError::invalid(field, "not a date")),
    }
}

/// Renders a date field as an ISO-8601 UTC string with millisecond precision.
pub fn render_timestamp(doc: &Value, field: &str) -> Result<String, FormatError> {
    let instant = parse_instant(field, lookup(doc, field)?)?;
    Ok(instant.to_rfc3339_opts(SecondsFormat::Millis, true))
}

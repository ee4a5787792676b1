//! Coercion helpers for untyped record fields.
//!
//! The upstream API returns every record as a loose `fields` map. These
//! helpers are the only place that inspects `serde_json::Value` shapes; the
//! model constructors build on them.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Separator used by the upstream formula that joins wakatime project names.
pub const PROJECT_NAME_SEPARATOR: &str = "$$xXseparatorXx$$";

pub type Fields = Map<String, Value>;

/// Read a string field. Non-string scalars are not converted.
pub fn string(fields: &Fields, key: &str) -> Option<String> {
    match fields.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        // Lookup fields come back as single-element arrays
        Some(Value::Array(items)) => items.first().and_then(|v| v.as_str()).map(str::to_string),
        _ => None,
    }
}

/// Read a numeric field, accepting numeric strings. Non-finite values
/// ("NaN", "inf") read as missing.
pub fn number(fields: &Fields, key: &str) -> Option<f64> {
    let value = match fields.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        Some(Value::Array(items)) => items.first().and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }),
        _ => None,
    };
    value.filter(|f: &f64| f.is_finite())
}

/// Read an integer field. Fractional values are truncated.
pub fn integer(fields: &Fields, key: &str) -> Option<i64> {
    match fields.get(key) {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        _ => number(fields, key).map(|f| f as i64),
    }
}

/// Truthy coercion: anything but absent, null, false, zero, "" or [] is true.
pub fn flag(fields: &Fields, key: &str) -> bool {
    match fields.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(_)) => true,
    }
}

/// Reduce a linked-record field to its first id.
pub fn first_link(fields: &Fields, key: &str) -> Option<String> {
    match fields.get(key) {
        Some(Value::Array(items)) => items.first().and_then(|v| v.as_str()).map(str::to_string),
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Split a separator-joined field, dropping empty segments.
pub fn joined_list(fields: &Fields, key: &str) -> Vec<String> {
    string(fields, key)
        .map(|joined| {
            joined
                .split(PROJECT_NAME_SEPARATOR)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Parse an RFC 3339 timestamp as returned in `createdTime`.
pub fn timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

//! Conversion utilities between database rows and JSON.
//!
//! Turns tokio-postgres rows into column-name-to-value mappings for MCP
//! responses, and provides argument-extraction helpers for tool dispatch.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Value as JsonValue};
use tokio_postgres::types::Type;
use tokio_postgres::Row;

use crate::error::{McpError, Result};

/// One result row as a column-name-to-value mapping.
pub type RowMap = Map<String, JsonValue>;

/// Convert a set of rows into row mappings, preserving column order.
pub fn rows_to_json(rows: &[Row]) -> Vec<RowMap> {
    rows.iter().map(row_to_json).collect()
}

/// Convert a single row into a column-name-to-value mapping.
pub fn row_to_json(row: &Row) -> RowMap {
    let mut map = Map::new();
    for (idx, column) in row.columns().iter().enumerate() {
        map.insert(column.name().to_string(), column_value(row, idx));
    }
    map
}

/// Convert one column value to JSON based on its declared type.
///
/// NUMERIC is serialized as a string to avoid precision loss; date/time
/// types become ISO 8601 strings. Types we don't recognize fall through a
/// try-get chain and end up as strings where the driver allows it.
fn column_value(row: &Row, idx: usize) -> JsonValue {
    let ty = row.columns()[idx].type_();

    match *ty {
        Type::BOOL => get_or_null(row, idx, JsonValue::Bool),
        Type::INT2 => get_or_null(row, idx, |v: i16| JsonValue::Number(v.into())),
        Type::INT4 => get_or_null(row, idx, |v: i32| JsonValue::Number(v.into())),
        Type::INT8 => get_or_null(row, idx, |v: i64| JsonValue::Number(v.into())),
        Type::FLOAT4 => get_or_null(row, idx, |v: f32| float_json(v as f64)),
        Type::FLOAT8 => get_or_null(row, idx, float_json),
        Type::NUMERIC => get_or_null(row, idx, |v: Decimal| JsonValue::String(v.to_string())),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            get_or_null(row, idx, JsonValue::String)
        }
        Type::JSON | Type::JSONB => get_or_null(row, idx, |v: JsonValue| v),
        Type::TIMESTAMP => get_or_null(row, idx, |v: NaiveDateTime| {
            JsonValue::String(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
        }),
        Type::TIMESTAMPTZ => {
            get_or_null(row, idx, |v: DateTime<Utc>| JsonValue::String(v.to_rfc3339()))
        }
        Type::DATE => get_or_null(row, idx, |v: NaiveDate| JsonValue::String(v.to_string())),
        Type::TIME => get_or_null(row, idx, |v: NaiveTime| JsonValue::String(v.to_string())),
        Type::OID => get_or_null(row, idx, |v: u32| JsonValue::Number(v.into())),
        _ => fallback_value(row, idx),
    }
}

fn get_or_null<'a, T, F>(row: &'a Row, idx: usize, to_json: F) -> JsonValue
where
    T: tokio_postgres::types::FromSql<'a>,
    F: FnOnce(T) -> JsonValue,
{
    match row.try_get::<_, Option<T>>(idx) {
        Ok(Some(v)) => to_json(v),
        Ok(None) => JsonValue::Null,
        Err(_) => JsonValue::Null,
    }
}

fn float_json(v: f64) -> JsonValue {
    // NaN/Infinity have no JSON representation
    serde_json::Number::from_f64(v)
        .map(JsonValue::Number)
        .unwrap_or_else(|| JsonValue::String(v.to_string()))
}

/// Last-resort conversion for types without a dedicated arm.
fn fallback_value(row: &Row, idx: usize) -> JsonValue {
    if let Ok(val) = row.try_get::<_, Option<String>>(idx) {
        return val.map(JsonValue::String).unwrap_or(JsonValue::Null);
    }
    if let Ok(val) = row.try_get::<_, Option<i64>>(idx) {
        return val.map(|v| JsonValue::Number(v.into())).unwrap_or(JsonValue::Null);
    }
    if let Ok(val) = row.try_get::<_, Option<f64>>(idx) {
        return val.map(float_json).unwrap_or(JsonValue::Null);
    }
    if let Ok(val) = row.try_get::<_, Option<bool>>(idx) {
        return val.map(JsonValue::Bool).unwrap_or(JsonValue::Null);
    }
    tracing::debug!(
        column = row.columns()[idx].name(),
        ty = %row.columns()[idx].type_(),
        "no JSON conversion for column type"
    );
    JsonValue::Null
}

/// Helper to get a required string argument from JSON arguments.
pub fn get_string_arg(args: &Map<String, JsonValue>, name: &str) -> Result<String> {
    args.get(name)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| McpError::MissingArg(name.to_string()))
}

/// Helper to get a required string argument that must not be empty or
/// whitespace-only. Validation runs before any SQL is issued.
pub fn get_non_empty_string_arg(args: &Map<String, JsonValue>, name: &str) -> Result<String> {
    let value = get_string_arg(args, name)?;
    if value.trim().is_empty() {
        return Err(McpError::InvalidArg {
            name: name.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    Ok(value)
}

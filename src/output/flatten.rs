//! Record flattening
//!
//! Turns nested API records into flat rows that a CSV or Parquet writer can
//! take, with the target's metadata prepended as `target_*` columns.

use crate::config::Target;
use crate::types::{JsonObject, JsonValue};
use chrono::DateTime;
use serde_json::Value;

/// Column holding the queried username
pub const TARGET_USERNAME_COLUMN: &str = "target_username";

/// Column used for records that are not JSON objects
pub const VALUE_COLUMN: &str = "value";

/// Format used for rendered timestamps (UTC)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Flatten one record for `target`.
///
/// Target columns come first, then the record's fields in their original
/// order. Fields named in `timestamp_fields` are rendered as dates when they
/// hold unix seconds.
pub fn flatten_record(record: &Value, target: &Target, timestamp_fields: &[String]) -> JsonObject {
    let mut row = JsonObject::new();
    row.insert(
        TARGET_USERNAME_COLUMN.to_string(),
        Value::String(target.username.clone()),
    );
    for (key, value) in &target.metadata {
        row.insert(format!("target_{key}"), flatten_value(value));
    }

    match record {
        Value::Object(fields) => {
            for (key, value) in fields {
                let value = if timestamp_fields.iter().any(|f| f == key) {
                    format_timestamp(value)
                } else {
                    flatten_value(value)
                };
                row.insert(key.clone(), value);
            }
        }
        other => {
            row.insert(VALUE_COLUMN.to_string(), flatten_value(other));
        }
    }

    row
}

/// Flatten every record for `target`
pub fn flatten_records(
    records: &[Value],
    target: &Target,
    timestamp_fields: &[String],
) -> Vec<JsonValue> {
    records
        .iter()
        .map(|r| Value::Object(flatten_record(r, target, timestamp_fields)))
        .collect()
}

/// Make a value scalar: string lists are joined, other nesting becomes JSON text
pub fn flatten_value(value: &Value) -> Value {
    match value {
        Value::Array(items) if items.iter().all(Value::is_string) => Value::String(
            items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Value::Array(_) | Value::Object(_) => Value::String(value.to_string()),
        scalar => scalar.clone(),
    }
}

/// Render unix seconds as `YYYY-MM-DD HH:MM:SS`; anything else is flattened as usual
pub fn format_timestamp(value: &Value) -> Value {
    let seconds = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    seconds
        .and_then(|s| DateTime::from_timestamp(s, 0))
        .map_or_else(
            || flatten_value(value),
            |dt| Value::String(dt.format(TIMESTAMP_FORMAT).to_string()),
        )
}

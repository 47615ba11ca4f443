//! Arrow schema inference and JSON to Arrow conversion
//!
//! Works on flat rows (see [`super::flatten_record`]). Column order is the
//! order in which columns are first seen, so exports keep the target columns
//! up front and the API's field order after them.

use crate::error::{Error, Result};
use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Infer an Arrow schema from a set of flat JSON rows
///
/// All fields are nullable. Columns that are only ever null become strings.
pub fn infer_schema(rows: &[Value]) -> Schema {
    let mut order: Vec<String> = Vec::new();
    let mut field_types: HashMap<String, DataType> = HashMap::new();

    for row in rows {
        let Value::Object(obj) = row else { continue };
        for (key, value) in obj {
            let inferred = infer_type(value);
            match field_types.get_mut(key) {
                Some(existing) => *existing = merge_types(existing, &inferred),
                None => {
                    order.push(key.clone());
                    field_types.insert(key.clone(), inferred);
                }
            }
        }
    }

    let fields: Vec<Field> = order
        .into_iter()
        .map(|name| {
            let dtype = match field_types.remove(&name) {
                Some(DataType::Null) | None => DataType::Utf8,
                Some(dtype) => dtype,
            };
            Field::new(name, dtype, true)
        })
        .collect();

    Schema::new(fields)
}

/// Convert flat JSON rows to an Arrow RecordBatch
///
/// Uses the provided schema or infers one from the data.
pub fn json_to_arrow(rows: &[Value], schema: Option<&Schema>) -> Result<RecordBatch> {
    let schema = match schema {
        Some(schema) => schema.clone(),
        None => infer_schema(rows),
    };
    let schema = Arc::new(schema);

    if rows.is_empty() {
        return Ok(RecordBatch::new_empty(schema));
    }

    let columns: Vec<ArrayRef> = schema
        .fields()
        .iter()
        .map(|field| {
            let values: Vec<Option<&Value>> = rows
                .iter()
                .map(|row| row.get(field.name()).filter(|v| !v.is_null()))
                .collect();
            build_array(&values, field.data_type())
        })
        .collect();

    RecordBatch::try_new(schema, columns).map_err(|e| Error::Output {
        message: format!("Failed to create RecordBatch: {e}"),
    })
}

/// Infer Arrow DataType from a JSON value
fn infer_type(value: &Value) -> DataType {
    match value {
        Value::Null => DataType::Null,
        Value::Bool(_) => DataType::Boolean,
        Value::Number(n) => {
            if n.is_i64() {
                DataType::Int64
            } else {
                DataType::Float64
            }
        }
        // nested values are written as JSON text
        Value::String(_) | Value::Array(_) | Value::Object(_) => DataType::Utf8,
    }
}

/// Merge two data types into a compatible type
fn merge_types(type1: &DataType, type2: &DataType) -> DataType {
    match (type1, type2) {
        (a, b) if a == b => a.clone(),

        (DataType::Null, other) | (other, DataType::Null) => other.clone(),

        (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
            DataType::Float64
        }

        // conflicting types fall back to text
        _ => DataType::Utf8,
    }
}

/// Build an Arrow array from JSON values
fn build_array(values: &[Option<&Value>], data_type: &DataType) -> ArrayRef {
    match data_type {
        DataType::Boolean => {
            let arr: BooleanArray = values.iter().map(|v| v.and_then(Value::as_bool)).collect();
            Arc::new(arr)
        }

        DataType::Int64 => {
            let arr: Int64Array = values.iter().map(|v| v.and_then(Value::as_i64)).collect();
            Arc::new(arr)
        }

        DataType::Float64 => {
            let arr: Float64Array = values.iter().map(|v| v.and_then(Value::as_f64)).collect();
            Arc::new(arr)
        }

        _ => {
            let arr: StringArray = values
                .iter()
                .map(|v| {
                    v.map(|v| match v {
                        Value::String(s) => s.clone(),
                        _ => v.to_string(),
                    })
                })
                .collect();
            Arc::new(arr)
        }
    }
}

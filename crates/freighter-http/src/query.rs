//! Query string building for GET requests
//!
//! The request is lowered to a wire-form value and flattened one level:
//!
//! - `null` values are omitted
//! - arrays contribute one `key=value` pair per element, so an empty array
//!   contributes nothing and `{"d": [2, 3]}` becomes `d=2&d=3`
//! - strings are used as-is, numbers and booleans by their display text
//! - objects, and arrays nested in arrays, are written as compact JSON
//!
//! Percent-encoding is left to the transport.

use freighter_core::{FreighterError, FreighterResult};
use freighter_transport::KeyCase;
use serde::Serialize;
use serde_json::Value;

/// Build the query pairs for a GET request
///
/// The request must serialize to an object (or to `null`, for no query).
pub fn build_query<T>(request: &T, key_case: KeyCase) -> FreighterResult<Vec<(String, String)>>
where
    T: Serialize + ?Sized,
{
    let value = key_case.to_wire(serde_json::to_value(request)?)?;
    let map = match value {
        Value::Object(map) => map,
        Value::Null => return Ok(Vec::new()),
        other => {
            return Err(FreighterError::Serialization(format!(
                "GET request must serialize to an object, got {}",
                kind_name(&other)
            )));
        }
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items.iter().filter(|v| !v.is_null()) {
                    pairs.push((key.clone(), scalar_text(item)?));
                }
            }
            other => pairs.push((key, scalar_text(&other)?)),
        }
    }
    Ok(pairs)
}

fn scalar_text(value: &Value) -> FreighterResult<String> {
    Ok(match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        nested => serde_json::to_string(nested)?,
    })
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

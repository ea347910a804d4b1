//! Key case-folding between application and wire naming conventions
//!
//! Application types use Rust's `snake_case` field names. Some peers speak
//! `camelCase` on the wire, so codecs rewrite every object key on the way out
//! and back in. The rewrite walks nested objects and arrays.
//!
//! | Variant | Application | Wire |
//! |---------|-------------|------|
//! | [`KeyCase::Identity`] | `display_name` | `display_name` |
//! | [`KeyCase::Camel`] | `display_name` | `displayName` |
//!
//! [`KeyCase::Camel`] is lossless for every key without uppercase letters.
//! A key whose camelCase form would not convert back to it (`field_1`,
//! `a__b`, `trailing_`) travels unchanged. Application keys with uppercase
//! letters are rejected on encode: `userId` and `user_id` would share the
//! wire key `userId`.

use crate::codec::CodecError;
use serde_json::{Map, Value};
use std::convert::Infallible;

/// Key transform applied by a codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyCase {
    /// Keys pass through unchanged
    #[default]
    Identity,
    /// `snake_case` application keys travel as `camelCase`
    Camel,
}

impl KeyCase {
    /// Rewrite a single key from application to wire convention
    pub fn key_to_wire(&self, key: &str) -> Result<String, CodecError> {
        match self {
            KeyCase::Identity => Ok(key.to_string()),
            KeyCase::Camel => camel_wire_key(key),
        }
    }

    /// Rewrite a single key from wire to application convention
    pub fn key_from_wire(&self, key: &str) -> String {
        match self {
            KeyCase::Identity => key.to_string(),
            KeyCase::Camel => camel_application_key(key),
        }
    }

    /// Rewrite every object key in `value` to wire convention
    pub fn to_wire(&self, value: Value) -> Result<Value, CodecError> {
        match self {
            KeyCase::Identity => Ok(value),
            KeyCase::Camel => rewrite_keys(value, &camel_wire_key),
        }
    }

    /// Rewrite every object key in `value` to application convention
    pub fn from_wire(&self, value: Value) -> Value {
        match self {
            KeyCase::Identity => value,
            KeyCase::Camel => {
                let Ok(value) =
                    rewrite_keys::<Infallible>(value, &|key: &str| Ok(camel_application_key(key)));
                value
            }
        }
    }
}

fn camel_wire_key(key: &str) -> Result<String, CodecError> {
    if key.chars().any(char::is_uppercase) {
        return Err(CodecError::Serialization(format!(
            "key `{}` has uppercase letters and cannot be folded to camelCase",
            key
        )));
    }
    let camel = to_camel_case(key);
    if to_snake_case(&camel) == key {
        Ok(camel)
    } else {
        Ok(key.to_string())
    }
}

fn camel_application_key(key: &str) -> String {
    let snake = to_snake_case(key);
    if to_camel_case(&snake) == key {
        snake
    } else {
        key.to_string()
    }
}

fn rewrite_keys<E>(value: Value, rename: &dyn Fn(&str) -> Result<String, E>) -> Result<Value, E> {
    match value {
        Value::Object(map) => {
            let mut rewritten = Map::with_capacity(map.len());
            for (k, v) in map {
                rewritten.insert(rename(&k)?, rewrite_keys(v, rename)?);
            }
            Ok(Value::Object(rewritten))
        }
        Value::Array(items) => items
            .into_iter()
            .map(|v| rewrite_keys(v, rename))
            .collect::<Result<Vec<_>, E>>()
            .map(Value::Array),
        other => Ok(other),
    }
}

/// Convert snake_case to camelCase.
///
/// ```
/// use freighter_transport::case::to_camel_case;
///
/// assert_eq!(to_camel_case("display_name"), "displayName");
/// assert_eq!(to_camel_case("already"), "already");
/// ```
pub fn to_camel_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut capitalize_next = false;

    for c in s.chars() {
        if c == '_' && !result.is_empty() {
            capitalize_next = true;
        } else if capitalize_next {
            result.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }

    result
}

/// Convert camelCase to snake_case.
///
/// ```
/// use freighter_transport::case::to_snake_case;
///
/// assert_eq!(to_snake_case("displayName"), "display_name");
/// assert_eq!(to_snake_case("already"), "already");
/// ```
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);

    for c in s.chars() {
        if c.is_uppercase() {
            if !result.is_empty() {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }

    result
}

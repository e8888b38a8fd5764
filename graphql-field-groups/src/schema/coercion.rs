//! Lenient result coercion of built-in scalars.
//!
//! The configuration store keeps most values as strings, so numbers arrive as `"3"` and
//! flags as `"1"`. Leaves are coerced to the declared scalar after resolution; a value that
//! cannot be coerced becomes `null` instead of a field error.

use apollo_compiler::schema::Type;
use serde_json_bytes::ByteString;

use super::resolver::ResolvedValue;
use crate::JsonValue;

pub(crate) fn coerce_result(ty: &Type, resolved: ResolvedValue) -> ResolvedValue {
    match resolved {
        ResolvedValue::List(items) => {
            let item_ty = ty.item_type();
            ResolvedValue::List(
                items
                    .into_iter()
                    .map(|item| coerce_result(item_ty, item))
                    .collect(),
            )
        }
        ResolvedValue::Leaf(JsonValue::Null) => ResolvedValue::null(),
        ResolvedValue::Leaf(json_value) if !ty.is_list() => {
            ResolvedValue::Leaf(coerce_leaf(ty.inner_named_type().as_str(), json_value))
        }
        other => other,
    }
}

fn coerce_leaf(type_name: &str, value: JsonValue) -> JsonValue {
    match type_name {
        "Int" => coerce_int(&value),
        "Float" => coerce_float(&value),
        "String" => coerce_string(value),
        "Boolean" => coerce_boolean(&value),
        "ID" => coerce_id(value),
        // Custom scalar: passed through
        _ => Some(value),
    }
    .unwrap_or(JsonValue::Null)
}

fn coerce_int(value: &JsonValue) -> Option<JsonValue> {
    let int = match value {
        JsonValue::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        JsonValue::String(s) => parse_int(s.as_str()),
        JsonValue::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }?;
    i32::try_from(int).ok().map(|int| JsonValue::from(i64::from(int)))
}

fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim();
    s.parse::<i64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().filter(|f| f.fract() == 0.0).map(|f| f as i64))
}

fn coerce_float(value: &JsonValue) -> Option<JsonValue> {
    let float = match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.as_str().trim().parse::<f64>().ok(),
        _ => None,
    }?;
    serde_json::Number::from_f64(float).map(JsonValue::Number)
}

fn coerce_string(value: JsonValue) -> Option<JsonValue> {
    match value {
        JsonValue::String(_) => Some(value),
        JsonValue::Number(n) => Some(JsonValue::String(ByteString::from(n.to_string()))),
        _ => None,
    }
}

fn coerce_boolean(value: &JsonValue) -> Option<JsonValue> {
    match value {
        JsonValue::Bool(b) => Some(JsonValue::Bool(*b)),
        JsonValue::Number(n) => n.as_f64().map(|f| JsonValue::Bool(f != 0.0)),
        JsonValue::String(s) => match s.as_str().trim() {
            "1" | "true" => Some(JsonValue::Bool(true)),
            "" | "0" | "false" => Some(JsonValue::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_id(value: JsonValue) -> Option<JsonValue> {
    match value {
        JsonValue::String(_) => Some(value),
        JsonValue::Number(ref n) if n.is_i64() || n.is_u64() => {
            Some(JsonValue::String(ByteString::from(n.to_string())))
        }
        _ => None,
    }
}

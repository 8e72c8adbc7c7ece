//! JSON codec backed by `serde_json`. Output is pretty-printed with 4-space
//! indentation; object keys are sorted (serde_json's default object map is
//! ordered by key).

use serde::Serialize;

use crate::error::MapError;
use crate::value::Value;

/// Parse JSON text into named fields. The top level must be an object.
pub fn parse(text: &str) -> Result<Vec<(String, Value)>, MapError> {
    let parsed: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| MapError::Content(format!("invalid JSON: {}", e)))?;
    match parsed {
        serde_json::Value::Null => Ok(Vec::new()),
        serde_json::Value::Object(object) => Ok(object
            .into_iter()
            .map(|(key, val)| (key, from_json(val)))
            .collect()),
        other => Err(MapError::Content(format!(
            "expected an object at the top level, found {}",
            json_type_name(&other)
        ))),
    }
}

/// Serialize named fields to JSON text, 4-space indented, keys sorted.
pub fn dump(fields: &[(String, Value)]) -> Result<String, MapError> {
    let mut object = serde_json::Map::new();
    for (name, value) in fields {
        object.insert(name.clone(), to_json(value));
    }
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    serde_json::Value::Object(object)
        .serialize(&mut ser)
        .map_err(|e| MapError::Content(format!("cannot serialize JSON: {}", e)))?;
    let mut text = String::from_utf8(buf)
        .map_err(|e| MapError::Content(format!("non-UTF-8 JSON output: {}", e)))?;
    text.push('\n');
    Ok(text)
}

// ---------------------------------------------------------------------------
// Value conversion
// ---------------------------------------------------------------------------

fn from_json(v: serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::Null
            }
        }
        serde_json::Value::String(s) => Value::Str(s),
        serde_json::Value::Array(items) => {
            Value::Seq(items.into_iter().map(from_json).collect())
        }
        serde_json::Value::Object(object) => Value::Map(
            object
                .into_iter()
                .map(|(key, val)| (key, from_json(val)))
                .collect(),
        ),
    }
}

fn to_json(v: &Value) -> serde_json::Value {
    match v {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::Number((*i).into()),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Str(s) => serde_json::Value::String(s.clone()),
        Value::Seq(items) => {
            serde_json::Value::Array(items.iter().map(to_json).collect())
        }
        Value::Map(entries) => {
            let mut object = serde_json::Map::new();
            for (name, value) in entries {
                object.insert(name.clone(), to_json(value));
            }
            serde_json::Value::Object(object)
        }
    }
}

fn json_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

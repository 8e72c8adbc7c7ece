//! YAML codec backed by `serde_yaml`. Block style on output; mapping key
//! order follows the field order handed to `dump`.

use crate::error::MapError;
use crate::value::Value;

/// Parse YAML text into ordered named fields.
///
/// The top level must be a mapping (or nothing at all). A bare scalar or
/// sequence at the top level is a content error.
pub fn parse(text: &str) -> Result<Vec<(String, Value)>, MapError> {
    let parsed: serde_yaml::Value = serde_yaml::from_str(text)
        .map_err(|e| MapError::Content(format!("invalid YAML: {}", e)))?;
    match parsed {
        serde_yaml::Value::Null => Ok(Vec::new()),
        serde_yaml::Value::Mapping(mapping) => {
            let mut fields = Vec::with_capacity(mapping.len());
            for (key, val) in mapping {
                fields.push((key_text(&key), from_yaml(val)));
            }
            Ok(fields)
        }
        other => Err(MapError::Content(format!(
            "expected a mapping at the top level, found {}",
            yaml_type_name(&other)
        ))),
    }
}

/// Serialize ordered named fields to YAML text.
pub fn dump(fields: &[(String, Value)]) -> Result<String, MapError> {
    let mut mapping = serde_yaml::Mapping::with_capacity(fields.len());
    for (name, value) in fields {
        mapping.insert(
            serde_yaml::Value::String(name.clone()),
            to_yaml(value),
        );
    }
    serde_yaml::to_string(&serde_yaml::Value::Mapping(mapping))
        .map_err(|e| MapError::Content(format!("cannot serialize YAML: {}", e)))
}

// ---------------------------------------------------------------------------
// Value conversion
// ---------------------------------------------------------------------------

fn from_yaml(v: serde_yaml::Value) -> Value {
    match v {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::Null
            }
        }
        serde_yaml::Value::String(s) => Value::Str(s),
        serde_yaml::Value::Sequence(items) => {
            Value::Seq(items.into_iter().map(from_yaml).collect())
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut entries = Vec::with_capacity(mapping.len());
            for (key, val) in mapping {
                entries.push((key_text(&key), from_yaml(val)));
            }
            Value::Map(entries)
        }
        // Tags carry no meaning for a keyed record store; keep the payload.
        serde_yaml::Value::Tagged(tagged) => from_yaml(tagged.value),
    }
}

fn to_yaml(v: &Value) -> serde_yaml::Value {
    match v {
        Value::Null => serde_yaml::Value::Null,
        Value::Bool(b) => serde_yaml::Value::Bool(*b),
        Value::Int(i) => serde_yaml::Value::Number((*i).into()),
        Value::Float(f) => serde_yaml::Value::Number((*f).into()),
        Value::Str(s) => serde_yaml::Value::String(s.clone()),
        Value::Seq(items) => {
            serde_yaml::Value::Sequence(items.iter().map(to_yaml).collect())
        }
        Value::Map(entries) => {
            let mut mapping = serde_yaml::Mapping::with_capacity(entries.len());
            for (name, value) in entries {
                mapping.insert(serde_yaml::Value::String(name.clone()), to_yaml(value));
            }
            serde_yaml::Value::Mapping(mapping)
        }
    }
}

fn key_text(key: &serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        other => format!("{:?}", other),
    }
}

fn yaml_type_name(v: &serde_yaml::Value) -> &'static str {
    match v {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a sequence",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}

//! Keyed container — an ordered record of named, converter-typed fields.

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use crate::convert::{Attr, Converter};
use crate::error::MapError;
use crate::value::Value;

// ---------------------------------------------------------------------------
// RecordSchema
// ---------------------------------------------------------------------------

/// Callback invoked with the fully resolved record after an update.
pub type Initializer = dyn Fn(&mut Record) -> Result<(), String>;

/// Ordered field-name → converter registry for a keyed container.
///
/// The registry is append-only: `register_field` appends a new field or
/// explicitly re-declares an existing one; nothing is ever removed.
#[derive(Clone, Default)]
pub struct RecordSchema {
    fields: Vec<(String, Converter)>,
    initializer: Option<Rc<Initializer>>,
}

impl RecordSchema {
    pub fn new() -> Self {
        RecordSchema {
            fields: Vec::new(),
            initializer: None,
        }
    }

    /// Builder: declare a field.
    pub fn field(mut self, name: &str, converter: Converter) -> Self {
        self.register_field(name, converter);
        self
    }

    /// Builder: attach a validation/initialization callback. A failing
    /// callback is logged and the converted values are kept.
    pub fn with_initializer<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Record) -> Result<(), String> + 'static,
    {
        self.initializer = Some(Rc::new(f));
        self
    }

    /// Append a field, or re-declare an existing field's converter.
    pub fn register_field(&mut self, name: &str, converter: Converter) {
        if let Some(entry) = self.fields.iter_mut().find(|(n, _)| n == name) {
            entry.1 = converter;
        } else {
            self.fields.push((name.to_string(), converter));
        }
    }

    /// Look up the converter registered for a field.
    pub fn converter(&self, name: &str) -> Option<&Converter> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    /// Declared fields in declaration order.
    pub fn fields(&self) -> &[(String, Converter)] {
        &self.fields
    }

    /// Declared field names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn initializer(&self) -> Option<Rc<Initializer>> {
        self.initializer.clone()
    }
}

impl fmt::Debug for RecordSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordSchema")
            .field("fields", &self.fields)
            .field("initializer", &self.initializer.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// The runtime keyed container. Field slots always mirror the schema's
/// declaration order.
#[derive(Debug)]
pub struct Record {
    schema: RecordSchema,
    fields: Vec<(String, Attr)>,
}

impl Record {
    /// Build a record with every declared field at its converter default.
    pub fn from_schema(schema: RecordSchema) -> Record {
        let fields = schema
            .fields()
            .iter()
            .map(|(name, conv)| (name.clone(), conv.default_value()))
            .collect();
        Record { schema, fields }
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    pub fn get(&self, name: &str) -> Option<&Attr> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, a)| a)
    }

    /// Field names in declaration order.
    pub fn names(&self) -> Vec<String> {
        self.fields.iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Attr> {
        self.fields
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, a)| a)
    }

    /// Set a single field from a raw value.
    ///
    /// An unregistered name is adopted with an inferred converter when
    /// `auto_track` is on; otherwise the write is a conversion error (an
    /// explicit write silently dropped would hide data loss).
    pub fn set(&mut self, name: &str, raw: &Value, auto_track: bool) -> Result<(), MapError> {
        if self.schema.converter(name).is_none() {
            if auto_track {
                self.adopt_field(name, raw);
            } else {
                return Err(MapError::Conversion(format!(
                    "no converter registered for field '{}'",
                    name
                )));
            }
        }
        let conv = self.schema.converter(name).cloned().unwrap_or(Converter::Opaque);
        let slot = match self.slot_mut(name) {
            Some(slot) => slot,
            None => return Err(MapError::Conversion(format!("field '{}' has no slot", name))),
        };
        conv.update_value(slot, raw, auto_track)
    }

    /// Refresh the whole record from a raw value.
    ///
    /// Input fields apply in input order; registered fields absent from the
    /// input degrade to converter defaults; unknown input fields are adopted
    /// (auto-track on) or skipped with a debug log (auto-track off). The
    /// schema initializer, if any, runs last — its failure is logged, not
    /// propagated.
    pub fn update(&mut self, raw: &Value, auto_track: bool) -> Result<(), MapError> {
        let entries = normalize_keyed(raw)?;

        let mut applied: HashSet<String> = HashSet::new();
        for (key, rawv) in &entries {
            if self.schema.converter(key).is_none() {
                if auto_track {
                    self.adopt_field(key, rawv);
                } else {
                    tracing::debug!(field = %key, "unknown field skipped, auto-track off");
                    continue;
                }
            }
            let conv = self
                .schema
                .converter(key)
                .cloned()
                .unwrap_or(Converter::Opaque);
            if let Some(slot) = self.slot_mut(key) {
                conv.update_value(slot, rawv, auto_track)?;
            }
            applied.insert(key.clone());
        }

        // Registered fields missing from the input fall back to defaults.
        let declared: Vec<(String, Converter)> = self.schema.fields().to_vec();
        for (name, conv) in declared {
            if !applied.contains(&name) {
                if let Some(slot) = self.slot_mut(&name) {
                    *slot = conv.default_value();
                }
            }
        }

        if let Some(init) = self.schema.initializer() {
            if let Err(msg) = init.as_ref()(self) {
                tracing::warn!(error = %msg, "record initializer failed, keeping converted values");
            }
        }
        Ok(())
    }

    /// Serialize declared fields only, in declaration order.
    pub fn to_data(&self) -> Value {
        let mut out = Vec::with_capacity(self.schema.len());
        for (name, conv) in self.schema.fields() {
            let data = match self.get(name) {
                Some(attr) => conv.to_data(attr),
                None => conv.to_data(&conv.default_value()),
            };
            out.push((name.clone(), data));
        }
        Value::Map(out)
    }

    /// Register an inferred converter for a new field and materialize its
    /// default slot.
    fn adopt_field(&mut self, name: &str, raw: &Value) {
        let conv = Converter::infer(raw);
        self.schema.register_field(name, conv.clone());
        self.fields.push((name.to_string(), conv.default_value()));
    }
}

/// Normalize keyed input: mappings pass through, `"key=value"` and bare
/// `"key"` strings become single-entry records, null is empty.
fn normalize_keyed(raw: &Value) -> Result<Vec<(String, Value)>, MapError> {
    match raw {
        Value::Map(entries) => Ok(entries.clone()),
        Value::Null => Ok(Vec::new()),
        Value::Str(s) => {
            let t = s.trim();
            if t.is_empty() {
                Ok(Vec::new())
            } else if let Some((key, val)) = t.split_once('=') {
                Ok(vec![(
                    key.trim().to_string(),
                    Value::Str(val.trim().to_string()),
                )])
            } else {
                Ok(vec![(t.to_string(), Value::Null)])
            }
        }
        other => Err(MapError::Conversion(format!(
            "cannot update a keyed record from {}",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ListSchema;
    use std::cell::Cell;
    use std::rc::Rc;

    fn sample_schema() -> RecordSchema {
        RecordSchema::new()
            .field("name", Converter::string())
            .field("count", Converter::Int)
            .field("ready", Converter::Bool)
    }

    fn map(entries: Vec<(&str, Value)>) -> Value {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    // --- Schema ---

    #[test]
    fn schema_keeps_declaration_order() {
        let schema = sample_schema();
        assert_eq!(schema.names(), vec!["name", "count", "ready"]);
    }

    #[test]
    fn register_field_redeclares_in_place() {
        let mut schema = sample_schema();
        schema.register_field("count", Converter::Float);
        assert_eq!(schema.len(), 3);
        assert!(matches!(schema.converter("count"), Some(Converter::Float)));
        // Order unchanged by re-declaration.
        assert_eq!(schema.names(), vec!["name", "count", "ready"]);
    }

    // --- Defaults ---

    #[test]
    fn from_schema_fills_defaults() {
        let record = Record::from_schema(sample_schema());
        assert!(matches!(record.get("name"), Some(Attr::Str(s)) if s.is_empty()));
        assert!(matches!(record.get("count"), Some(Attr::Int(0))));
        assert!(matches!(record.get("ready"), Some(Attr::Bool(false))));
    }

    #[test]
    fn missing_input_keys_degrade_to_defaults() {
        let mut record = Record::from_schema(sample_schema());
        record
            .update(&map(vec![("count", Value::Int(9))]), false)
            .unwrap();
        assert!(matches!(record.get("count"), Some(Attr::Int(9))));
        assert!(matches!(record.get("name"), Some(Attr::Str(s)) if s.is_empty()));
        assert!(matches!(record.get("ready"), Some(Attr::Bool(false))));
    }

    // --- Update ---

    #[test]
    fn update_converts_each_field() {
        let mut record = Record::from_schema(sample_schema());
        record
            .update(
                &map(vec![
                    ("name", Value::Int(12)),
                    ("count", Value::Str("42".into())),
                    ("ready", Value::Str("no".into())),
                ]),
                false,
            )
            .unwrap();
        assert!(matches!(record.get("name"), Some(Attr::Str(s)) if s == "12"));
        assert!(matches!(record.get("count"), Some(Attr::Int(42))));
        assert!(matches!(record.get("ready"), Some(Attr::Bool(false))));
    }

    #[test]
    fn update_from_delimiter_string() {
        let mut record = Record::from_schema(sample_schema());
        record.update(&Value::Str("count=7".into()), false).unwrap();
        assert!(matches!(record.get("count"), Some(Attr::Int(7))));
    }

    #[test]
    fn update_from_bare_key_string() {
        let mut record = Record::from_schema(sample_schema());
        record
            .update(&map(vec![("count", Value::Int(5))]), false)
            .unwrap();
        record.update(&Value::Str("count".into()), false).unwrap();
        // Bare key carries no value; the field degrades to its default.
        assert!(matches!(record.get("count"), Some(Attr::Int(0))));
    }

    #[test]
    fn update_from_null_resets_to_defaults() {
        let mut record = Record::from_schema(sample_schema());
        record
            .update(&map(vec![("count", Value::Int(5))]), false)
            .unwrap();
        record.update(&Value::Null, false).unwrap();
        assert!(matches!(record.get("count"), Some(Attr::Int(0))));
    }

    #[test]
    fn update_rejects_scalar_input() {
        let mut record = Record::from_schema(sample_schema());
        let result = record.update(&Value::Int(3), false);
        assert!(matches!(result, Err(MapError::Conversion(_))));
    }

    // --- Unknown fields ---

    #[test]
    fn auto_track_adopts_unknown_field() {
        let mut record = Record::from_schema(sample_schema());
        record
            .update(&map(vec![("extra", Value::Int(5))]), true)
            .unwrap();
        assert!(matches!(record.get("extra"), Some(Attr::Int(5))));
        assert!(matches!(record.schema().converter("extra"), Some(Converter::Int)));
    }

    #[test]
    fn unknown_field_skipped_without_auto_track() {
        let mut record = Record::from_schema(sample_schema());
        record
            .update(&map(vec![("extra", Value::Int(5))]), false)
            .unwrap();
        assert!(record.get("extra").is_none());
        assert!(record.schema().converter("extra").is_none());
    }

    #[test]
    fn set_unknown_field_errors_without_auto_track() {
        let mut record = Record::from_schema(sample_schema());
        let result = record.set("extra", &Value::Int(5), false);
        assert!(matches!(result, Err(MapError::Conversion(_))));
    }

    // --- Nesting and identity ---

    fn nested_schema() -> RecordSchema {
        RecordSchema::new()
            .field("title", Converter::string())
            .field(
                "inner",
                Converter::Record(
                    RecordSchema::new().field("depth", Converter::Int),
                ),
            )
            .field(
                "tags",
                Converter::List(ListSchema::new(Converter::string())),
            )
    }

    #[test]
    fn nested_update_recurses() {
        let mut record = Record::from_schema(nested_schema());
        record
            .update(
                &map(vec![(
                    "inner",
                    map(vec![("depth", Value::Int(3))]),
                )]),
                false,
            )
            .unwrap();
        let inner = match record.get("inner") {
            Some(Attr::Record(node)) => node.clone(),
            other => panic!("expected record, got {:?}", other),
        };
        assert!(matches!(inner.borrow().get("depth"), Some(Attr::Int(3))));
    }

    #[test]
    fn nested_container_identity_preserved() {
        let mut record = Record::from_schema(nested_schema());
        let before = match record.get("inner") {
            Some(Attr::Record(node)) => node.clone(),
            _ => unreachable!(),
        };
        record
            .update(
                &map(vec![("inner", map(vec![("depth", Value::Int(8))]))]),
                false,
            )
            .unwrap();
        let after = match record.get("inner") {
            Some(Attr::Record(node)) => node.clone(),
            _ => unreachable!(),
        };
        assert!(Rc::ptr_eq(&before, &after));
        assert!(matches!(before.borrow().get("depth"), Some(Attr::Int(8))));
    }

    // --- Serialization ---

    #[test]
    fn to_data_uses_declaration_order() {
        let mut record = Record::from_schema(sample_schema());
        record
            .update(
                &map(vec![
                    ("ready", Value::Bool(true)),
                    ("name", Value::Str("a".into())),
                ]),
                false,
            )
            .unwrap();
        match record.to_data() {
            Value::Map(entries) => {
                let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(keys, vec!["name", "count", "ready"]);
            }
            other => panic!("expected map, got {:?}", other),
        }
    }

    #[test]
    fn to_data_serializes_only_declared_fields() {
        let mut record = Record::from_schema(sample_schema());
        record
            .update(&map(vec![("hidden", Value::Int(1))]), false)
            .unwrap();
        match record.to_data() {
            Value::Map(entries) => assert_eq!(entries.len(), 3),
            other => panic!("expected map, got {:?}", other),
        }
    }

    // --- Initializer ---

    #[test]
    fn failing_initializer_keeps_values() {
        let calls = Rc::new(Cell::new(0u32));
        let calls_seen = calls.clone();
        let schema = RecordSchema::new()
            .field("count", Converter::Int)
            .with_initializer(move |_record| {
                calls_seen.set(calls_seen.get() + 1);
                Err("rejected".to_string())
            });
        let mut record = Record::from_schema(schema);
        record
            .update(&map(vec![("count", Value::Int(3))]), false)
            .unwrap();
        assert_eq!(calls.get(), 1);
        assert!(matches!(record.get("count"), Some(Attr::Int(3))));
    }

    #[test]
    fn initializer_can_adjust_record() {
        let schema = RecordSchema::new()
            .field("count", Converter::Int)
            .with_initializer(|record| {
                record.set("count", &Value::Int(99), false).map_err(|e| e.to_string())
            });
        let mut record = Record::from_schema(schema);
        record.update(&Value::Null, false).unwrap();
        assert!(matches!(record.get("count"), Some(Attr::Int(99))));
    }
}

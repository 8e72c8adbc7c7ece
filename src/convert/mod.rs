//! The bidirectional converter framework.
//!
//! A `Converter` turns a parsed raw `Value` into a canonical `Attr`
//! (`to_value`), refreshes an existing attribute in place (`update_value`,
//! identity-preserving for containers), and produces a serializable raw form
//! (`to_data`). Scalar conversions are pure and total; container conversions
//! recurse through `Record`/`List` nodes.

pub mod scalar;

use std::cell::RefCell;
use std::rc::Rc;

use crate::container::{List, ListSchema, Record, RecordSchema};
use crate::error::MapError;
use crate::value::Value;

// ---------------------------------------------------------------------------
// Converter
// ---------------------------------------------------------------------------

/// Conversion strategy for a single field.
#[derive(Debug, Clone)]
pub enum Converter {
    /// Textual values. With `retype` on, boolean- and numeric-looking strings
    /// are re-emitted as native scalars on serialization.
    Str { retype: bool },
    Int,
    Float,
    Bool,
    /// Identity pass-through for values of unknown or variable shape.
    Opaque,
    /// Keyed container described by a schema.
    Record(RecordSchema),
    /// Sequence container described by a schema.
    List(ListSchema),
}

impl Converter {
    /// Plain string converter (no serialization retyping).
    pub fn string() -> Converter {
        Converter::Str { retype: false }
    }

    /// String converter that re-infers tighter scalar types on serialization.
    pub fn retyping_string() -> Converter {
        Converter::Str { retype: true }
    }

    /// Infer a converter for a raw value with no registered converter.
    ///
    /// Scalars map to their matching converter; null, mappings, and
    /// sequences fall back to opaque. Total: every raw a codec can produce
    /// has an inferred converter.
    pub fn infer(raw: &Value) -> Converter {
        match raw {
            Value::Str(_) => Converter::Str { retype: false },
            Value::Bool(_) => Converter::Bool,
            Value::Int(_) => Converter::Int,
            Value::Float(_) => Converter::Float,
            Value::Null | Value::Seq(_) | Value::Map(_) => Converter::Opaque,
        }
    }

    /// The default attribute value for this converter.
    pub fn default_value(&self) -> Attr {
        match self {
            Converter::Str { .. } => Attr::Str(String::new()),
            Converter::Int => Attr::Int(0),
            Converter::Float => Attr::Float(0.0),
            Converter::Bool => Attr::Bool(false),
            Converter::Opaque => Attr::Opaque(Value::Null),
            Converter::Record(schema) => Attr::Record(Rc::new(RefCell::new(
                Record::from_schema(schema.clone()),
            ))),
            Converter::List(schema) => {
                Attr::List(Rc::new(RefCell::new(List::from_schema(schema.clone()))))
            }
        }
    }

    /// Convert a raw value into a fresh canonical attribute.
    pub fn to_value(&self, raw: &Value, auto_track: bool) -> Result<Attr, MapError> {
        match self {
            Converter::Str { .. } => Ok(Attr::Str(scalar::string_value(raw))),
            Converter::Int => Ok(Attr::Int(scalar::int_value(raw))),
            Converter::Float => Ok(Attr::Float(scalar::float_value(raw))),
            Converter::Bool => Ok(Attr::Bool(scalar::bool_value(raw))),
            Converter::Opaque => Ok(Attr::Opaque(raw.clone())),
            Converter::Record(schema) => {
                let mut record = Record::from_schema(schema.clone());
                record.update(raw, auto_track)?;
                Ok(Attr::Record(Rc::new(RefCell::new(record))))
            }
            Converter::List(schema) => {
                let mut list = List::from_schema(schema.clone());
                list.update(raw, auto_track)?;
                Ok(Attr::List(Rc::new(RefCell::new(list))))
            }
        }
    }

    /// Refresh an existing attribute from a raw value.
    ///
    /// A container attribute matching this converter's container kind is
    /// updated in place — the node keeps its identity so handles taken
    /// before a reload still observe it afterwards. Anything else is fully
    /// converted first, then assigned.
    pub fn update_value(
        &self,
        attr: &mut Attr,
        raw: &Value,
        auto_track: bool,
    ) -> Result<(), MapError> {
        if let (Converter::Record(_), Attr::Record(node)) = (self, &*attr) {
            let node = node.clone();
            return node.borrow_mut().update(raw, auto_track);
        }
        if let (Converter::List(_), Attr::List(node)) = (self, &*attr) {
            let node = node.clone();
            return node.borrow_mut().update(raw, auto_track);
        }
        *attr = self.to_value(raw, auto_track)?;
        Ok(())
    }

    /// Produce the serializable raw form of an attribute.
    pub fn to_data(&self, attr: &Attr) -> Value {
        match (self, attr) {
            (Converter::Str { retype: true }, Attr::Str(s)) => scalar::retype_string(s),
            (Converter::Str { retype: false }, Attr::Str(s)) => Value::Str(s.clone()),
            (Converter::Int, Attr::Int(i)) => Value::Int(*i),
            (Converter::Float, Attr::Float(f)) => Value::Float(*f),
            (Converter::Bool, Attr::Bool(b)) => Value::Bool(*b),
            (Converter::Opaque, Attr::Opaque(v)) => v.clone(),
            (Converter::Record(_), Attr::Record(node)) => node.borrow().to_data(),
            (Converter::List(_), Attr::List(node)) => node.borrow().to_data(),
            // Attribute kind drifted from the declared converter; serialize
            // what is actually there.
            (_, other) => other.to_raw(),
        }
    }
}

// ---------------------------------------------------------------------------
// Attr — canonical attribute value
// ---------------------------------------------------------------------------

/// The canonical in-memory value of a mapped field. Containers are shared
/// nodes so nested handles survive reloads.
#[derive(Debug, Clone)]
pub enum Attr {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Opaque(Value),
    Record(Rc<RefCell<Record>>),
    List(Rc<RefCell<List>>),
}

impl Attr {
    /// Serialize without converter knowledge (converter-mismatch fallback
    /// and diagnostics).
    pub fn to_raw(&self) -> Value {
        match self {
            Attr::Str(s) => Value::Str(s.clone()),
            Attr::Int(i) => Value::Int(*i),
            Attr::Float(f) => Value::Float(*f),
            Attr::Bool(b) => Value::Bool(*b),
            Attr::Opaque(v) => v.clone(),
            Attr::Record(node) => node.borrow().to_data(),
            Attr::List(node) => node.borrow().to_data(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Attr::Str(_) => "string",
            Attr::Int(_) => "int",
            Attr::Float(_) => "float",
            Attr::Bool(_) => "bool",
            Attr::Opaque(_) => "opaque",
            Attr::Record(_) => "record",
            Attr::List(_) => "list",
        }
    }
}

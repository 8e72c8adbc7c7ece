//! Sequence container — a homogeneous list of converter-typed items.

use crate::convert::{Attr, Converter};
use crate::error::MapError;
use crate::value::Value;

// ---------------------------------------------------------------------------
// ListSchema
// ---------------------------------------------------------------------------

/// Item converter plus serialization options for a sequence container.
#[derive(Debug, Clone)]
pub struct ListSchema {
    item: Box<Converter>,
    sorted: bool,
}

impl ListSchema {
    pub fn new(item: Converter) -> Self {
        ListSchema {
            item: Box::new(item),
            sorted: false,
        }
    }

    /// Variant that sorts serialized output (ascending, natural order)
    /// without touching the in-memory order.
    pub fn sorted(item: Converter) -> Self {
        ListSchema {
            item: Box::new(item),
            sorted: true,
        }
    }

    pub fn item(&self) -> &Converter {
        &self.item
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

/// The runtime sequence container.
#[derive(Debug)]
pub struct List {
    schema: ListSchema,
    items: Vec<Attr>,
}

impl List {
    pub fn from_schema(schema: ListSchema) -> List {
        List {
            schema,
            items: Vec::new(),
        }
    }

    pub fn schema(&self) -> &ListSchema {
        &self.schema
    }

    pub fn get(&self, index: usize) -> Option<&Attr> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[Attr] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Refresh the whole list from a raw value.
    ///
    /// Existing container items at matching positions are updated in place
    /// (identity-preserving); everything else converts fresh through the item
    /// converter. The new contents are built completely before replacing the
    /// old, so no partially converted state is ever observable.
    pub fn update(&mut self, raw: &Value, auto_track: bool) -> Result<(), MapError> {
        let normalized = normalize_sequence(raw)?;
        let conv = self.schema.item().clone();

        let mut fresh = Vec::with_capacity(normalized.len());
        for (index, rawv) in normalized.iter().enumerate() {
            let reusable = matches!(
                (self.items.get(index), &conv),
                (Some(Attr::Record(_)), Converter::Record(_))
                    | (Some(Attr::List(_)), Converter::List(_))
            );
            if reusable {
                let mut attr = self.items[index].clone();
                conv.update_value(&mut attr, rawv, auto_track)?;
                fresh.push(attr);
            } else {
                fresh.push(conv.to_value(rawv, auto_track)?);
            }
        }
        self.items = fresh;
        Ok(())
    }

    /// Append one item converted through the item converter.
    pub fn push(&mut self, raw: &Value, auto_track: bool) -> Result<(), MapError> {
        let attr = self.schema.item().clone().to_value(raw, auto_track)?;
        self.items.push(attr);
        Ok(())
    }

    /// Replace the item at `index`.
    pub fn set_item(&mut self, index: usize, raw: &Value, auto_track: bool) -> Result<(), MapError> {
        if index >= self.items.len() {
            return Err(MapError::Conversion(format!(
                "index {} out of bounds for sequence of length {}",
                index,
                self.items.len()
            )));
        }
        let conv = self.schema.item().clone();
        conv.update_value(&mut self.items[index], raw, auto_track)
    }

    /// Remove and return the item at `index`, if present.
    pub fn remove(&mut self, index: usize) -> Option<Attr> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// Serialize every item through the item converter.
    ///
    /// An empty list serializes as a single null placeholder item — the
    /// serialized form always carries at least one entry. The sorted variant
    /// orders the output without mutating the in-memory items.
    pub fn to_data(&self) -> Value {
        if self.items.is_empty() {
            return Value::Seq(vec![Value::Null]);
        }
        let conv = self.schema.item();
        let mut out: Vec<Value> = self.items.iter().map(|attr| conv.to_data(attr)).collect();
        if self.schema.is_sorted() {
            out.sort_by(|a, b| a.natural_cmp(b));
        }
        Value::Seq(out)
    }
}

/// Normalize sequence input: lists pass through, delimiter strings split
/// (comma-first, else whitespace), lone scalars wrap into a singleton, null
/// is empty.
fn normalize_sequence(raw: &Value) -> Result<Vec<Value>, MapError> {
    match raw {
        // A lone null item is the serialized form of an empty list (the
        // placeholder `to_data` emits); decode it back to empty.
        Value::Seq(items) if items.len() == 1 && items[0] == Value::Null => Ok(Vec::new()),
        Value::Seq(items) => Ok(items.clone()),
        Value::Null => Ok(Vec::new()),
        Value::Str(s) => {
            let t = s.trim();
            if t.is_empty() {
                Ok(Vec::new())
            } else if t.contains(',') {
                Ok(t.split(',')
                    .map(|part| Value::Str(part.trim().to_string()))
                    .collect())
            } else {
                Ok(t.split_whitespace()
                    .map(|part| Value::Str(part.to_string()))
                    .collect())
            }
        }
        Value::Bool(_) | Value::Int(_) | Value::Float(_) => Ok(vec![raw.clone()]),
        Value::Map(_) => Err(MapError::Conversion(
            "cannot update a sequence from a mapping".to_string(),
        )),
    }
}

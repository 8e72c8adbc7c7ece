//! The interception contract — how reads and writes on a mapped record reach
//! the mapper.
//!
//! Every handle implements `Mappable`: reads call `pre_read` (reload when the
//! backing file changed), writes apply and then call `post_write` (save when
//! auto-save is on). Nested container handles carry a weak back-reference to
//! the one root mapper, so a mutation deep in the graph saves through it.
//! Field names with a leading underscore are exempt from both hooks.

use std::cell::RefCell;
use std::path::Path;
use std::rc::{Rc, Weak};

use crate::container::{List, Record};
use crate::convert::Attr;
use crate::error::MapError;
use crate::mapper::{Mapper, Policy};
use crate::value::Value;

// ---------------------------------------------------------------------------
// Mappable
// ---------------------------------------------------------------------------

/// Hook contract for anything whose reads and writes are bound to a mapper.
pub trait Mappable {
    /// The mapper this handle reaches, if its root is still alive.
    fn mapper(&self) -> Option<Rc<Mapper>>;

    /// Pre-read hook: refuse deleted mappings, reload stale content.
    fn pre_read(&self) -> Result<(), MapError> {
        if let Some(mapper) = self.mapper() {
            mapper.ensure_live()?;
            mapper.load_if_modified()?;
        }
        Ok(())
    }

    /// Post-write hook: refuse deleted mappings, save when auto-save is on.
    fn post_write(&self) -> Result<(), MapError> {
        if let Some(mapper) = self.mapper() {
            mapper.ensure_live()?;
            if mapper.policy().auto_save {
                mapper.save(false)?;
            }
        }
        Ok(())
    }
}

/// Names with a leading underscore never trigger load/save hooks.
fn hook_exempt(name: &str) -> bool {
    name.starts_with('_')
}

// ---------------------------------------------------------------------------
// FieldValue
// ---------------------------------------------------------------------------

/// Read-side projection of an attribute: scalars by value, containers as
/// handles bound to the root mapper.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Opaque(Value),
    Record(RecordRef),
    List(ListRef),
}

impl FieldValue {
    fn project(attr: &Attr, mapper: Weak<Mapper>) -> FieldValue {
        match attr {
            Attr::Str(s) => FieldValue::Str(s.clone()),
            Attr::Int(i) => FieldValue::Int(*i),
            Attr::Float(f) => FieldValue::Float(*f),
            Attr::Bool(b) => FieldValue::Bool(*b),
            Attr::Opaque(v) => FieldValue::Opaque(v.clone()),
            Attr::Record(node) => FieldValue::Record(RecordRef {
                node: node.clone(),
                mapper,
            }),
            Attr::List(node) => FieldValue::List(ListRef {
                node: node.clone(),
                mapper,
            }),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordRef> {
        match self {
            FieldValue::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListRef> {
        match self {
            FieldValue::List(l) => Some(l),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// MappedFile — the root handle
// ---------------------------------------------------------------------------

/// A record bound 1:1 to a backing file through its mapper.
#[derive(Debug)]
pub struct MappedFile {
    mapper: Rc<Mapper>,
}

impl Mappable for MappedFile {
    fn mapper(&self) -> Option<Rc<Mapper>> {
        Some(self.mapper.clone())
    }
}

impl MappedFile {
    pub fn from_mapper(mapper: Mapper) -> MappedFile {
        MappedFile {
            mapper: Rc::new(mapper),
        }
    }

    pub fn path(&self) -> &Path {
        self.mapper.path()
    }

    pub fn exists(&self) -> bool {
        self.mapper.exists()
    }

    pub fn deleted(&self) -> bool {
        self.mapper.deleted()
    }

    pub fn modified(&self) -> bool {
        self.mapper.modified()
    }

    /// Read a field, reloading first if the backing file changed.
    pub fn get(&self, name: &str) -> Result<FieldValue, MapError> {
        if !hook_exempt(name) {
            self.pre_read()?;
        }
        let root = self.mapper.root();
        let root = root.borrow();
        let attr = root.get(name).ok_or_else(|| {
            MapError::Conversion(format!("no converter registered for field '{}'", name))
        })?;
        Ok(FieldValue::project(attr, Rc::downgrade(&self.mapper)))
    }

    /// Write a field, saving afterwards when auto-save is on.
    pub fn set(&self, name: &str, value: Value) -> Result<(), MapError> {
        if !hook_exempt(name) {
            self.mapper.ensure_live()?;
        }
        {
            let root = self.mapper.root();
            let mut root = root.borrow_mut();
            root.set(name, &value, self.mapper.policy().auto_track)?;
        }
        if !hook_exempt(name) {
            self.post_write()?;
        }
        Ok(())
    }

    /// Handle on the root record itself.
    pub fn record(&self) -> RecordRef {
        RecordRef {
            node: self.mapper.root(),
            mapper: Rc::downgrade(&self.mapper),
        }
    }

    /// Explicit full load.
    pub fn load(&self) -> Result<(), MapError> {
        self.mapper.load()
    }

    /// Explicit full save, creating the backing file if needed.
    pub fn save(&self) -> Result<(), MapError> {
        self.mapper.save(true)
    }

    /// Delete the backing file; the mapping is dead until re-created.
    pub fn delete(&self) -> Result<(), MapError> {
        self.mapper.delete()
    }

    pub fn policy(&self) -> Policy {
        self.mapper.policy()
    }
}

// ---------------------------------------------------------------------------
// RecordRef — nested keyed handle
// ---------------------------------------------------------------------------

/// Handle on a (possibly nested) record node. Cheap to clone; all clones
/// observe the same node.
#[derive(Debug, Clone)]
pub struct RecordRef {
    node: Rc<RefCell<Record>>,
    mapper: Weak<Mapper>,
}

impl Mappable for RecordRef {
    fn mapper(&self) -> Option<Rc<Mapper>> {
        self.mapper.upgrade()
    }
}

impl RecordRef {
    pub fn get(&self, name: &str) -> Result<FieldValue, MapError> {
        if !hook_exempt(name) {
            self.pre_read()?;
        }
        let node = self.node.borrow();
        let attr = node.get(name).ok_or_else(|| {
            MapError::Conversion(format!("no converter registered for field '{}'", name))
        })?;
        Ok(FieldValue::project(attr, self.mapper.clone()))
    }

    pub fn set(&self, name: &str, value: Value) -> Result<(), MapError> {
        let auto_track = self
            .mapper()
            .map(|m| m.policy().auto_track)
            .unwrap_or(false);
        if !hook_exempt(name) {
            if let Some(mapper) = self.mapper() {
                mapper.ensure_live()?;
            }
        }
        self.node.borrow_mut().set(name, &value, auto_track)?;
        if !hook_exempt(name) {
            self.post_write()?;
        }
        Ok(())
    }

    /// Declared field names, refreshing from disk first.
    pub fn names(&self) -> Result<Vec<String>, MapError> {
        self.pre_read()?;
        Ok(self.node.borrow().names())
    }

    /// Whether two handles observe the same node.
    pub fn ptr_eq(&self, other: &RecordRef) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }
}

// ---------------------------------------------------------------------------
// ListRef — nested sequence handle
// ---------------------------------------------------------------------------

/// Handle on a (possibly nested) list node. Index reads pre-load; mutations
/// post-save, like record fields.
#[derive(Debug, Clone)]
pub struct ListRef {
    node: Rc<RefCell<List>>,
    mapper: Weak<Mapper>,
}

impl Mappable for ListRef {
    fn mapper(&self) -> Option<Rc<Mapper>> {
        self.mapper.upgrade()
    }
}

impl ListRef {
    pub fn len(&self) -> Result<usize, MapError> {
        self.pre_read()?;
        Ok(self.node.borrow().len())
    }

    pub fn is_empty(&self) -> Result<bool, MapError> {
        Ok(self.len()? == 0)
    }

    pub fn get(&self, index: usize) -> Result<FieldValue, MapError> {
        self.pre_read()?;
        let node = self.node.borrow();
        let attr = node.get(index).ok_or_else(|| {
            MapError::Conversion(format!(
                "index {} out of bounds for sequence of length {}",
                index,
                node.len()
            ))
        })?;
        Ok(FieldValue::project(attr, self.mapper.clone()))
    }

    pub fn set(&self, index: usize, value: Value) -> Result<(), MapError> {
        let auto_track = self
            .mapper()
            .map(|m| m.policy().auto_track)
            .unwrap_or(false);
        if let Some(mapper) = self.mapper() {
            mapper.ensure_live()?;
        }
        self.node.borrow_mut().set_item(index, &value, auto_track)?;
        self.post_write()
    }

    pub fn push(&self, value: Value) -> Result<(), MapError> {
        let auto_track = self
            .mapper()
            .map(|m| m.policy().auto_track)
            .unwrap_or(false);
        if let Some(mapper) = self.mapper() {
            mapper.ensure_live()?;
        }
        self.node.borrow_mut().push(&value, auto_track)?;
        self.post_write()
    }

    pub fn remove(&self, index: usize) -> Result<(), MapError> {
        if let Some(mapper) = self.mapper() {
            mapper.ensure_live()?;
        }
        let removed = self.node.borrow_mut().remove(index);
        if removed.is_none() {
            return Err(MapError::Conversion(format!(
                "index {} out of bounds",
                index
            )));
        }
        self.post_write()
    }

    /// Snapshot of all items, refreshing from disk first.
    pub fn values(&self) -> Result<Vec<FieldValue>, MapError> {
        self.pre_read()?;
        let node = self.node.borrow();
        Ok(node
            .items()
            .iter()
            .map(|attr| FieldValue::project(attr, self.mapper.clone()))
            .collect())
    }

    /// Whether two handles observe the same node.
    pub fn ptr_eq(&self, other: &ListRef) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }
}

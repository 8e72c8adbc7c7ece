//! The mapper — per-record controller owning a file path and the load/save
//! state machine.
//!
//! Lifecycle: unmapped → created → {loaded, stale} ⇄ … → deleted (terminal
//! until re-created). Staleness is detected by comparing a recorded
//! fingerprint against the store's current one. Reentrancy within one call
//! stack (a save triggered while a load applies values, or the reverse) is
//! suppressed with in-progress flags released on scope exit.

pub mod store;

pub use store::{Fingerprint, Store};

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::codec::Format;
use crate::container::{Record, RecordSchema};
use crate::error::MapError;
use crate::value::Value;

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Mapping policy flags.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Policy {
    /// Create the backing file on first save if it doesn't exist.
    pub auto_create: bool,
    /// Save after every tracked mutation.
    pub auto_save: bool,
    /// Adopt unknown fields encountered on load with inferred converters.
    pub auto_track: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Policy {
            auto_create: true,
            auto_save: true,
            auto_track: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Reentrancy guard
// ---------------------------------------------------------------------------

/// Sets a flag for the duration of a scope; releases on drop, so the flag
/// clears even when the guarded operation errors.
struct InProgress<'a>(&'a Cell<bool>);

impl<'a> InProgress<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        InProgress(flag)
    }
}

impl Drop for InProgress<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

// ---------------------------------------------------------------------------
// Mapper
// ---------------------------------------------------------------------------

/// Owns one backing path and one root record; every mapped object graph has
/// exactly one.
pub struct Mapper {
    path: PathBuf,
    format: Format,
    policy: Policy,
    store: Store,
    root: Rc<RefCell<Record>>,
    exists: Cell<bool>,
    deleted: Cell<bool>,
    fingerprint: Cell<Option<Fingerprint>>,
    in_load: Cell<bool>,
    in_save: Cell<bool>,
}

impl Mapper {
    /// Mapper over a real file. Format is selected by the path's extension.
    pub fn new(path: &Path, schema: RecordSchema, policy: Policy) -> Mapper {
        let store = Store::disk(path);
        let exists = store.exists();
        Mapper {
            path: path.to_path_buf(),
            format: Format::from_path(path),
            policy,
            store,
            root: Rc::new(RefCell::new(Record::from_schema(schema))),
            exists: Cell::new(exists),
            deleted: Cell::new(false),
            fingerprint: Cell::new(None),
            in_load: Cell::new(false),
            in_save: Cell::new(false),
        }
    }

    /// Mapper over an in-memory slot — no filesystem I/O, same semantics.
    pub fn fake(name: &str, schema: RecordSchema, policy: Policy) -> Mapper {
        let path = PathBuf::from(name);
        Mapper {
            format: Format::from_path(&path),
            path,
            policy,
            store: Store::fake(),
            root: Rc::new(RefCell::new(Record::from_schema(schema))),
            exists: Cell::new(false),
            deleted: Cell::new(false),
            fingerprint: Cell::new(None),
            in_load: Cell::new(false),
            in_save: Cell::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn root(&self) -> Rc<RefCell<Record>> {
        self.root.clone()
    }

    pub(crate) fn store(&self) -> &Store {
        &self.store
    }

    pub fn exists(&self) -> bool {
        self.exists.get()
    }

    pub fn deleted(&self) -> bool {
        self.deleted.get()
    }

    /// Error when the mapping has been deleted.
    pub fn ensure_live(&self) -> Result<(), MapError> {
        if self.deleted.get() {
            Err(MapError::DeletedFile(self.path.clone()))
        } else {
            Ok(())
        }
    }

    // -------------------------------------------------------------------
    // State machine
    // -------------------------------------------------------------------

    /// Create the backing slot. Idempotent: an existing file is never
    /// touched. Clears a prior deletion.
    pub fn create(&self) -> Result<(), MapError> {
        if !self.store.exists() {
            self.store.write("")?;
            // A freshly written empty slot parses to defaults, which is what
            // the root record already holds; mark it fresh. A pre-existing
            // file keeps its stale fingerprint so the next read loads it.
            self.fingerprint.set(self.store.fingerprint());
        }
        self.exists.set(true);
        self.deleted.set(false);
        Ok(())
    }

    /// True when the backing content has never been loaded, the mapping was
    /// deleted, or the file changed since the last load/save.
    pub fn modified(&self) -> bool {
        if self.deleted.get() {
            return true;
        }
        match self.fingerprint.get() {
            None => true,
            recorded => recorded != self.store.fingerprint(),
        }
    }

    /// Read, parse, and apply the backing content onto the root record.
    ///
    /// A no-op while a save on this mapper is in progress. Fields apply in
    /// the order the codec yields them; declared fields missing from the
    /// file degrade to converter defaults.
    pub fn load(&self) -> Result<(), MapError> {
        self.ensure_live()?;
        if self.in_save.get() || self.in_load.get() {
            return Ok(());
        }
        if !self.exists.get() {
            return Err(MapError::FileNotFound(self.path.clone()));
        }
        let _guard = InProgress::enter(&self.in_load);

        let text = self.store.read(&self.path)?;
        let fields = self.format.parse(&text)?;
        self.root
            .borrow_mut()
            .update(&Value::Map(fields), self.policy.auto_track)?;
        self.fingerprint.set(self.store.fingerprint());
        Ok(())
    }

    /// Load only when the backing content is stale.
    pub fn load_if_modified(&self) -> Result<(), MapError> {
        if self.modified() {
            self.load()?;
        }
        Ok(())
    }

    /// Serialize the root record and write it out.
    ///
    /// A no-op while a load on this mapper is in progress. Output is always
    /// in registry declaration order. With `force_create` (or the
    /// auto-create policy) a missing backing slot is created first.
    pub fn save(&self, force_create: bool) -> Result<(), MapError> {
        self.ensure_live()?;
        if self.in_load.get() || self.in_save.get() {
            return Ok(());
        }
        if !self.exists.get() {
            if force_create || self.policy.auto_create {
                self.create()?;
            } else {
                return Err(MapError::FileNotFound(self.path.clone()));
            }
        }
        let _guard = InProgress::enter(&self.in_save);

        let data = self.root.borrow().to_data();
        let fields = match data {
            Value::Map(fields) => fields,
            other => {
                return Err(MapError::Content(format!(
                    "root record serialized to {}",
                    other.type_name()
                )))
            }
        };
        let text = self.format.dump(&fields)?;
        self.store.write(&text)?;
        self.fingerprint.set(self.store.fingerprint());
        Ok(())
    }

    /// Delete the backing slot. Idempotent: a second call is a no-op.
    pub fn delete(&self) -> Result<(), MapError> {
        if self.deleted.get() {
            return Ok(());
        }
        if self.store.exists() {
            self.store.remove()?;
        }
        self.exists.set(false);
        self.deleted.set(true);
        Ok(())
    }
}

impl std::fmt::Debug for Mapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mapper")
            .field("path", &self.path)
            .field("format", &self.format)
            .field("exists", &self.exists.get())
            .field("deleted", &self.deleted.get())
            .finish()
    }
}

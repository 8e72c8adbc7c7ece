//! Registration surface — declare how a record maps to a path, then create,
//! find, or probe mappings.
//!
//! A `Binding` is an explicit configuration value: path template, field
//! schema, policy flags. No global registry is involved; whoever owns the
//! binding owns the schema it hands out.

pub mod path_template;

use std::path::{Path, PathBuf};

use crate::container::RecordSchema;
use crate::error::MapError;
use crate::mapped::MappedFile;
use crate::mapper::{Mapper, Policy};
use crate::value::Value;

// ---------------------------------------------------------------------------
// Binding
// ---------------------------------------------------------------------------

/// Declaration of a mapped record type: where its files live, which fields it
/// tracks, and how eagerly it syncs.
#[derive(Debug, Clone)]
pub struct Binding {
    path_template: String,
    schema: RecordSchema,
    policy: Policy,
    fake: bool,
}

impl Binding {
    pub fn new(path_template: &str, schema: RecordSchema) -> Binding {
        Binding {
            path_template: path_template.to_string(),
            schema,
            policy: Policy::default(),
            fake: false,
        }
    }

    /// Builder: override the default policy.
    pub fn policy(mut self, policy: Policy) -> Binding {
        self.policy = policy;
        self
    }

    /// Builder: back mappings with in-memory slots instead of files.
    pub fn fake(mut self) -> Binding {
        self.fake = true;
        self
    }

    pub fn path_template(&self) -> &str {
        &self.path_template
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    /// Render the backing path for a seed.
    pub fn path_for(&self, seed: &[(String, Value)]) -> Result<PathBuf, MapError> {
        Ok(PathBuf::from(path_template::render(
            &self.path_template,
            seed,
        )?))
    }

    // -------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------

    /// Create a new mapping. The backing slot must not already exist;
    /// otherwise this is a duplicate-mapping error. Seed fields are applied
    /// and the initial state is written out.
    pub fn create(&self, seed: &[(String, Value)]) -> Result<MappedFile, MapError> {
        let path = self.path_for(seed)?;
        let mapper = self.mapper_at(&path);
        if self.slot_exists(&mapper, &path) {
            return Err(MapError::DuplicateMapping(path));
        }
        mapper.create()?;
        {
            let root = mapper.root();
            let mut root = root.borrow_mut();
            for (name, value) in seed {
                root.set(name, value, self.policy.auto_track)?;
            }
        }
        mapper.save(true)?;
        Ok(MappedFile::from_mapper(mapper))
    }

    /// Open an existing mapping, eagerly loading its content. `Ok(None)`
    /// when no backing slot exists.
    pub fn find(&self, seed: &[(String, Value)]) -> Result<Option<MappedFile>, MapError> {
        let path = self.path_for(seed)?;
        let mapper = self.mapper_at(&path);
        if !self.slot_exists(&mapper, &path) {
            return Ok(None);
        }
        mapper.create()?;
        mapper.load()?;
        Ok(Some(MappedFile::from_mapper(mapper)))
    }

    /// Whether a backing slot exists for the seed, without constructing a
    /// mapping.
    pub fn matches(&self, seed: &[(String, Value)]) -> Result<bool, MapError> {
        let path = self.path_for(seed)?;
        if self.fake {
            // Fake slots live with their mapper; nothing persists to probe.
            return Ok(false);
        }
        Ok(path.exists())
    }

    fn mapper_at(&self, path: &Path) -> Mapper {
        if self.fake {
            Mapper::fake(&path.to_string_lossy(), self.schema.clone(), self.policy)
        } else {
            Mapper::new(path, self.schema.clone(), self.policy)
        }
    }

    fn slot_exists(&self, mapper: &Mapper, path: &Path) -> bool {
        if self.fake {
            mapper.exists()
        } else {
            path.exists()
        }
    }
}

//! filemap — attribute-to-file synchronization.
//!
//! Binds the fields of an in-memory record to a YAML or JSON file: reading a
//! bound field refreshes it from disk when the file changed, writing a bound
//! field persists the record back. The crate is built from five layers:
//!
//! - [`codec`]: text ⇄ ordered named raw values, dispatched by extension
//! - [`convert`]: the bidirectional converter framework and scalar coercions
//! - [`container`]: keyed and sequence containers with recursive,
//!   identity-preserving updates
//! - [`mapper`]: the per-record load/save state machine with staleness
//!   detection and reentrancy suppression
//! - [`mapped`] / [`bind`]: the explicit read/write hook surface and the
//!   declaration of path template, schema, and policy
//!
//! ```no_run
//! use filemap::{Binding, Converter, RecordSchema, Value};
//!
//! let schema = RecordSchema::new()
//!     .field("name", Converter::string())
//!     .field("count", Converter::Int);
//! let binding = Binding::new("state/{name}.yaml", schema);
//!
//! let file = binding.create(&[("name".into(), Value::Str("alpha".into()))])?;
//! file.set("count", Value::Int(42))?; // persisted immediately (auto-save)
//! let _count = file.get("count")?;    // reloads first if the file changed
//! # Ok::<(), filemap::MapError>(())
//! ```

pub mod bind;
pub mod codec;
pub mod container;
pub mod convert;
pub mod error;
pub mod mapped;
pub mod mapper;
pub mod value;

pub use bind::Binding;
pub use codec::Format;
pub use container::{List, ListSchema, Record, RecordSchema};
pub use convert::{Attr, Converter};
pub use error::MapError;
pub use mapped::{FieldValue, ListRef, Mappable, MappedFile, RecordRef};
pub use mapper::{Fingerprint, Mapper, Policy, Store};
pub use value::Value;

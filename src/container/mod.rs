//! Runtime containers and their schemas.
//!
//! The converter description (`RecordSchema`, `ListSchema`) is split from the
//! runtime value (`Record`, `List`); each container owns its schema instance,
//! so auto-tracking a field mutates that instance and nothing else.

pub mod list;
pub mod record;

pub use list::{List, ListSchema};
pub use record::{Record, RecordSchema};

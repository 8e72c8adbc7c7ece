//! Text codecs — convert an ordered set of named fields to and from text.
//!
//! Format selection is by file extension. Both codecs share the same
//! contract: empty text parses to an empty record, a top-level value that is
//! not a keyed record is a content error, and dump emits fields in the order
//! given (YAML) or sorted (JSON).

mod json;
mod yaml;

use std::path::Path;

use crate::error::MapError;
use crate::value::Value;

// ---------------------------------------------------------------------------
// Format
// ---------------------------------------------------------------------------

/// Backing text format, selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// Select a format from a path's extension. Unrecognized extensions fall
    /// back to YAML with a warning rather than an error.
    pub fn from_path(path: &Path) -> Format {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Format::Yaml,
            Some("json") => Format::Json,
            other => {
                tracing::warn!(
                    path = %path.display(),
                    extension = ?other,
                    "unrecognized file extension, defaulting to YAML"
                );
                Format::Yaml
            }
        }
    }

    /// Parse text into an ordered list of named raw values.
    pub fn parse(&self, text: &str) -> Result<Vec<(String, Value)>, MapError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        match self {
            Format::Yaml => yaml::parse(text),
            Format::Json => json::parse(text),
        }
    }

    /// Serialize an ordered list of named raw values to text.
    pub fn dump(&self, fields: &[(String, Value)]) -> Result<String, MapError> {
        match self {
            Format::Yaml => yaml::dump(fields),
            Format::Json => json::dump(fields),
        }
    }
}

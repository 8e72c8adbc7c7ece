use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Mapping errors
// ---------------------------------------------------------------------------

/// Errors surfaced by the mapping layer.
#[derive(Debug)]
pub enum MapError {
    /// Backing text is malformed or not a keyed record at the top level.
    Content(String),
    /// No converter can represent a value for the target field.
    Conversion(String),
    /// An operation was attempted on a deleted mapping.
    DeletedFile(PathBuf),
    /// A mapping already exists at the target path.
    DuplicateMapping(PathBuf),
    /// A backing file was expected to exist but doesn't.
    FileNotFound(PathBuf),
    /// Filesystem I/O error.
    Io(std::io::Error),
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::Content(msg) => write!(f, "content error: {}", msg),
            MapError::Conversion(msg) => write!(f, "conversion error: {}", msg),
            MapError::DeletedFile(path) => {
                write!(f, "mapping deleted: {}", path.display())
            }
            MapError::DuplicateMapping(path) => {
                write!(f, "mapping already exists: {}", path.display())
            }
            MapError::FileNotFound(path) => {
                write!(f, "backing file not found: {}", path.display())
            }
            MapError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for MapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MapError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MapError {
    fn from(e: std::io::Error) -> Self {
        MapError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_path() {
        let err = MapError::DeletedFile(PathBuf::from("/tmp/x.yaml"));
        assert!(err.to_string().contains("/tmp/x.yaml"));
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: MapError = io.into();
        assert!(matches!(err, MapError::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn content_error_has_no_source() {
        let err = MapError::Content("bad".into());
        assert!(std::error::Error::source(&err).is_none());
    }
}

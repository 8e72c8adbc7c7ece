//! Backing stores — the real filesystem and an in-memory fake.
//!
//! The fake store preserves every state-machine semantic (existence,
//! staleness, deletion) with no filesystem I/O, so the mapper can be tested
//! fast. Fingerprints detect external modification: mtime plus length on
//! disk, a version counter in fake mode.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::MapError;

// ---------------------------------------------------------------------------
// Fingerprint
// ---------------------------------------------------------------------------

/// Modification marker for staleness detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fingerprint {
    /// Disk: modification time and byte length. Length guards against
    /// rewrites within the mtime granularity window.
    Mtime(SystemTime, u64),
    /// Fake mode: write counter.
    Tick(u64),
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// In-memory slot backing a fake-mode store.
#[derive(Debug, Default)]
pub struct FakeSlot {
    text: Option<String>,
    version: u64,
}

/// Where the mapped text lives.
#[derive(Debug)]
pub enum Store {
    Disk(PathBuf),
    Fake(RefCell<FakeSlot>),
}

impl Store {
    pub fn disk(path: &Path) -> Store {
        Store::Disk(path.to_path_buf())
    }

    pub fn fake() -> Store {
        Store::Fake(RefCell::new(FakeSlot::default()))
    }

    /// Whether the backing slot currently holds content.
    pub fn exists(&self) -> bool {
        match self {
            Store::Disk(path) => path.exists(),
            Store::Fake(slot) => slot.borrow().text.is_some(),
        }
    }

    /// Read the backing text. Absence is a `FileNotFound` error.
    pub fn read(&self, path: &Path) -> Result<String, MapError> {
        match self {
            Store::Disk(disk_path) => match fs::read_to_string(disk_path) {
                Ok(text) => Ok(text),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Err(MapError::FileNotFound(path.to_path_buf()))
                }
                Err(e) => Err(MapError::Io(e)),
            },
            Store::Fake(slot) => slot
                .borrow()
                .text
                .clone()
                .ok_or_else(|| MapError::FileNotFound(path.to_path_buf())),
        }
    }

    /// Write the backing text, creating parent directories on disk.
    pub fn write(&self, text: &str) -> Result<(), MapError> {
        match self {
            Store::Disk(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent)?;
                    }
                }
                fs::write(path, text)?;
                Ok(())
            }
            Store::Fake(slot) => {
                let mut slot = slot.borrow_mut();
                slot.text = Some(text.to_string());
                slot.version += 1;
                Ok(())
            }
        }
    }

    /// Remove the backing slot. A file vanishing between the existence check
    /// and removal is logged and swallowed — removal is best-effort.
    pub fn remove(&self) -> Result<(), MapError> {
        match self {
            Store::Disk(path) => match fs::remove_file(path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!(path = %path.display(), "file already gone during removal");
                    Ok(())
                }
                Err(e) => Err(MapError::Io(e)),
            },
            Store::Fake(slot) => {
                let mut slot = slot.borrow_mut();
                slot.text = None;
                slot.version += 1;
                Ok(())
            }
        }
    }

    /// Current modification marker, `None` while the slot is absent.
    pub fn fingerprint(&self) -> Option<Fingerprint> {
        match self {
            Store::Disk(path) => {
                let meta = fs::metadata(path).ok()?;
                let mtime = meta.modified().ok()?;
                Some(Fingerprint::Mtime(mtime, meta.len()))
            }
            Store::Fake(slot) => {
                let slot = slot.borrow();
                slot.text.as_ref()?;
                Some(Fingerprint::Tick(slot.version))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_path(name: &str) -> PathBuf {
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!(
            "filemap_store_{}_{}_{}",
            std::process::id(),
            id,
            name
        ))
    }

    // --- Fake store ---

    #[test]
    fn fake_store_lifecycle() {
        let store = Store::fake();
        assert!(!store.exists());
        assert!(store.fingerprint().is_none());

        store.write("a: 1\n").unwrap();
        assert!(store.exists());
        let fp = store.fingerprint().unwrap();
        assert_eq!(store.read(Path::new("fake")).unwrap(), "a: 1\n");

        store.write("a: 2\n").unwrap();
        assert_ne!(store.fingerprint().unwrap(), fp);

        store.remove().unwrap();
        assert!(!store.exists());
        assert!(store.fingerprint().is_none());
        assert!(matches!(
            store.read(Path::new("fake")),
            Err(MapError::FileNotFound(_))
        ));
    }

    #[test]
    fn fake_fingerprint_changes_per_write() {
        let store = Store::fake();
        store.write("x").unwrap();
        let a = store.fingerprint().unwrap();
        store.write("x").unwrap();
        let b = store.fingerprint().unwrap();
        assert_ne!(a, b);
    }

    // --- Disk store ---

    #[test]
    fn disk_store_round_trip() {
        let path = temp_path("round.yaml");
        let store = Store::disk(&path);
        assert!(!store.exists());

        store.write("k: v\n").unwrap();
        assert!(store.exists());
        assert_eq!(store.read(&path).unwrap(), "k: v\n");
        assert!(store.fingerprint().is_some());

        store.remove().unwrap();
        assert!(!store.exists());
        // Second removal is a no-op.
        store.remove().unwrap();
    }

    #[test]
    fn disk_store_creates_parent_dirs() {
        let dir = temp_path("nested");
        let path = dir.join("deep").join("file.yaml");
        let store = Store::disk(&path);
        store.write("x: 1\n").unwrap();
        assert!(path.exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn disk_read_missing_is_not_found() {
        let path = temp_path("missing.yaml");
        let store = Store::disk(&path);
        assert!(matches!(
            store.read(&path),
            Err(MapError::FileNotFound(_))
        ));
    }

    #[test]
    fn disk_fingerprint_tracks_length_change() {
        let path = temp_path("fp.yaml");
        let store = Store::disk(&path);
        store.write("a: 1\n").unwrap();
        let before = store.fingerprint().unwrap();
        store.write("a: 1234567\n").unwrap();
        let after = store.fingerprint().unwrap();
        assert_ne!(before, after);
        let _ = fs::remove_file(&path);
    }
}

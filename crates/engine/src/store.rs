//! Store port: key-value persistence of snapshot blobs.
//!
//! The engine never talks to a backend directly; it goes through the
//! [`Store`] trait, which models the only two operations the core needs:
//! load and save of a JSON blob under a version-qualified key. Keys are
//! qualified so that schema changes can coexist with old data while the
//! migration engine probes previous keys.
//!
//! Two implementations ship with the engine:
//!
//! - [`MemoryStore`]: process-memory map, for tests and ephemeral use
//! - [`FileStore`]: one file per key under a directory, atomic writes

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::debug;

use opentab_core::{Error, Result};

/// Persistence port for snapshot blobs.
///
/// Implementations are synchronous and assumed reliable; a failed
/// `save` must leave any previously persisted blob intact.
pub trait Store {
    /// Load the blob stored under `key`, or `None` if the key is empty.
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Persist `blob` under `key`, replacing any previous value whole.
    fn save(&self, key: &str, blob: &str) -> Result<()>;
}

/// In-memory store with no disk IO.
///
/// Data is gone when the store is dropped. Useful for tests and for
/// embedding contexts that manage persistence themselves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    cells: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key, for tests that simulate existing data.
    pub fn preload(&self, key: &str, blob: &str) {
        self.cells
            .lock()
            .insert(key.to_string(), blob.to_string());
    }
}

impl Store for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.cells.lock().get(key).cloned())
    }

    fn save(&self, key: &str, blob: &str) -> Result<()> {
        self.cells
            .lock()
            .insert(key.to_string(), blob.to_string());
        Ok(())
    }
}

/// File-backed store: `<dir>/<key>.json` per key.
///
/// Saves write to a temporary sibling file and rename it into place, so
/// a crash mid-write never corrupts the previous blob.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a file store rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .map_err(|e| Error::Store(format!("create {}: {e}", dir.display())))?;
        Ok(FileStore { dir })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Store for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path(key);
        match fs::read_to_string(&path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Store(format!("read {}: {e}", path.display()))),
        }
    }

    fn save(&self, key: &str, blob: &str) -> Result<()> {
        let path = self.path(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, blob).map_err(|e| Error::Store(format!("write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &path)
            .map_err(|e| Error::Store(format!("rename {}: {e}", path.display())))?;
        debug!(key, bytes = blob.len(), "snapshot persisted");
        Ok(())
    }
}

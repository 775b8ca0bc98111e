//! Key/value byte stores backing persistence.

use std::{
    collections::HashMap,
    fs,
    io::{self, Write},
    path::PathBuf,
    sync::{Arc, Mutex},
};

use log::{debug, trace};
use tempfile::NamedTempFile;

/// A durable key/value byte store.
///
/// Stores know nothing about trees; they move opaque bytes under string keys.
pub trait Store {
    /// Returns the bytes saved under `key`, or `None` if nothing was saved.
    fn load(&self, key: &str) -> io::Result<Option<Vec<u8>>>;

    /// Saves `bytes` under `key`, replacing any previous value.
    fn save(&mut self, key: &str, bytes: &[u8]) -> io::Result<()>;
}

/// In-memory store.
///
/// Clones share the same underlying map, so a test can keep a handle and
/// inspect what an editor saved, or open a second editor on the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw bytes under `key`.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.load(key).ok().flatten()
    }

    /// Stores raw bytes under `key`, bypassing any encoding.
    ///
    /// # Errors
    ///
    /// Fails if the shared map's lock is poisoned.
    pub fn insert(&self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) -> io::Result<()> {
        let mut entries = self.entries.lock().map_err(|_| poisoned())?;
        entries.insert(key.into(), bytes.into());
        Ok(())
    }
}

fn poisoned() -> io::Error {
    io::Error::other("memory store lock poisoned")
}

impl Store for MemoryStore {
    fn load(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        let entries = self.entries.lock().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, bytes: &[u8]) -> io::Result<()> {
        let mut entries = self.entries.lock().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

/// Directory-backed store: one `<key>.json` file per key.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the target, so readers never observe a half-written value.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the file path used for `key`.
    ///
    /// # Errors
    ///
    /// Keys may only contain ASCII letters, digits, `.`, `_` and `-`, and may
    /// not start with a `.`.
    pub fn path_for(&self, key: &str) -> io::Result<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !valid {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid store key `{key}`"),
            ));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Store for FileStore {
    fn load(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => {
                trace!(path = path.display().to_string(), len = bytes.len(); "Store entry read");
                Ok(Some(bytes))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn save(&mut self, key: &str, bytes: &[u8]) -> io::Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        let mut file = NamedTempFile::new_in(&self.dir)?;
        file.write_all(bytes)?;
        file.as_file().sync_all()?;
        file.persist(&path).map_err(|err| err.error)?;

        debug!(path = path.display().to_string(), len = bytes.len(); "Store entry written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_memory_store_shared_between_clones() {
        let mut store = MemoryStore::new();
        let handle = store.clone();

        assert_eq!(store.load("k").unwrap(), None);
        store.save("k", b"value").unwrap();
        assert_eq!(handle.get("k"), Some(b"value".to_vec()));

        handle.insert("k", "other").unwrap();
        assert_eq!(store.load("k").unwrap(), Some(b"other".to_vec()));
    }

    #[test]
    fn test_memory_store_poisoned_lock() {
        let mut store = MemoryStore::new();
        let entries = Arc::clone(&store.entries);
        let _ = std::thread::spawn(move || {
            let _guard = entries.lock().unwrap();
            panic!("lock holder panicked");
        })
        .join();

        assert!(store.insert("k", "v").is_err());
        assert!(store.save("k", b"v").is_err());
        assert!(store.load("k").is_err());
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempdir().expect("Failed to create temp directory");
        let mut store = FileStore::new(dir.path().join("state"));

        assert_eq!(store.load("arbor.tree").unwrap(), None);
        store.save("arbor.tree", b"{}").unwrap();
        assert_eq!(store.load("arbor.tree").unwrap(), Some(b"{}".to_vec()));
        assert!(dir.path().join("state/arbor.tree.json").is_file());

        store.save("arbor.tree", b"[]").unwrap();
        assert_eq!(store.load("arbor.tree").unwrap(), Some(b"[]".to_vec()));
    }

    #[test]
    fn test_file_store_rejects_bad_keys() {
        let dir = tempdir().expect("Failed to create temp directory");
        let mut store = FileStore::new(dir.path());

        for key in ["", "../escape", ".hidden", "a/b", "with space"] {
            let err = store.save(key, b"x").unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidInput, "key {key:?}");
        }
    }
}

//! File-backed cart storage.
//!
//! Each key is stored as `<data dir>/<key>.json`, so the cart lives in
//! `.loops/crochet_cart.json` by default.

use std::io::ErrorKind;
use std::path::PathBuf;

use alyssa_loops_core::cart::{CartStorage, StorageError};

/// Stores each key in its own file under a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir` as the data directory. It is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The file holding `key`.
    #[must_use]
    pub fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl CartStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use alyssa_loops_core::cart::{CART_STORAGE_KEY, CartStore};

    use super::*;

    #[test]
    fn test_missing_file_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));
        assert_eq!(storage.get("anything").unwrap(), None);
    }

    #[test]
    fn test_cart_persists_across_loads() {
        let dir = tempfile::tempdir().unwrap();

        let mut store = CartStore::load(FileStorage::new(dir.path())).unwrap();
        store.add("Crochet Bunny", "25").unwrap();
        store.add("Crochet Bunny", "25").unwrap();

        let path = FileStorage::new(dir.path()).path(CART_STORAGE_KEY);
        assert!(path.ends_with("crochet_cart.json"));
        assert!(path.exists());

        let reloaded = CartStore::load(FileStorage::new(dir.path())).unwrap();
        assert_eq!(reloaded.count(), 2);
    }

    #[test]
    fn test_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CartStore::load(FileStorage::new(dir.path())).unwrap();
        store.add("Bee", "7").unwrap();
        store.clear().unwrap();

        assert!(!FileStorage::new(dir.path()).path(CART_STORAGE_KEY).exists());
        // Removing twice is fine
        store.clear().unwrap();
    }
}

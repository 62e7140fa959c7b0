//! Persistent key-value storage for session-scoped state.
//!
//! Values are stored as JSON files under the application data directory,
//! one file per key. The session blob and the cart blob live here; the
//! bearer credential does not (it goes to the OS keychain instead).

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};

/// Key for the persisted session blob.
pub const SESSION_KEY: &str = "session";

/// Key for the persisted shopping cart. The cart itself is owned by the
/// shop UI; it is named here only so `logout` can purge it.
pub const CART_KEY: &str = "cart";

#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create storage directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let path = self.entry_path(key);
        let contents = serde_json::to_string_pretty(value)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write storage entry: {}", key))?;
        Ok(())
    }

    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read storage entry: {}", key))?;

        let value: T = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse storage entry: {}", key))?;

        Ok(Some(value))
    }

    /// Remove a key. Removing a key that does not exist is not an error.
    pub fn delete(&self, key: &str) -> Result<()> {
        let path = self.entry_path(key);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to delete storage entry: {}", key))?;
        }
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entry_path(key).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = Storage::new(dir.path().to_path_buf()).expect("storage");

        storage.save("answer", &42u32).expect("save");
        let loaded: Option<u32> = storage.load("answer").expect("load");
        assert_eq!(loaded, Some(42));
    }

    #[test]
    fn test_load_missing_key_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = Storage::new(dir.path().to_path_buf()).expect("storage");

        let loaded: Option<u32> = storage.load("nothing").expect("load");
        assert_eq!(loaded, None);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = Storage::new(dir.path().to_path_buf()).expect("storage");

        storage.save("k", &1u8).expect("save");
        storage.delete("k").expect("first delete");
        assert!(!storage.contains("k"));
        storage.delete("k").expect("second delete");
    }

    #[test]
    fn test_corrupt_entry_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = Storage::new(dir.path().to_path_buf()).expect("storage");

        std::fs::write(dir.path().join("bad.json"), "{not json").expect("write");
        let result: Result<Option<u32>> = storage.load("bad");
        assert!(result.is_err());
    }
}

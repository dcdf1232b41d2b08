//! Key/value storage that lives on the user's device.

use std::{
    collections::HashMap,
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use crate::Error;

/// Device-local storage of string values, like a browser's local storage.
pub trait LocalStorage {
    /// Get the value stored under `key`, or `None` if nothing has been stored.
    ///
    /// # Errors
    /// Returns an [Error::LocalStorage] if the storage could not be read.
    fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns an [Error::LocalStorage] if the storage could not be written.
    fn set(&self, key: &str, value: &str) -> Result<(), Error>;
}

/// Storage that is lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);

        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_owned(), value.to_owned());

        Ok(())
    }
}

/// Storage backed by a directory with one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir` for storage. The directory is created on the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", encode_file_name(key)))
    }
}

/// Escape `key` so it is a safe file name. ASCII letters, digits, `_` and `-`
/// are kept and every other byte becomes `%XX`. Distinct keys always give
/// distinct file names.
fn encode_file_name(key: &str) -> String {
    key.bytes()
        .map(|byte| {
            if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
                char::from(byte).to_string()
            } else {
                format!("%{byte:02X}")
            }
        })
        .collect()
}

impl LocalStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let path = self.path_for(key);

        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(Error::LocalStorage(format!(
                "could not read {}: {error}",
                path.display()
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let path = self.path_for(key);

        write_atomic(&path, value).map_err(|error| {
            Error::LocalStorage(format!("could not write {}: {error}", path.display()))
        })
    }
}

/// Write to a temporary file next to `path` and rename it over `path`, so a
/// reader never sees a half written value.
fn write_atomic(path: &Path, data: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    drop(file);

    fs::rename(&tmp_path, path)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::{FileStorage, LocalStorage, MemoryStorage, encode_file_name};

    #[test]
    fn memory_storage_returns_stored_value() {
        let storage = MemoryStorage::new();

        storage.set("goals_alice", "[]").unwrap();

        assert_eq!(storage.get("goals_alice").unwrap().as_deref(), Some("[]"));
        assert_eq!(storage.get("goals_bob").unwrap(), None);
    }

    #[test]
    fn file_storage_missing_key_is_none() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        assert_eq!(storage.get("goals_alice").unwrap(), None);
    }

    #[test]
    fn file_storage_persists_across_instances() {
        let dir = tempdir().unwrap();
        FileStorage::new(dir.path().join("nested"))
            .set("goals_alice", "[1]")
            .unwrap();

        let storage = FileStorage::new(dir.path().join("nested"));

        assert_eq!(storage.get("goals_alice").unwrap().as_deref(), Some("[1]"));
        assert!(dir.path().join("nested/goals_alice.json").exists());
    }

    #[test]
    fn file_storage_overwrites_value() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        storage.set("goals_alice", "[1]").unwrap();
        storage.set("goals_alice", "[2]").unwrap();

        assert_eq!(storage.get("goals_alice").unwrap().as_deref(), Some("[2]"));
        assert!(!dir.path().join("goals_alice.json.tmp").exists());
    }

    #[test]
    fn file_storage_keeps_keys_inside_dir() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        storage.set("goals_../escape", "[]").unwrap();

        assert!(dir.path().join("goals_%2E%2E%2Fescape.json").exists());
    }

    #[test]
    fn similar_keys_use_different_files() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        storage.set("goals_a.b@example.com", "[1]").unwrap();

        assert_eq!(storage.get("goals_a_b_example_com").unwrap(), None);
        assert_eq!(
            storage.get("goals_a.b@example.com").unwrap().as_deref(),
            Some("[1]")
        );
    }

    #[test]
    fn file_names_escape_reserved_bytes() {
        assert_eq!(encode_file_name("goals_alice-1"), "goals_alice-1");
        assert_eq!(encode_file_name("a.b@c"), "a%2Eb%40c");
        assert_eq!(encode_file_name("100%"), "100%25");
        assert_eq!(encode_file_name("ü"), "%C3%BC");
    }
}

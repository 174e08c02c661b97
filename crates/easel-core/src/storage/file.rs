//! File-based key-value store for native platforms.

use super::{KeyValueStore, StorageError, StorageResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "json";

/// One JSON file per key in a directory.
///
/// Keys are encoded into file names reversibly: ASCII letters, digits, `-`
/// and `_` are kept, every other byte becomes `%XX`. Distinct keys always
/// map to distinct files.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::Io(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;
        Ok(Self { base_path })
    }

    /// Create a store in the default location.
    ///
    /// On Linux: `~/.local/share/easel/designs/`
    /// On Windows: `%LOCALAPPDATA%\easel\designs\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Self::new(base.join("easel").join("designs"))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.base_path
            .join(format!("{}.{}", encode_key(key), EXTENSION))
    }
}

fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    encoded
}

fn decode_key(stem: &str) -> Option<String> {
    let bytes = stem.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = stem.get(i + 1..i + 3)?;
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok()
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.entry_path(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.entry_path(key);
        fs::write(&path, value).map_err(|e| {
            StorageError::Io(format!("Failed to write {}: {}", path.display(), e))
        })
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.entry_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(format!(
                "Failed to delete {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let entries = fs::read_dir(&self.base_path)
            .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

        let mut keys = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != EXTENSION) {
                continue;
            }
            if let Some(key) = path.file_stem().and_then(|s| s.to_str()).and_then(decode_key) {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::CanvasDocument;
    use crate::storage::LocalStorage;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        store.set("poster", "{\"objects\":[]}").unwrap();
        assert_eq!(store.get("poster").unwrap().as_deref(), Some("{\"objects\":[]}"));
        assert!(dir.path().join("poster.json").exists());
    }

    #[test]
    fn test_file_store_missing() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        assert_eq!(store.get("nonexistent").unwrap(), None);
        store.remove("nonexistent").unwrap();
    }

    #[test]
    fn test_similar_names_do_not_collide() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        let names = ["a/b", "a_b", "a%2Fb", "a b", "ünïcode", "..", "."];
        for (i, name) in names.iter().enumerate() {
            store.set(name, &i.to_string()).unwrap();
        }
        for (i, name) in names.iter().enumerate() {
            assert_eq!(store.get(name).unwrap(), Some(i.to_string()));
        }
        let mut keys = store.keys().unwrap();
        keys.sort();
        let mut expected: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        expected.sort();
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_keys_ignore_other_files() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        store.set("doc", "{}").unwrap();
        assert_eq!(store.keys().unwrap(), vec!["doc".to_string()]);
    }

    #[test]
    fn test_local_storage_over_files() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(FileStore::new(dir.path()).unwrap());
        let doc = CanvasDocument::with_size(320, 240);
        storage.save_sync("my design", &doc).unwrap();

        let reopened = LocalStorage::new(FileStore::new(dir.path()).unwrap());
        assert_eq!(reopened.load_sync("my design").unwrap(), doc);
        assert_eq!(reopened.list_sync().unwrap(), vec!["my design".to_string()]);
    }
}

//! Synchronous key-value backed storage.

use super::{BoxFuture, Storage, StorageError, StorageResult, validate_name};
use crate::document::CanvasDocument;
use std::future::ready;

/// A flat string-to-string store.
#[cfg(not(target_arch = "wasm32"))]
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
    fn keys(&self) -> StorageResult<Vec<String>>;
}

/// A flat string-to-string store (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
    fn keys(&self) -> StorageResult<Vec<String>>;
}

/// Designs kept as JSON text in a [`KeyValueStore`], keyed by their name.
///
/// Every operation completes synchronously; the [`Storage`] futures are
/// ready on first poll.
#[derive(Debug, Default)]
pub struct LocalStorage<K> {
    store: K,
}

impl<K: KeyValueStore> LocalStorage<K> {
    pub fn new(store: K) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    /// Serialize and write `document` under `name`, replacing any previous value.
    pub fn save_sync(&self, name: &str, document: &CanvasDocument) -> StorageResult<()> {
        let name = validate_name(name)?;
        let json = document
            .to_json()
            .map_err(|e| StorageError::Other(e.to_string()))?;
        self.store.set(name, &json)?;
        log::debug!("Saved design {:?} locally ({} bytes)", name, json.len());
        Ok(())
    }

    /// Read and decode the design stored under `name`.
    pub fn load_sync(&self, name: &str) -> StorageResult<CanvasDocument> {
        let name = validate_name(name)?;
        let json = self
            .store
            .get(name)?
            .ok_or_else(|| StorageError::NotFound(name.to_string()))?;
        CanvasDocument::from_json(&json).map_err(|e| {
            log::warn!("Stored design {:?} is unreadable: {}", name, e);
            StorageError::Corrupt {
                name: name.to_string(),
                reason: e.to_string(),
            }
        })
    }

    pub fn delete_sync(&self, name: &str) -> StorageResult<()> {
        self.store.remove(validate_name(name)?)
    }

    pub fn list_sync(&self) -> StorageResult<Vec<String>> {
        let mut names = self.store.keys()?;
        names.sort();
        Ok(names)
    }

    pub fn exists_sync(&self, name: &str) -> StorageResult<bool> {
        Ok(self.store.get(validate_name(name)?)?.is_some())
    }
}

impl<K: KeyValueStore> Storage for LocalStorage<K> {
    fn save(
        &self,
        name: &str,
        document: &CanvasDocument,
    ) -> BoxFuture<'_, StorageResult<Option<String>>> {
        Box::pin(ready(self.save_sync(name, document).map(|()| None)))
    }

    fn load(&self, name: &str) -> BoxFuture<'_, StorageResult<CanvasDocument>> {
        Box::pin(ready(self.load_sync(name)))
    }

    fn delete(&self, name: &str) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(ready(self.delete_sync(name)))
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(ready(self.list_sync()))
    }

    fn exists(&self, name: &str) -> BoxFuture<'_, StorageResult<bool>> {
        Box::pin(ready(self.exists_sync(name)))
    }
}

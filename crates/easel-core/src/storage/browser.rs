//! Browser `localStorage` key-value store for WASM.

use super::{KeyValueStore, StorageError, StorageResult};
use wasm_bindgen::JsValue;

fn js_error(context: &str, err: JsValue) -> StorageError {
    StorageError::Other(format!("{}: {:?}", context, err))
}

/// Keys and values kept in the page's `window.localStorage`.
pub struct BrowserStore {
    storage: web_sys::Storage,
}

impl BrowserStore {
    /// Open the window's local storage.
    pub fn new() -> StorageResult<Self> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Other("No window available".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| js_error("Failed to access localStorage", e))?
            .ok_or_else(|| StorageError::Other("localStorage is not available".to_string()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| js_error("Failed to read item", e))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| js_error("Failed to write item", e))
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| js_error("Failed to remove item", e))
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let len = self
            .storage
            .length()
            .map_err(|e| js_error("Failed to read length", e))?;
        let mut keys = Vec::with_capacity(len as usize);
        for index in 0..len {
            if let Some(key) = self
                .storage
                .key(index)
                .map_err(|e| js_error("Failed to read key", e))?
            {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}

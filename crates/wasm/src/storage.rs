//! Browser storage for the editor session

use invoice_form::{KvStore, MemoryStore, StoreError};
use wasm_bindgen::JsValue;
use web_sys::Storage;

/// `window.localStorage`, or an in-memory map where it is unavailable
/// (private browsing, tests outside a browser)
pub enum BrowserStore {
    Local(Storage),
    Memory(MemoryStore),
}

impl BrowserStore {
    pub fn open() -> Self {
        web_sys::window()
            .and_then(|window| window.local_storage().ok().flatten())
            .map(BrowserStore::Local)
            .unwrap_or_else(|| BrowserStore::Memory(MemoryStore::new()))
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, BrowserStore::Local(_))
    }
}

fn storage_error(e: JsValue) -> StoreError {
    StoreError::Unavailable(e.as_string().unwrap_or_else(|| format!("{e:?}")))
}

impl KvStore for BrowserStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self {
            BrowserStore::Local(storage) => storage.get_item(key).map_err(storage_error),
            BrowserStore::Memory(store) => store.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        match self {
            BrowserStore::Local(storage) => storage.set_item(key, value).map_err(storage_error),
            BrowserStore::Memory(store) => store.set(key, value),
        }
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match self {
            BrowserStore::Local(storage) => storage.remove_item(key).map_err(storage_error),
            BrowserStore::Memory(store) => store.remove(key),
        }
    }
}

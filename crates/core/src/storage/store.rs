use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::errors::CoreError;
use crate::models::settings::{Settings, DEFAULT_STORAGE_KEY};

use super::manager::StorageManager;
use super::snapshot::LedgerSnapshot;

/// Durable storage capability for the ledger.
///
/// The core calls `load` once at startup and `save` after every successful
/// mutation. Implementations own the serialization; callers only see
/// snapshots.
pub trait Store {
    /// Human-readable name of this store (for logs).
    fn name(&self) -> &str;

    /// Read the stored snapshot. `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<LedgerSnapshot>, CoreError>;

    /// Replace the stored snapshot.
    fn save(&mut self, snapshot: &LedgerSnapshot) -> Result<(), CoreError>;
}

/// Key-value blob storage in the style of browser local storage.
///
/// Clones share the same underlying map, so a caller can keep a handle and
/// inspect what the core wrote.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    key: String,
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_key(DEFAULT_STORAGE_KEY)
    }

    /// A store that reads and writes the blob under `key`.
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            entries: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// A store keyed by `settings.storage_key`.
    pub fn for_settings(settings: &Settings) -> Self {
        Self::with_key(settings.storage_key.clone())
    }

    /// Another store over the same entries, reading and writing under `key`.
    pub fn sibling(&self, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            entries: Rc::clone(&self.entries),
        }
    }

    /// The raw blob currently stored under this store's key.
    pub fn raw(&self) -> Option<String> {
        self.entries.borrow().get(&self.key).cloned()
    }

    /// Overwrite the raw blob (e.g., seed legacy data).
    pub fn set_raw(&self, blob: impl Into<String>) {
        self.entries.borrow_mut().insert(self.key.clone(), blob.into());
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn load(&self) -> Result<Option<LedgerSnapshot>, CoreError> {
        match self.raw() {
            Some(blob) => StorageManager::decode(&blob).map(Some),
            None => Ok(None),
        }
    }

    fn save(&mut self, snapshot: &LedgerSnapshot) -> Result<(), CoreError> {
        let blob = StorageManager::encode(snapshot)?;
        self.set_raw(blob);
        Ok(())
    }
}

/// JSON file on disk (native only).
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStore {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Store for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    fn load(&self) -> Result<Option<LedgerSnapshot>, CoreError> {
        StorageManager::load_from_file(&self.path)
    }

    fn save(&mut self, snapshot: &LedgerSnapshot) -> Result<(), CoreError> {
        StorageManager::save_to_file(snapshot, &self.path)
    }
}

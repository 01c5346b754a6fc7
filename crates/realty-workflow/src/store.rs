//! Workflow state persistence
//!
//! [`KeyValueStore`] is the swappable backend (string keys, JSON text
//! values). [`StateStore`] maps categories to keys, decodes leniently and
//! broadcasts a [`StateChange`] after every write so consumers can recompute
//! their views.

use crate::error::StoreError;
use crate::state::WorkflowState;
use realty_catalog::WorkflowCategory;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Capacity of the change notification channel
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Minimal string key-value persistence
pub trait KeyValueStore {
    /// Stored value, or `None` if absent or unreadable
    fn get(&self, key: &str) -> Option<String>;

    /// Overwrite the value for `key`
    ///
    /// # Errors
    ///
    /// Backend-specific write failure.
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;

    /// Delete `key`; deleting an absent key succeeds
    ///
    /// # Errors
    ///
    /// Backend-specific write failure.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One JSON file per key under a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Root directory
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Cannot read {}: {}", path.display(), e);
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Notification sent after a category's state was saved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    /// The category that changed
    pub category: WorkflowCategory,
}

/// Category-scoped state persistence over a [`KeyValueStore`]
#[derive(Debug)]
pub struct StateStore<S> {
    backend: S,
    key_prefix: String,
    changes: broadcast::Sender<StateChange>,
}

impl<S: KeyValueStore> StateStore<S> {
    /// Wrap `backend`, storing each category under `<key_prefix><category>`
    pub fn new(backend: S, key_prefix: impl Into<String>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            backend,
            key_prefix: key_prefix.into(),
            changes,
        }
    }

    /// Storage key of `category`
    #[must_use]
    pub fn key(&self, category: WorkflowCategory) -> String {
        format!("{}{}", self.key_prefix, category.as_str())
    }

    /// Persisted state, or the empty default if absent or malformed
    #[must_use]
    pub fn load(&self, category: WorkflowCategory) -> WorkflowState {
        let key = self.key(category);
        let Some(text) = self.backend.get(&key) else {
            return WorkflowState::default();
        };
        match serde_json::from_str(&text) {
            Ok(state) => state,
            Err(e) => {
                debug!("Ignoring malformed state under {}: {}", key, e);
                WorkflowState::default()
            }
        }
    }

    /// Overwrite the persisted state of `category` and notify subscribers
    ///
    /// # Errors
    ///
    /// [`StoreError`] if encoding or the backend write fails; subscribers
    /// are not notified in that case.
    pub fn save(
        &mut self,
        category: WorkflowCategory,
        state: &WorkflowState,
    ) -> Result<(), StoreError> {
        let text = serde_json::to_string(state)?;
        let key = self.key(category);
        self.backend.set(&key, text)?;
        // No receivers is fine
        let _ = self.changes.send(StateChange { category });
        Ok(())
    }

    /// Receive a [`StateChange`] for every successful save
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.changes.subscribe()
    }

    /// The backend
    #[inline]
    #[must_use]
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Mutable access to the backend
    #[inline]
    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    /// Unwrap the backend
    #[inline]
    #[must_use]
    pub fn into_backend(self) -> S {
        self.backend
    }
}

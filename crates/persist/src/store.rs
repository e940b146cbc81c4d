//! Key-value stores.
//!
//! File layout of a [`FileStore`]:
//! ```text
//! <root>/
//!   camera.json   - one file per key
//!   world.json
//! ```

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid key {0:?}")]
    InvalidKey(String),
}

/// Named blob storage.
pub trait KvStore {
    /// Raw text stored under `key`.
    fn load_raw(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn save_raw(&mut self, key: &str, text: &str) -> Result<(), StoreError>;

    fn remove(&mut self, key: &str) -> Result<bool, StoreError>;

    /// Value under `key`, parsed as JSON, or the raw text as a JSON string
    /// when it does not parse.
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.load_raw(key)?.map(|raw| {
            serde_json::from_str(&raw).unwrap_or(Value::String(raw))
        }))
    }

    /// Store `value`. Strings are stored verbatim, everything else as JSON.
    fn save(&mut self, key: &str, value: &Value) -> Result<(), StoreError> {
        match value {
            Value::String(text) => self.save_raw(key, text),
            other => self.save_raw(key, &serde_json::to_string(other)?),
        }
    }
}

/// Load and deserialize `key`. Content that does not match `T` is an error.
pub fn load_json<T: DeserializeOwned>(
    store: &(impl KvStore + ?Sized),
    key: &str,
) -> Result<Option<T>, StoreError> {
    store
        .load_raw(key)?
        .map(|raw| serde_json::from_str(&raw).map_err(StoreError::from))
        .transpose()
}

pub fn save_json<T: Serialize>(
    store: &mut (impl KvStore + ?Sized),
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let text = serde_json::to_string(value)?;
    store.save_raw(key, &text)
}

/// In-process store, for tests and hosts without a disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemoryStore {
    fn load_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn save_raw(&mut self, key: &str, text: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), text.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.remove(key).is_some())
    }
}

/// Directory-backed store with one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open or create a store at the given directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        tracing::debug!(root = %root.display(), "file store opened");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KvStore for FileStore {
    fn load_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save_raw(&mut self, key: &str, text: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        // Write-then-rename so a crash never leaves a truncated blob.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, text)?;
        std::fs::rename(&tmp, &path)?;
        tracing::trace!(key, bytes = text.len(), "blob saved");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

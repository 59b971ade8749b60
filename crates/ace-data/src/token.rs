use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::TokenStoreError;

/// Key the default auth interceptor reads.
pub const AUTH_TOKEN_KEY: &str = "authToken";

/// Persistent string key-value store the auth token is read from.
///
/// Only propagation lives here; acquiring or refreshing a token is someone
/// else's job.
pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), TokenStoreError>;
    fn remove(&self, key: &str) -> Result<(), TokenStoreError>;
}

// ─── FileTokenStore ───────────────────────────────────────────────────────

/// A JSON object on disk, re-read on every `get` so that writes from other
/// processes are picked up.
///
/// A missing file is an empty store. The parent directory is created lazily
/// on the first write.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Map<String, Value>, TokenStoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(s) if s.trim().is_empty() => Ok(Map::new()),
            Ok(s) => Ok(serde_json::from_str(&s)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, values: &Map<String, Value>) -> Result<(), TokenStoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(values)?)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.read() {
            Ok(values) => values.get(key).and_then(Value::as_str).map(str::to_owned),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "unreadable token store");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), TokenStoreError> {
        let mut values = self.read()?;
        values.insert(key.to_string(), Value::String(value.to_string()));
        self.write(&values)
    }

    fn remove(&self, key: &str) -> Result<(), TokenStoreError> {
        let mut values = self.read()?;
        if values.remove(key).is_some() {
            self.write(&values)?;
        }
        Ok(())
    }
}

// ─── MemoryTokenStore ─────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), TokenStoreError> {
        self.values
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), TokenStoreError> {
        self.values
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
        Ok(())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

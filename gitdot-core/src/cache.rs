use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::debug;

/// Persistence strategy for a cache value: loaded once at startup, saved
/// once at shutdown.
pub trait CacheStore<T>: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet
    fn load(&self) -> Result<Option<T>>;
    fn save(&self, value: &T) -> Result<()>;
}

/// Stores the value as pretty-printed JSON in a file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl<T: Serialize + DeserializeOwned> CacheStore<T> for JsonFileStore {
    fn load(&self) -> Result<Option<T>> {
        if !self.path.is_file() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read cache {}", self.path.display()))?;
        let value = serde_json::from_str(&content)
            .with_context(|| format!("Corrupt cache {}", self.path.display()))?;

        debug!(path = %self.path.display(), "Loaded cache");
        Ok(Some(value))
    }

    fn save(&self, value: &T) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        let content = serde_json::to_string_pretty(value)?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write cache {}", self.path.display()))?;

        debug!(path = %self.path.display(), "Saved cache");
        Ok(())
    }
}

/// In-memory store, for tests and for runs that should not touch disk
#[derive(Debug, Default)]
pub struct MemoryStore<T> {
    slot: Mutex<Option<T>>,
}

impl<T> MemoryStore<T> {
    pub fn new(initial: Option<T>) -> Self {
        Self {
            slot: Mutex::new(initial),
        }
    }
}

impl<T: Clone + Send> CacheStore<T> for MemoryStore<T> {
    fn load(&self) -> Result<Option<T>> {
        Ok(self.slot.lock().map_err(|_| anyhow::anyhow!("Cache lock poisoned"))?.clone())
    }

    fn save(&self, value: &T) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("Cache lock poisoned"))?;
        *slot = Some(value.clone());
        Ok(())
    }
}

impl<T, S: CacheStore<T> + ?Sized> CacheStore<T> for std::sync::Arc<S> {
    fn load(&self) -> Result<Option<T>> {
        (**self).load()
    }

    fn save(&self, value: &T) -> Result<()> {
        (**self).save(value)
    }
}

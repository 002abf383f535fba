//! File-backed Store
//!
//! Persists all keys as one JSON object. Every call reads the file, applies
//! its change and writes it back through a temporary file and a rename, all
//! while holding the store lock.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{lock, KeyValueStore, StorageKey};
use crate::error::StorageError;

type Entries = BTreeMap<String, String>;

/// JSON file key-value store
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileStore {
    /// Open a store at `path`, creating parent directories as needed
    ///
    /// The file itself is created on the first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        tracing::debug!("Opened state store at {:?}", path);
        Ok(Self {
            path,
            guard: Mutex::new(()),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Entries, StorageError> {
        if !self.path.exists() {
            return Ok(Entries::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Entries::new());
        }

        serde_json::from_str(&content).map_err(|e| StorageError::Malformed {
            key: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Entries to rewrite; an unreadable file is replaced rather than blocking writes
    fn entries_for_write(&self) -> Result<Entries, StorageError> {
        match self.read_entries() {
            Err(StorageError::Malformed { reason, .. }) => {
                tracing::warn!("Discarding malformed state file {:?}: {}", self.path, reason);
                Ok(Entries::new())
            }
            other => other,
        }
    }

    fn write_entries(&self, entries: &Entries) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(entries).map_err(|e| StorageError::Malformed {
            key: self.path.display().to_string(),
            reason: e.to_string(),
        })?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        let _guard = lock(&self.guard);
        let mut entries = self.read_entries()?;
        Ok(entries.remove(key.as_str()))
    }

    fn set(&self, key: StorageKey, value: &str) -> Result<(), StorageError> {
        let _guard = lock(&self.guard);
        let mut entries = self.entries_for_write()?;
        entries.insert(key.as_str().to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        let _guard = lock(&self.guard);
        let mut entries = self.entries_for_write()?;
        if entries.remove(key.as_str()).is_none() {
            return Ok(());
        }
        self.write_entries(&entries)
    }
}

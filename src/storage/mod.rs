//! Durable Local Store
//!
//! A string key-value store scoped to the running client. Values survive a
//! restart of the process but are not shared across machines.
//!
//! The session token and the profile update history live under distinct
//! fixed keys ([`StorageKey`]), so the two components never collide.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::sync::{Mutex, MutexGuard};

use crate::error::StorageError;

/// Fixed keys used by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// Bearer credential string
    Token,
    /// JSON array of epoch-millisecond timestamps
    ProfileUpdateHistory,
}

impl StorageKey {
    /// The literal key written to the store
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Token => "token",
            StorageKey::ProfileUpdateHistory => "profileUpdateHistory",
        }
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key-value persistence layer
///
/// Each call is one read, write or delete. Implementations must make every
/// call a critical section so concurrent writers do not lose updates.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: StorageKey, value: &str) -> Result<(), StorageError>;

    /// Delete `key`; deleting a missing key is not an error
    fn remove(&self, key: StorageKey) -> Result<(), StorageError>;
}

/// Lock a mutex, recovering the data if a previous holder panicked
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Store that rejects every call, as a disabled browser store would
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct UnavailableStore;

#[cfg(test)]
impl KeyValueStore for UnavailableStore {
    fn get(&self, _key: StorageKey) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("disabled".to_string()))
    }

    fn set(&self, _key: StorageKey, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("disabled".to_string()))
    }

    fn remove(&self, _key: StorageKey) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("disabled".to_string()))
    }
}

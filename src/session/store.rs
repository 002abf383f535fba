//! Session Store
//!
//! Single source of truth for the auth token.

use std::sync::{Arc, Mutex};

use crate::storage::{lock, KeyValueStore, StorageKey};

/// State whose lifetime is bounded by the session
///
/// Attached components are cleared every time the session is cleared, after
/// the token has been removed and before `clear()` returns.
pub trait SessionScoped: Send + Sync {
    /// Drop all state belonging to the ended session
    fn on_session_cleared(&self);
}

/// Current auth token, mirrored to durable storage
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    token: Mutex<Option<String>>,
    scoped: Mutex<Vec<Arc<dyn SessionScoped>>>,
}

impl SessionStore {
    /// Create an unauthenticated session backed by `storage`
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            token: Mutex::new(None),
            scoped: Mutex::new(Vec::new()),
        }
    }

    /// Create a session and restore any persisted token
    pub fn init(storage: Arc<dyn KeyValueStore>) -> Self {
        let session = Self::new(storage);
        session.restore();
        session
    }

    /// Register state that must be cleared together with the session
    pub fn attach(&self, scoped: Arc<dyn SessionScoped>) {
        lock(&self.scoped).push(scoped);
    }

    /// Current in-memory token
    pub fn get(&self) -> Option<String> {
        lock(&self.token).clone()
    }

    /// Whether a token is held
    pub fn is_authenticated(&self) -> bool {
        lock(&self.token).is_some()
    }

    /// Replace the current token
    ///
    /// A non-empty token is written to storage; an empty one deletes the
    /// stored entry. Storage failures leave the session in memory only.
    pub fn set(&self, token: &str) {
        let token = token.trim();
        let mut current = lock(&self.token);

        if token.is_empty() {
            *current = None;
            if let Err(e) = self.storage.remove(StorageKey::Token) {
                tracing::warn!("Failed to remove persisted session: {}", e);
            }
            tracing::debug!("Session token removed");
            return;
        }

        *current = Some(token.to_string());
        if let Err(e) = self.storage.set(StorageKey::Token, token) {
            tracing::warn!("Session will not survive restart: {}", e);
        }
        tracing::debug!("Session token stored");
    }

    /// Load the persisted token into memory
    ///
    /// Missing, blank or unreadable entries yield an unauthenticated session.
    pub fn restore(&self) -> Option<String> {
        let restored = match self.storage.get(StorageKey::Token) {
            Ok(Some(raw)) => parse_token(&raw),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Could not restore session: {}", e);
                None
            }
        };

        *lock(&self.token) = restored.clone();
        if restored.is_some() {
            tracing::info!("Restored persisted session");
        } else {
            tracing::debug!("No persisted session");
        }
        restored
    }

    /// End the session and clear all session-scoped state
    pub fn clear(&self) {
        self.set("");

        let scoped = lock(&self.scoped).clone();
        for component in scoped {
            component.on_session_cleared();
        }
        tracing::info!("Session cleared");
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .field("scoped", &lock(&self.scoped).len())
            .finish()
    }
}

/// Accept only a single-line printable credential
fn parse_token(raw: &str) -> Option<String> {
    let token = raw.trim();
    if token.is_empty() || token.chars().any(|c| c.is_control()) {
        return None;
    }
    Some(token.to_string())
}

//! Client Composition
//!
//! Builds the session, the quota tracker and the API service once at startup
//! and hands explicit instances to the controller and auth flows.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::api::{AuthService, HttpProfileService, ProfileService};
use crate::config::Config;
use crate::dashboard::{AuthFlow, DashboardController};
use crate::rate_limit::{Clock, QuotaPolicy, QuotaStatus, SystemClock, UpdateQuotaTracker};
use crate::session::SessionStore;
use crate::storage::{FileStore, KeyValueStore, MemoryStore};

/// Initialized client components
pub struct Client {
    session: Arc<SessionStore>,
    quota: Arc<UpdateQuotaTracker>,
    profiles: Arc<dyn ProfileService>,
    auth: Arc<dyn AuthService>,
}

impl Client {
    /// Build the client described by `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built. An unusable state
    /// file only downgrades the client to in-memory storage.
    pub fn init(config: &Config) -> Result<Self> {
        let storage = open_storage(config);
        let service = HttpProfileService::new(&config.api.base_url, config.api.timeout())
            .context("Failed to create API client")?
            .with_api_key(config.api.api_key.clone());

        Ok(Self::from_parts(
            storage,
            Arc::new(SystemClock),
            config.quota.policy(),
            Arc::new(service),
        ))
    }

    /// Assemble a client from explicit components
    ///
    /// Restores the session, loads the quota history and ties the quota
    /// history to the session lifetime.
    pub fn from_parts<S>(
        storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        policy: QuotaPolicy,
        service: Arc<S>,
    ) -> Self
    where
        S: AuthService + ProfileService + 'static,
    {
        let session = Arc::new(SessionStore::init(storage.clone()));
        let quota = Arc::new(UpdateQuotaTracker::init(storage, clock, policy));
        session.attach(quota.clone());

        let profiles: Arc<dyn ProfileService> = service.clone();
        let auth: Arc<dyn AuthService> = service;

        Self {
            session,
            quota,
            profiles,
            auth,
        }
    }

    /// A new dashboard controller over this client's state
    pub fn dashboard(&self) -> DashboardController {
        DashboardController::new(self.session.clone(), self.quota.clone(), self.profiles.clone())
    }

    /// Login, registration and logout flows
    pub fn auth(&self) -> AuthFlow {
        AuthFlow::new(self.session.clone(), self.auth.clone())
    }

    /// Session store
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Live quota snapshot
    pub fn quota_status(&self) -> QuotaStatus {
        self.quota.status()
    }

    /// Drop the client at process exit
    ///
    /// In-memory state goes with it; the session and the update history stay
    /// persisted for the next start. Use `auth().logout()` to end the session.
    pub fn teardown(self) {
        tracing::debug!("Client teardown, authenticated: {}", self.session.is_authenticated());
    }
}

fn open_storage(config: &Config) -> Arc<dyn KeyValueStore> {
    if !config.storage.persistent {
        tracing::debug!("Persistence disabled, using in-memory state");
        return Arc::new(MemoryStore::new());
    }

    let path = config.state_path();
    match FileStore::open(&path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!("State file {:?} unavailable, using in-memory state: {}", path, e);
            Arc::new(MemoryStore::new())
        }
    }
}

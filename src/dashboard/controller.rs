//! Dashboard Controller
//!
//! Drives the dashboard state machine. Composes the session, the update quota
//! and the profile service; the presentation layer observes state changes
//! through [`DashboardController::subscribe`].
//!
//! # Policies
//!
//! - Any failure while loading the profile ends the session. Network errors
//!   and authentication errors are not distinguished.
//! - A save consumes a quota slot before the request is sent. A failed save
//!   keeps the slot consumed, so retries cannot bypass the limit.

use std::sync::Arc;

use super::state::DashboardState;
use crate::api::{ProfileService, ProfileUpdate};
use crate::error::DashboardError;
use crate::rate_limit::{QuotaStatus, UpdateQuotaTracker};
use crate::session::SessionStore;

/// Callback notified with every new state
pub type Observer = Box<dyn Fn(&DashboardState) + Send + Sync>;

/// Handle returned by [`DashboardController::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Profile dashboard state machine
pub struct DashboardController {
    session: Arc<SessionStore>,
    quota: Arc<UpdateQuotaTracker>,
    profiles: Arc<dyn ProfileService>,
    state: DashboardState,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl DashboardController {
    /// Create a controller in the `Unauthenticated` state
    ///
    /// `quota` is expected to be attached to `session` so that every session
    /// clear also clears the quota history.
    pub fn new(
        session: Arc<SessionStore>,
        quota: Arc<UpdateQuotaTracker>,
        profiles: Arc<dyn ProfileService>,
    ) -> Self {
        Self {
            session,
            quota,
            profiles,
            state: DashboardState::Unauthenticated,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Current state
    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Register an observer for state changes
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: Fn(&DashboardState) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer; returns false if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    /// Live quota snapshot
    pub fn quota_status(&self) -> QuotaStatus {
        self.quota.status()
    }

    /// Whether the edit action should be enabled
    pub fn can_edit(&self) -> bool {
        matches!(self.state, DashboardState::Ready { .. }) && self.quota.remaining_quota() > 0
    }

    /// Load the dashboard for the current session
    ///
    /// Without a token the controller stays `Unauthenticated`. If the profile
    /// cannot be fetched for any reason the session is cleared and the
    /// controller ends in `LoggedOut`.
    pub async fn mount(&mut self) -> Result<&DashboardState, DashboardError> {
        if !matches!(self.state, DashboardState::Unauthenticated) {
            return Err(self.invalid("mount"));
        }

        let Some(token) = self.session.get() else {
            tracing::debug!("No session, login required");
            return Ok(&self.state);
        };

        self.transition(DashboardState::Loading);
        match self.profiles.fetch_self(&token).await {
            Ok(profile) => {
                tracing::info!("Loaded profile for {}", profile.email);
                self.transition(DashboardState::Ready { profile });
            }
            Err(e) => {
                tracing::warn!("Profile fetch failed, ending session: {}", e);
                self.session.clear();
                self.transition(DashboardState::LoggedOut {
                    reason: Some(e.message().to_string()),
                });
            }
        }
        Ok(&self.state)
    }

    /// Open the edit form
    ///
    /// # Errors
    ///
    /// `QuotaExceeded` when no update is left in the window; the state is
    /// left unchanged.
    pub fn begin_edit(&mut self) -> Result<&DashboardState, DashboardError> {
        let DashboardState::Ready { profile } = &self.state else {
            return Err(self.invalid("edit"));
        };

        let status = self.quota.status();
        if status.is_blocked() {
            tracing::info!("Edit blocked: {}", status.message());
            return Err(DashboardError::QuotaExceeded {
                remaining: status.remaining,
                next_slot_at: status.next_slot_at,
            });
        }

        let profile = profile.clone();
        let draft = ProfileUpdate::from_profile(&profile);
        self.transition(DashboardState::Editing {
            profile,
            draft,
            error: None,
        });
        Ok(&self.state)
    }

    /// Close the edit form without saving
    pub fn cancel_edit(&mut self) -> Result<&DashboardState, DashboardError> {
        let DashboardState::Editing { profile, .. } = &self.state else {
            return Err(self.invalid("cancel edit"));
        };

        let profile = profile.clone();
        self.transition(DashboardState::Ready { profile });
        Ok(&self.state)
    }

    /// Save the edited fields
    ///
    /// # Errors
    ///
    /// - `QuotaExceeded` if the quota ran out; nothing is sent and the form closes.
    /// - `Service` if the server rejected the update; the form stays open with
    ///   the error and the quota slot stays consumed.
    /// - `NotAuthenticated` if the session vanished while editing.
    pub async fn submit(&mut self, update: ProfileUpdate) -> Result<&DashboardState, DashboardError> {
        let DashboardState::Editing { profile, .. } = &self.state else {
            return Err(self.invalid("save"));
        };
        let profile = profile.clone();

        let Some(token) = self.session.get() else {
            self.transition(DashboardState::LoggedOut { reason: None });
            return Err(DashboardError::NotAuthenticated);
        };

        let decision = self.quota.try_consume();
        if !decision.allowed {
            self.transition(DashboardState::Ready { profile });
            return Err(DashboardError::QuotaExceeded {
                remaining: decision.remaining,
                next_slot_at: decision.next_slot_at,
            });
        }

        self.transition(DashboardState::Saving {
            profile: profile.clone(),
            draft: update.clone(),
        });

        match self.profiles.update_self(&token, &update).await {
            Ok(updated) => {
                tracing::info!("Profile updated, {} updates remaining", decision.remaining);
                self.transition(DashboardState::Ready { profile: updated });
                Ok(&self.state)
            }
            Err(e) => {
                tracing::warn!("Profile update failed: {}", e);
                self.transition(DashboardState::Editing {
                    profile,
                    draft: update,
                    error: Some(e.message().to_string()),
                });
                Err(DashboardError::Service(e))
            }
        }
    }

    /// End the session from any state
    pub fn logout(&mut self) -> &DashboardState {
        self.session.clear();
        self.transition(DashboardState::LoggedOut { reason: None });
        &self.state
    }

    fn invalid(&self, action: &'static str) -> DashboardError {
        DashboardError::InvalidTransition {
            from: self.state.name(),
            action,
        }
    }

    fn transition(&mut self, next: DashboardState) {
        tracing::debug!("Dashboard: {} -> {}", self.state, next);
        self.state = next;
        for (_, observer) in &self.observers {
            observer(&self.state);
        }
    }
}

impl std::fmt::Debug for DashboardController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardController")
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish()
    }
}

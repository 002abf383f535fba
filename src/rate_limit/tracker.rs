//! Update Quota Tracker
//!
//! Enforces "at most `max_updates` accepted profile mutations per rolling
//! window" from locally persisted history alone. The server does not enforce
//! this limit.

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

use super::clock::Clock;
use super::config::QuotaPolicy;
use super::history::{UpdateEvent, UpdateHistory};
use super::status::QuotaStatus;
use crate::session::SessionScoped;
use crate::storage::{lock, KeyValueStore, StorageKey};

/// Outcome of a consume attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaDecision {
    /// Whether the mutation may proceed
    pub allowed: bool,

    /// Remaining updates after this decision
    pub remaining: u32,

    /// When the next slot opens (if denied)
    pub next_slot_at: Option<DateTime<Utc>>,
}

impl QuotaDecision {
    /// Create an allowed decision
    pub fn allowed(remaining: u32) -> Self {
        Self {
            allowed: true,
            remaining,
            next_slot_at: None,
        }
    }

    /// Create a denied decision
    pub fn denied(next_slot_at: Option<DateTime<Utc>>) -> Self {
        Self {
            allowed: false,
            remaining: 0,
            next_slot_at,
        }
    }
}

/// Rolling-window quota on profile mutations
pub struct UpdateQuotaTracker {
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    policy: QuotaPolicy,
    history: Mutex<UpdateHistory>,
}

impl UpdateQuotaTracker {
    /// Create a tracker with an empty in-memory history
    ///
    /// Call [`load`](Self::load) to pick up persisted history.
    pub fn new(storage: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, policy: QuotaPolicy) -> Self {
        Self {
            storage,
            clock,
            policy,
            history: Mutex::new(UpdateHistory::new()),
        }
    }

    /// Create a tracker and load persisted history
    pub fn init(storage: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, policy: QuotaPolicy) -> Self {
        let tracker = Self::new(storage, clock, policy);
        tracker.load();
        tracker
    }

    /// Active policy
    pub fn policy(&self) -> QuotaPolicy {
        self.policy
    }

    /// Read persisted history, prune it and write the pruned set back
    pub fn load(&self) {
        let now = self.clock.now();
        let mut history = lock(&self.history);

        let mut loaded = match self.storage.get(StorageKey::ProfileUpdateHistory) {
            Ok(Some(raw)) => UpdateHistory::from_json(&raw).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed update history: {}", e);
                UpdateHistory::new()
            }),
            Ok(None) => UpdateHistory::new(),
            Err(e) => {
                tracing::warn!("Could not read update history: {}", e);
                UpdateHistory::new()
            }
        };

        let pruned = loaded.prune(now, self.policy.window());
        self.persist(&loaded);
        tracing::debug!(
            "Loaded update history: {} active, {} expired",
            loaded.len(),
            pruned
        );
        *history = loaded;
    }

    /// Updates still available in the current window
    ///
    /// Re-evaluated against the clock on every call. Expired events found
    /// here are also dropped from storage.
    pub fn remaining_quota(&self) -> u32 {
        let now = self.clock.now();
        let mut history = lock(&self.history);
        self.prune_and_persist(&mut history, now);
        self.remaining(&history)
    }

    /// Record a mutation if the quota allows it
    ///
    /// The check and the append happen under one lock; a denied attempt
    /// leaves the history untouched.
    pub fn try_consume(&self) -> QuotaDecision {
        let now = self.clock.now();
        let window = self.policy.window();
        let mut history = lock(&self.history);
        history.prune(now, window);

        if self.remaining(&history) == 0 {
            let next_slot_at = history.next_slot_at(self.policy.max_updates, window);
            tracing::info!(
                "Profile update denied: {} updates in the last {} days",
                history.len(),
                self.policy.window_days()
            );
            return QuotaDecision::denied(next_slot_at);
        }

        history.push(UpdateEvent::at(now));
        self.persist(&history);

        let remaining = self.remaining(&history);
        tracing::info!("Profile update recorded, {} remaining", remaining);
        QuotaDecision::allowed(remaining)
    }

    /// Snapshot of the quota for display
    pub fn status(&self) -> QuotaStatus {
        let now = self.clock.now();
        let window = self.policy.window();
        let mut history = lock(&self.history);
        self.prune_and_persist(&mut history, now);

        let remaining = self.remaining(&history);
        let next_slot_at = if remaining == 0 {
            history.next_slot_at(self.policy.max_updates, window)
        } else {
            None
        };

        QuotaStatus {
            timestamp: now,
            limit: self.policy.max_updates,
            used: history.len() as u32,
            remaining,
            window_days: self.policy.window_days(),
            next_slot_at,
            recent_updates: history.events().iter().map(|e| e.timestamp).collect(),
        }
    }

    /// Delete persisted history and reset in-memory state
    pub fn clear(&self) {
        let mut history = lock(&self.history);
        history.clear();
        if let Err(e) = self.storage.remove(StorageKey::ProfileUpdateHistory) {
            tracing::warn!("Failed to remove persisted update history: {}", e);
        }
        tracing::debug!("Update history cleared");
    }

    fn remaining(&self, history: &UpdateHistory) -> u32 {
        self.policy
            .max_updates
            .saturating_sub(history.len().min(u32::MAX as usize) as u32)
    }

    fn prune_and_persist(&self, history: &mut UpdateHistory, now: DateTime<Utc>) {
        if history.prune(now, self.policy.window()) > 0 {
            self.persist(history);
        }
    }

    fn persist(&self, history: &UpdateHistory) {
        if let Err(e) = self
            .storage
            .set(StorageKey::ProfileUpdateHistory, &history.to_json())
        {
            tracing::warn!("Update history kept in memory only: {}", e);
        }
    }
}

impl SessionScoped for UpdateQuotaTracker {
    fn on_session_cleared(&self) {
        self.clear();
    }
}

impl std::fmt::Debug for UpdateQuotaTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateQuotaTracker")
            .field("policy", &self.policy)
            .field("history", &*lock(&self.history))
            .finish()
    }
}

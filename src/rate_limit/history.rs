//! Update History
//!
//! Chronological record of accepted profile mutations, persisted as a JSON
//! array of epoch-millisecond integers.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// One accepted profile mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UpdateEvent {
    /// When the mutation was accepted
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl UpdateEvent {
    /// Create an event at `timestamp`
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self { timestamp }
    }

    /// Whether the event still counts against the quota at `now`
    ///
    /// Active means `now - timestamp < window`. Events stamped in the future
    /// (clock moved backwards) are therefore active.
    pub fn is_active(&self, now: DateTime<Utc>, window: TimeDelta) -> bool {
        now.signed_duration_since(self.timestamp) < window
    }

    /// When the event leaves the window
    ///
    /// `None` if that instant is past the representable range.
    pub fn expires_at(&self, window: TimeDelta) -> Option<DateTime<Utc>> {
        self.timestamp.checked_add_signed(window)
    }
}

/// Append-only sequence of update events
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateHistory {
    events: Vec<UpdateEvent>,
}

impl UpdateHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from events in insertion order
    pub fn from_events(events: Vec<UpdateEvent>) -> Self {
        Self { events }
    }

    /// Decode the persisted form
    ///
    /// Anything that is not a JSON array yields an error. Entries that are not
    /// representable timestamps are dropped.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let values: Vec<serde_json::Value> = serde_json::from_str(raw)?;
        let events = values
            .iter()
            .filter_map(|value| {
                let millis = value
                    .as_i64()
                    .or_else(|| value.as_f64().map(|f| f.trunc() as i64))?;
                DateTime::from_timestamp_millis(millis).map(UpdateEvent::at)
            })
            .collect::<Vec<_>>();

        if events.len() != values.len() {
            tracing::debug!(
                "Dropped {} unreadable update history entries",
                values.len() - events.len()
            );
        }
        Ok(Self { events })
    }

    /// Encode as a JSON array of epoch milliseconds
    pub fn to_json(&self) -> String {
        let millis: Vec<i64> = self
            .events
            .iter()
            .map(|e| e.timestamp.timestamp_millis())
            .collect();
        serde_json::Value::from(millis).to_string()
    }

    /// Drop events that are no longer active at `now`
    ///
    /// Returns the number of events removed.
    pub fn prune(&mut self, now: DateTime<Utc>, window: TimeDelta) -> usize {
        let before = self.events.len();
        self.events.retain(|e| e.is_active(now, window));
        before - self.events.len()
    }

    /// Append an event
    pub fn push(&mut self, event: UpdateEvent) {
        self.events.push(event);
    }

    /// Events in insertion order
    pub fn events(&self) -> &[UpdateEvent] {
        &self.events
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events are recorded
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove every event
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Instant at which the active count first drops below `limit`
    ///
    /// `None` when the history already holds fewer than `limit` events, or
    /// when an expiry falls outside the representable range.
    pub fn next_slot_at(&self, limit: u32, window: TimeDelta) -> Option<DateTime<Utc>> {
        let limit = limit as usize;
        if self.events.len() < limit {
            return None;
        }

        let mut expiries = self
            .events
            .iter()
            .map(|e| e.expires_at(window))
            .collect::<Option<Vec<_>>>()?;
        expiries.sort();
        expiries.get(self.events.len() - limit).copied()
    }
}

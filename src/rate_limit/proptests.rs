//! Property-Based Tests for the Update Quota
//!
//! # Running the Tests
//!
//! ```bash
//! cargo test --lib rate_limit::proptests
//! ```

use chrono::{DateTime, TimeDelta, Utc};
use proptest::prelude::*;
use std::sync::Arc;

use crate::rate_limit::clock::ManualClock;
use crate::rate_limit::config::QuotaPolicy;
use crate::rate_limit::history::{UpdateEvent, UpdateHistory};
use crate::rate_limit::tracker::UpdateQuotaTracker;
use crate::storage::MemoryStore;

const WEEK_MS: i64 = 7 * 24 * 60 * 60 * 1000;

fn at(millis: i64) -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + TimeDelta::milliseconds(millis)
}

proptest! {
    /// Within one window no more than `max_updates` attempts are accepted
    #[test]
    fn prop_at_most_max_updates_per_window(
        max_updates in 0u32..5,
        mut offsets in prop::collection::vec(0i64..WEEK_MS, 1..20)
    ) {
        offsets.sort();
        let clock = Arc::new(ManualClock::at_epoch());
        let tracker = UpdateQuotaTracker::new(
            Arc::new(MemoryStore::new()),
            clock.clone(),
            QuotaPolicy::from_days(max_updates, 7),
        );
        tracker.load();

        let mut accepted = 0u32;
        for offset in &offsets {
            clock.set(at(*offset));
            let used_before = tracker.status().used;
            let decision = tracker.try_consume();
            if decision.allowed {
                accepted += 1;
            } else {
                prop_assert_eq!(tracker.status().used, used_before);
            }
        }

        prop_assert_eq!(accepted, max_updates.min(offsets.len() as u32));
    }

    /// Pruning an already-pruned history at the same instant is a no-op
    #[test]
    fn prop_prune_is_idempotent(
        stamps in prop::collection::vec(-WEEK_MS..3 * WEEK_MS, 0..30),
        now in 0i64..2 * WEEK_MS,
        window_ms in 1i64..2 * WEEK_MS
    ) {
        let window = TimeDelta::milliseconds(window_ms);
        let mut history = UpdateHistory::from_events(
            stamps.iter().map(|s| UpdateEvent::at(at(*s))).collect()
        );

        history.prune(at(now), window);
        let once = history.clone();
        prop_assert_eq!(history.prune(at(now), window), 0);
        prop_assert_eq!(history, once);
    }

    /// Once every event is a full window old the quota is fully restored
    #[test]
    fn prop_expired_history_restores_quota(
        stamps in prop::collection::vec(0i64..WEEK_MS, 0..10),
        extra in 0i64..WEEK_MS
    ) {
        let clock = Arc::new(ManualClock::at_epoch());
        let tracker = UpdateQuotaTracker::new(
            Arc::new(MemoryStore::new()),
            clock.clone(),
            QuotaPolicy::default(),
        );
        for stamp in &stamps {
            clock.set(at(*stamp));
            tracker.try_consume();
        }

        let last = stamps.iter().copied().max().unwrap_or(0);
        clock.set(at(last + WEEK_MS + extra));
        prop_assert_eq!(tracker.remaining_quota(), 2);
    }
}

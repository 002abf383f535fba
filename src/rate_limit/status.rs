//! Quota Status
//!
//! Snapshot of the update quota for the presentation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Live quota state at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaStatus {
    /// When the snapshot was taken
    pub timestamp: DateTime<Utc>,

    /// Maximum updates per window
    pub limit: u32,

    /// Updates counted in the current window
    pub used: u32,

    /// Updates still available
    pub remaining: u32,

    /// Window length in days
    pub window_days: i64,

    /// When the next update becomes available (only while blocked)
    pub next_slot_at: Option<DateTime<Utc>>,

    /// Timestamps of the updates still counted
    pub recent_updates: Vec<DateTime<Utc>>,
}

impl QuotaStatus {
    /// Whether editing must be disabled
    pub fn is_blocked(&self) -> bool {
        self.remaining == 0
    }

    /// Message shown next to the edit action
    pub fn message(&self) -> String {
        if !self.is_blocked() {
            let noun = if self.remaining == 1 { "update" } else { "updates" };
            return format!(
                "{} profile {} remaining in the last {} days",
                self.remaining, noun, self.window_days
            );
        }

        match self.next_slot_at {
            Some(at) => format!(
                "Profile update limit reached ({} per {} days). Next update available {}",
                self.limit,
                self.window_days,
                at.format("%Y-%m-%d %H:%M UTC")
            ),
            None => format!(
                "Profile update limit reached ({} per {} days)",
                self.limit, self.window_days
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn status(remaining: u32, next_slot_at: Option<DateTime<Utc>>) -> QuotaStatus {
        QuotaStatus {
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
            limit: 2,
            used: 2 - remaining,
            remaining,
            window_days: 7,
            next_slot_at,
            recent_updates: Vec::new(),
        }
    }

    #[test]
    fn test_available_message() {
        assert_eq!(
            status(2, None).message(),
            "2 profile updates remaining in the last 7 days"
        );
        assert_eq!(
            status(1, None).message(),
            "1 profile update remaining in the last 7 days"
        );
        assert!(!status(1, None).is_blocked());
    }

    #[test]
    fn test_blocked_message() {
        let at = DateTime::<Utc>::UNIX_EPOCH + TimeDelta::days(7);
        let blocked = status(0, Some(at));
        assert!(blocked.is_blocked());
        assert_eq!(
            blocked.message(),
            "Profile update limit reached (2 per 7 days). Next update available 1970-01-08 00:00 UTC"
        );
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&status(1, None)).unwrap();
        assert!(json.contains("\"remaining\":1"));
    }
}

//! Quota Policy
//!
//! Limits applied to profile mutations.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// Default number of accepted updates per window
pub const MAX_UPDATES: u32 = 2;

/// Default window length in days
pub const WINDOW_DAYS: u32 = 7;

/// Rolling-window quota policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaPolicy {
    /// Maximum accepted mutations within one window
    pub max_updates: u32,

    /// Window length in milliseconds
    pub window_ms: i64,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self::from_days(MAX_UPDATES, WINDOW_DAYS)
    }
}

impl QuotaPolicy {
    /// Create a policy with a window of whole days
    pub fn from_days(max_updates: u32, window_days: u32) -> Self {
        Self {
            max_updates,
            window_ms: TimeDelta::days(i64::from(window_days)).num_milliseconds(),
        }
    }

    /// Create a policy with an arbitrary window
    pub fn new(max_updates: u32, window: TimeDelta) -> Self {
        Self {
            max_updates,
            window_ms: window.num_milliseconds(),
        }
    }

    /// Window length
    pub fn window(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.window_ms)
    }

    /// Window length in whole days, rounded down
    pub fn window_days(&self) -> i64 {
        self.window().num_days()
    }
}

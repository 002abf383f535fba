//! Wall-clock source for window arithmetic.

use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Mutex;

use crate::storage::lock;

/// Source of the current instant
pub trait Clock: Send + Sync {
    /// Current wall-clock time
    fn now(&self) -> DateTime<Utc>;
}

/// System wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Create a clock frozen at the Unix epoch
    pub fn at_epoch() -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Move the clock to `instant`, backwards moves included
    pub fn set(&self, instant: DateTime<Utc>) {
        *lock(&self.now) = instant;
    }

    /// Move the clock forward by `delta`
    pub fn advance(&self, delta: TimeDelta) {
        let mut now = lock(&self.now);
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *lock(&self.now)
    }
}

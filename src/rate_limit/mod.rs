//! Profile Update Quota
//!
//! This module limits how often the signed-in user may change their profile,
//! using only history persisted on this client.
//!
//! # Features
//!
//! - Rolling time window (no fixed reset boundaries)
//! - Quota re-evaluated against the clock on every read
//! - Check-and-record under a single lock
//! - History pruned on every load and write so storage never accumulates stale entries
//! - Cleared together with the session
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Update Quota Tracker                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────┐         │
//! │  │ QuotaPolicy │  │ Clock       │  │ QuotaStatus │         │
//! │  └─────────────┘  └─────────────┘  └─────────────┘         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────┐   │
//! │  │   UpdateHistory (in-memory + "profileUpdateHistory") │   │
//! │  └─────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod clock;
pub mod config;
pub mod history;
pub mod status;
pub mod tracker;

#[cfg(test)]
mod proptests;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{QuotaPolicy, MAX_UPDATES, WINDOW_DAYS};
pub use history::{UpdateEvent, UpdateHistory};
pub use status::QuotaStatus;
pub use tracker::{QuotaDecision, UpdateQuotaTracker};

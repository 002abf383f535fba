//! Profile Dashboard
//!
//! Orchestration between the session, the update quota and the remote API.
//! Rendering is left to the caller, which observes immutable state snapshots.

pub mod auth;
pub mod controller;
pub mod state;

#[cfg(test)]
pub(crate) mod mock;

pub use auth::AuthFlow;
pub use controller::{DashboardController, Observer, SubscriptionId};
pub use state::DashboardState;

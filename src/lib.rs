//! Profile Dashboard Client Library
//!
//! This library provides the client-side core of the user dashboard: the
//! persisted session token, the rolling-window quota on profile updates and
//! the dashboard state machine that composes them with the remote user API.

pub mod api;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod rate_limit;
pub mod session;
pub mod storage;

pub use client::Client;
pub use error::{ApiError, DashboardError, StorageError};

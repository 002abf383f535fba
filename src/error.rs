//! Error Types
//!
//! Error taxonomy shared by the session, quota and dashboard components.
//! Only `DashboardError` is ever shown to the user; storage problems are
//! absorbed by the components that own the persisted keys.

use chrono::{DateTime, Utc};

/// Errors raised by the durable local store
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Store is disabled or cannot be reached
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Persisted value could not be decoded
    #[error("Malformed persisted state under '{key}': {reason}")]
    Malformed { key: String, reason: String },

    /// Underlying file I/O failed
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned by the remote profile API
///
/// Any failed request lands in `NetworkOrServer`; callers never branch on the
/// status code to decide recovery.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// Request failed at the network layer or the server returned non-success
    #[error("{message}")]
    NetworkOrServer {
        /// HTTP status, when a response was received
        status: Option<u16>,
        /// Server-provided message, or a generic fallback
        message: String,
    },
}

impl ApiError {
    /// Create an error from a failed transport call (no response)
    pub fn transport(message: impl Into<String>) -> Self {
        ApiError::NetworkOrServer {
            status: None,
            message: message.into(),
        }
    }

    /// Create an error from a non-success response
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        ApiError::NetworkOrServer {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Message suitable for display
    pub fn message(&self) -> &str {
        match self {
            ApiError::NetworkOrServer { message, .. } => message,
        }
    }
}

/// Errors surfaced by the dashboard controller
#[derive(Debug, Clone, thiserror::Error)]
pub enum DashboardError {
    /// Local policy rejection; the network is never contacted
    #[error("Profile update limit reached ({remaining} remaining)")]
    QuotaExceeded {
        /// Remaining updates at the time of rejection (always 0 today)
        remaining: u32,
        /// When the next update slot opens, if known
        next_slot_at: Option<DateTime<Utc>>,
    },

    /// The profile service call failed
    #[error(transparent)]
    Service(#[from] ApiError),

    /// No token is held
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Action is not valid in the current state
    #[error("Cannot {action} while {from}")]
    InvalidTransition { from: &'static str, action: &'static str },
}

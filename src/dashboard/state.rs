//! Dashboard States
//!
//! Immutable snapshots handed to observers after every transition.

use crate::api::{Profile, ProfileUpdate};

/// State of the profile dashboard
///
/// ```text
/// Unauthenticated ─► Loading ─► Ready ─► Editing ─► Saving ─► Ready
///                       │                   ▲          │
///                       ▼                   └──────────┘ (save failed)
///                   LoggedOut ◄──────────── any state (logout)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardState {
    /// No session; the login page should be shown
    Unauthenticated,

    /// Fetching the profile
    Loading,

    /// Profile loaded
    Ready { profile: Profile },

    /// Edit form open
    Editing {
        profile: Profile,
        draft: ProfileUpdate,
        /// Error from the last failed save
        error: Option<String>,
    },

    /// Update request in flight
    Saving { profile: Profile, draft: ProfileUpdate },

    /// Session ended; terminal for this controller
    LoggedOut {
        /// Why the session ended, when not an explicit logout
        reason: Option<String>,
    },
}

impl DashboardState {
    /// Short name used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            DashboardState::Unauthenticated => "unauthenticated",
            DashboardState::Loading => "loading",
            DashboardState::Ready { .. } => "ready",
            DashboardState::Editing { .. } => "editing",
            DashboardState::Saving { .. } => "saving",
            DashboardState::LoggedOut { .. } => "logged out",
        }
    }

    /// Profile currently displayed, if any
    pub fn profile(&self) -> Option<&Profile> {
        match self {
            DashboardState::Ready { profile }
            | DashboardState::Editing { profile, .. }
            | DashboardState::Saving { profile, .. } => Some(profile),
            _ => None,
        }
    }

    /// Whether the presentation layer should send the user to the login page
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            DashboardState::Unauthenticated | DashboardState::LoggedOut { .. }
        )
    }
}

impl std::fmt::Display for DashboardState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

//! Service Traits
//!
//! Seams between the client core and the remote API. The HTTP implementation
//! lives in [`super::http`]; tests substitute in-memory mocks.

use async_trait::async_trait;

use super::types::{Credentials, Profile, ProfileUpdate, Registration};
use crate::error::ApiError;

/// Account creation and login
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account
    async fn register(&self, registration: &Registration) -> Result<(), ApiError>;

    /// Exchange credentials for a bearer token
    async fn login(&self, credentials: &Credentials) -> Result<String, ApiError>;
}

/// Profile of the signed-in user
///
/// Every non-success response is reported as the same error class.
#[async_trait]
pub trait ProfileService: Send + Sync {
    /// Fetch the current user
    async fn fetch_self(&self, token: &str) -> Result<Profile, ApiError>;

    /// Replace the mutable profile fields, returning the canonical profile
    async fn update_self(&self, token: &str, update: &ProfileUpdate) -> Result<Profile, ApiError>;
}

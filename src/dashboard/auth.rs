//! Registration, login and logout.

use std::sync::Arc;

use crate::api::http::LOGIN_FAILED;
use crate::api::{AuthService, Credentials, Registration};
use crate::error::ApiError;
use crate::session::SessionStore;

/// Account flows that create or end a session
pub struct AuthFlow {
    session: Arc<SessionStore>,
    auth: Arc<dyn AuthService>,
}

impl AuthFlow {
    pub fn new(session: Arc<SessionStore>, auth: Arc<dyn AuthService>) -> Self {
        Self { session, auth }
    }

    /// Create an account; the user must log in afterwards
    pub async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        self.auth.register(registration).await?;
        tracing::info!("Registered account {}", registration.email);
        Ok(())
    }

    /// Log in and store the issued token
    ///
    /// Any previous session, including its quota history, is cleared before
    /// the new token is written. A failed login leaves the current session as is.
    pub async fn login(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let token = self.auth.login(credentials).await?;
        if token.trim().is_empty() {
            tracing::warn!("Login response carried no token");
            return Err(ApiError::status(200, LOGIN_FAILED));
        }

        self.session.clear();
        self.session.set(&token);
        tracing::info!("Logged in as {}", credentials.email);
        Ok(())
    }

    /// End the current session
    pub fn logout(&self) {
        self.session.clear();
    }
}

//! In-memory profile service for controller tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::api::{AuthService, Credentials, Profile, ProfileService, ProfileUpdate, Registration};
use crate::error::ApiError;

pub(crate) struct MockProfileService {
    profile: Mutex<Profile>,
    token: Mutex<String>,
    fetch_error: Mutex<Option<ApiError>>,
    update_error: Mutex<Option<ApiError>>,
    last_token: Mutex<Option<String>>,
    fetch_calls: AtomicUsize,
    update_calls: AtomicUsize,
}

impl MockProfileService {
    pub(crate) fn new() -> Self {
        Self {
            profile: Mutex::new(Profile {
                id: Some("user-1".to_string()),
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            }),
            token: Mutex::new("tok-1".to_string()),
            fetch_error: Mutex::new(None),
            update_error: Mutex::new(None),
            last_token: Mutex::new(None),
            fetch_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn fail_fetch(&self, error: ApiError) {
        *self.fetch_error.lock().unwrap() = Some(error);
    }

    pub(crate) fn fail_update(&self, error: ApiError) {
        *self.update_error.lock().unwrap() = Some(error);
    }

    pub(crate) fn issue_token(&self, token: &str) {
        *self.token.lock().unwrap() = token.to_string();
    }

    pub(crate) fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_token(&self) -> Option<String> {
        self.last_token.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthService for MockProfileService {
    async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        if registration.email.is_empty() {
            return Err(ApiError::status(400, "Email is required"));
        }
        Ok(())
    }

    async fn login(&self, credentials: &Credentials) -> Result<String, ApiError> {
        if credentials.password != "correct-horse" {
            return Err(ApiError::status(401, "Invalid credentials"));
        }
        Ok(self.token.lock().unwrap().clone())
    }
}

#[async_trait]
impl ProfileService for MockProfileService {
    async fn fetch_self(&self, token: &str) -> Result<Profile, ApiError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_token.lock().unwrap() = Some(token.to_string());
        if let Some(err) = self.fetch_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.profile.lock().unwrap().clone())
    }

    async fn update_self(&self, token: &str, update: &ProfileUpdate) -> Result<Profile, ApiError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_token.lock().unwrap() = Some(token.to_string());
        if let Some(err) = self.update_error.lock().unwrap().clone() {
            return Err(err);
        }
        let mut profile = self.profile.lock().unwrap();
        profile.name = update.name.clone();
        profile.email = update.email.clone();
        Ok(profile.clone())
    }
}

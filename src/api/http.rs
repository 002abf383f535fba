//! HTTP Profile Service
//!
//! Talks to the user API over HTTP/JSON.
//!
//! # Endpoints
//!
//! | Operation     | Request                        | Success body   |
//! |---------------|--------------------------------|----------------|
//! | register      | `POST /api/users/register`     | ignored        |
//! | login         | `POST /api/users/login`        | `{"token"}`    |
//! | fetch self    | `GET /api/users/me` (bearer)   | profile        |
//! | update self   | `PUT /api/users/me` (bearer)   | profile        |
//!
//! Every request carries the configured `x-api-key` header. Error responses
//! may carry `{"message": "..."}`, which is surfaced verbatim; otherwise a
//! per-operation fallback message is used.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::service::{AuthService, ProfileService};
use super::types::{Credentials, ErrorBody, LoginResponse, Profile, ProfileUpdate, Registration};
use crate::error::ApiError;

pub const REGISTER_FAILED: &str = "Error registering";
pub const LOGIN_FAILED: &str = "Error logging in";
pub const FETCH_FAILED: &str = "Failed to load user data";
pub const UPDATE_FAILED: &str = "Failed to update profile";

/// Header carrying the client API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// HTTP implementation of the profile API
#[derive(Debug, Clone)]
pub struct HttpProfileService {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpProfileService {
    /// Create a client for the API at `base_url`
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            timeout,
        })
    }

    /// Send `key` as the `x-api-key` header on every request
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key.filter(|k| !k.is_empty());
        self
    }

    /// Base URL of the API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("{} {}", method, url);

        let builder = self.client.request(method, url);
        match &self.api_key {
            Some(key) => builder.header(API_KEY_HEADER, key),
            None => builder,
        }
    }

    /// Send a request and decode the success body
    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        fallback: &str,
    ) -> Result<T, ApiError> {
        let response = builder.send().await.map_err(|e| {
            tracing::warn!("Request failed: {}", e);
            ApiError::transport(fallback)
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response.text().await.ok(), fallback);
            tracing::warn!("Request rejected with {}: {}", status, message);
            return Err(ApiError::status(status.as_u16(), message));
        }

        response.json::<T>().await.map_err(|e| {
            tracing::warn!("Unreadable response body: {}", e);
            ApiError::status(status.as_u16(), fallback)
        })
    }

    /// Send a request whose success body is not needed
    async fn send_discarding(&self, builder: RequestBuilder, fallback: &str) -> Result<(), ApiError> {
        self.send::<serde_json::Value>(builder, fallback)
            .await
            .map(|_| ())
            .or_else(|e| match e {
                // Success with an empty or non-JSON body still counts
                ApiError::NetworkOrServer {
                    status: Some(code), ..
                } if (200..300).contains(&code) => Ok(()),
                other => Err(other),
            })
    }
}

/// Server-provided `message`, or `fallback`
fn error_message(body: Option<String>, fallback: &str) -> String {
    body.and_then(|text| serde_json::from_str::<ErrorBody>(&text).ok())
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[async_trait]
impl AuthService for HttpProfileService {
    async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        let builder = self
            .request(Method::POST, "/api/users/register")
            .json(registration);
        self.send_discarding(builder, REGISTER_FAILED).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<String, ApiError> {
        let builder = self.request(Method::POST, "/api/users/login").json(credentials);
        let response: LoginResponse = self.send(builder, LOGIN_FAILED).await?;
        Ok(response.token)
    }
}

#[async_trait]
impl ProfileService for HttpProfileService {
    async fn fetch_self(&self, token: &str) -> Result<Profile, ApiError> {
        let builder = self.request(Method::GET, "/api/users/me").bearer_auth(token);
        self.send(builder, FETCH_FAILED).await
    }

    async fn update_self(&self, token: &str, update: &ProfileUpdate) -> Result<Profile, ApiError> {
        let builder = self
            .request(Method::PUT, "/api/users/me")
            .bearer_auth(token)
            .json(update);
        self.send(builder, UPDATE_FAILED).await
    }
}

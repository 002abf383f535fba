//! Fake user API for integration tests.

#![allow(dead_code)]

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const API_KEY: &str = "test-key";

#[derive(Debug, Clone)]
pub struct User {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default)]
pub struct FakeApiState {
    pub users: HashMap<String, User>,
    pub tokens: HashMap<String, String>,
    pub fail_updates: bool,
    pub update_requests: usize,
    next_token: usize,
}

pub type Shared = Arc<Mutex<FakeApiState>>;

/// Running fake API
pub struct FakeApi {
    pub base_url: String,
    pub state: Shared,
}

impl FakeApi {
    /// Start the server on an ephemeral local port
    pub async fn spawn() -> Self {
        let state: Shared = Arc::default();
        let app = Router::new()
            .route("/api/users/register", post(register))
            .route("/api/users/login", post(login))
            .route("/api/users/me", get(me).put(update_me))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    /// Seed a user directly
    pub fn add_user(&self, name: &str, email: &str, password: &str) {
        self.state.lock().unwrap().users.insert(
            email.to_string(),
            User {
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            },
        );
    }

    /// Invalidate every issued token
    pub fn revoke_tokens(&self) {
        self.state.lock().unwrap().tokens.clear();
    }

    /// Make profile updates fail with a server message
    pub fn fail_updates(&self) {
        self.state.lock().unwrap().fail_updates = true;
    }

    pub fn update_requests(&self) -> usize {
        self.state.lock().unwrap().update_requests
    }

    pub fn user(&self, email: &str) -> Option<User> {
        self.state.lock().unwrap().users.get(email).cloned()
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn check_api_key(headers: &HeaderMap) -> Result<(), Response> {
    match headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        Some(API_KEY) => Ok(()),
        _ => Err(error(StatusCode::UNAUTHORIZED, "Invalid API key")),
    }
}

fn bearer_email(state: &FakeApiState, headers: &HeaderMap) -> Option<String> {
    let token = headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?;
    state.tokens.get(token).cloned()
}

#[derive(Deserialize)]
struct RegisterBody {
    name: String,
    email: String,
    password: String,
}

async fn register(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<RegisterBody>,
) -> Response {
    if let Err(rejection) = check_api_key(&headers) {
        return rejection;
    }
    let mut state = state.lock().unwrap();
    if state.users.contains_key(&body.email) {
        return error(StatusCode::BAD_REQUEST, "User already exists");
    }
    state.users.insert(
        body.email.clone(),
        User {
            name: body.name,
            email: body.email,
            password: body.password,
        },
    );
    (StatusCode::CREATED, Json(json!({ "message": "User registered" }))).into_response()
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<LoginBody>,
) -> Response {
    if let Err(rejection) = check_api_key(&headers) {
        return rejection;
    }
    let mut state = state.lock().unwrap();
    let valid = state
        .users
        .get(&body.email)
        .is_some_and(|u| u.password == body.password);
    if !valid {
        return error(StatusCode::BAD_REQUEST, "Invalid credentials");
    }

    state.next_token += 1;
    let token = format!("token-{}", state.next_token);
    state.tokens.insert(token.clone(), body.email);
    Json(json!({ "token": token })).into_response()
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(rejection) = check_api_key(&headers) {
        return rejection;
    }
    let state = state.lock().unwrap();
    let Some(email) = bearer_email(&state, &headers) else {
        return error(StatusCode::UNAUTHORIZED, "Not authorized");
    };
    let user = &state.users[&email];
    Json(json!({ "_id": email, "name": user.name, "email": user.email })).into_response()
}

#[derive(Deserialize)]
struct UpdateBody {
    name: String,
    email: String,
}

async fn update_me(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<UpdateBody>,
) -> Response {
    if let Err(rejection) = check_api_key(&headers) {
        return rejection;
    }
    let mut state = state.lock().unwrap();
    state.update_requests += 1;
    let Some(email) = bearer_email(&state, &headers) else {
        return error(StatusCode::UNAUTHORIZED, "Not authorized");
    };
    if state.fail_updates {
        return error(StatusCode::BAD_REQUEST, "Email already in use");
    }

    let Some(user) = state.users.get_mut(&email) else {
        return error(StatusCode::NOT_FOUND, "User not found");
    };
    user.name = body.name;
    user.email = body.email;
    let user = user.clone();
    Json(json!({ "_id": email, "name": user.name, "email": user.email })).into_response()
}

//! Remote User API
//!
//! # Architecture
//!
//! 1. **Types** (`types`): request and response payloads
//! 2. **Service** (`service`): `AuthService` / `ProfileService` traits the core depends on
//! 3. **HTTP** (`http`): reqwest implementation of both traits

pub mod http;
pub mod service;
pub mod types;

pub use http::HttpProfileService;
pub use service::{AuthService, ProfileService};
pub use types::{Credentials, Profile, ProfileUpdate, Registration};

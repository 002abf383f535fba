//! Session Management
//!
//! Holds the current bearer token and keeps it in the durable local store so
//! a restart does not force a new login.
//!
//! # Lifecycle
//!
//! ```text
//!   restore() ──► token? ──► set(token) on login
//!                    │
//!                    └──► clear() on logout / server rejection
//!                            │
//!                            └──► SessionScoped::on_session_cleared() (in attach order)
//! ```

pub mod store;

pub use store::{SessionScoped, SessionStore};

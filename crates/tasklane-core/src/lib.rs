//! Domain layer for Tasklane.
//!
//! Holds the entities (`Task`, `UserProfile`, `AuthSession`), the shared error
//! type and the traits the infrastructure layer implements (`RemoteClient`,
//! `SessionStore`).

pub mod auth;
pub mod config;
pub mod error;
pub mod remote;
pub mod task;
pub mod user;

// Re-export common error type
pub use error::{ErrorKind, Result, TasklaneError};

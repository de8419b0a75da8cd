//! Authentication domain module.
//!
//! # Module Structure
//!
//! - `model`: credentials, the paired session and the login/registration payloads
//! - `store`: the durable session store contract
//!
//! # Usage
//!
//! ```ignore
//! use tasklane_core::auth::{AuthSession, Credential, LoginRequest, SessionStore};
//! ```

mod model;
pub mod store;

// Re-export public API
pub use model::{AuthSession, Credential, LoginRequest, LoginResponse, RegisterRequest};
pub use store::SessionStore;

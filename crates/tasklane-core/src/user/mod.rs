//! User domain module.
//!
//! # Usage
//!
//! ```ignore
//! use tasklane_core::user::UserProfile;
//! ```

mod model;

// Re-export public API
pub use model::UserProfile;

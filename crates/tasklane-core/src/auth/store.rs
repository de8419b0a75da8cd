//! Session store trait.
//!
//! Defines the interface for persisting the current session across restarts.

use super::model::AuthSession;

/// Durable home of the current session.
///
/// None of these operations fail from the caller's point of view.
/// Implementations log storage problems and fall back to the absent session.
///
/// # Implementation Notes
///
/// - `save` must write profile and credential together
/// - `load` must return `None` for a half-present or unreadable session
pub trait SessionStore: Send + Sync {
    /// Reads the persisted session, if a complete and well-formed one exists.
    fn load(&self) -> Option<AuthSession>;

    /// Persists both halves of the session.
    fn save(&self, session: &AuthSession);

    /// Removes both halves of the session.
    fn clear(&self);
}

//! Durable session store.
//!
//! Keeps the session as two key-value entries: the raw bearer token and the
//! user profile serialized as JSON. Both are present or both are absent.

use std::sync::Arc;

use tasklane_core::auth::{AuthSession, Credential, SessionStore};
use tasklane_core::user::UserProfile;
use tracing::{debug, warn};

use crate::paths::TasklanePaths;
use crate::storage::{FileKeyValueStore, KeyValueStore};

/// Entry holding the bearer token.
pub const TOKEN_KEY: &str = "todo_token";
/// Entry holding the JSON-serialized user profile.
pub const USER_KEY: &str = "todo_user";

/// [`SessionStore`] over any [`KeyValueStore`].
///
/// Storage failures are logged and degrade to the absent session; they never
/// reach the caller.
pub struct PersistedSessionStore {
    entries: Arc<dyn KeyValueStore>,
}

impl PersistedSessionStore {
    pub fn new(entries: Arc<dyn KeyValueStore>) -> Self {
        Self { entries }
    }

    /// Opens the file-backed store at the standard session path.
    pub fn open(paths: &TasklanePaths) -> tasklane_core::Result<Self> {
        let path = paths.session_file()?;
        Ok(Self::new(Arc::new(FileKeyValueStore::new(path))))
    }

    fn read_entry(&self, key: &str) -> Option<Option<String>> {
        match self.entries.get(key) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Failed to read persisted session entry");
                None
            }
        }
    }

    /// Drops an invalid persisted session so the next start sees a clean slate.
    fn purge(&self, reason: &str) {
        warn!(reason, "Discarding invalid persisted session");
        self.clear();
    }
}

impl SessionStore for PersistedSessionStore {
    fn load(&self) -> Option<AuthSession> {
        let (token, user_raw) = match (self.read_entry(TOKEN_KEY), self.read_entry(USER_KEY)) {
            (Some(token), Some(user_raw)) => (token, user_raw),
            _ => {
                self.purge("unreadable session storage");
                return None;
            }
        };

        match (token, user_raw) {
            (None, None) => {
                debug!("No persisted session");
                None
            }
            (Some(token), Some(user_raw)) => {
                if token.trim().is_empty() {
                    self.purge("empty credential");
                    return None;
                }

                match serde_json::from_str::<UserProfile>(&user_raw) {
                    Ok(user) => Some(AuthSession::new(user, Credential::new(token))),
                    Err(e) => {
                        warn!(error = %e, "Persisted user profile is not well-formed");
                        self.purge("corrupted user profile");
                        None
                    }
                }
            }
            (Some(_), None) => {
                self.purge("credential without user profile");
                None
            }
            (None, Some(_)) => {
                self.purge("user profile without credential");
                None
            }
        }
    }

    fn save(&self, session: &AuthSession) {
        let user_json = match serde_json::to_string(&session.user) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize user profile; session not persisted");
                return;
            }
        };

        let entries = [
            (TOKEN_KEY, session.token.as_str().to_string()),
            (USER_KEY, user_json),
        ];
        if let Err(e) = self.entries.set_many(&entries) {
            warn!(error = %e, "Failed to persist session");
        }
    }

    fn clear(&self) {
        if let Err(e) = self.entries.remove_many(&[TOKEN_KEY, USER_KEY]) {
            warn!(error = %e, "Failed to clear persisted session");
        }
    }
}

//! Wire DTOs for the task API.
//!
//! Every payload the server sends is deserialized into one of these types
//! first and then validated into a domain model. Anything that does not fit
//! becomes a `Server`-kind error instead of leaking a half-formed entity.

mod auth;
mod task;
mod user_profile;

pub use auth::LoginResponseDto;
pub use task::TaskDto;
pub use user_profile::UserProfileDto;

use serde::Deserialize;

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorEnvelope {
    /// Extracts the `message` from a response body, if the body is an envelope.
    pub fn message_from(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .and_then(|envelope| envelope.message)
            .filter(|message| !message.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_from_envelope() {
        assert_eq!(
            ErrorEnvelope::message_from(r#"{"message":"Invalid credentials"}"#).as_deref(),
            Some("Invalid credentials")
        );
        assert_eq!(ErrorEnvelope::message_from(r#"{"error":"nope"}"#), None);
        assert_eq!(ErrorEnvelope::message_from("<html>502</html>"), None);
        assert_eq!(ErrorEnvelope::message_from(r#"{"message":""}"#), None);
    }
}

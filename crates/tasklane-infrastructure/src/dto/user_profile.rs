//! UserProfile DTO

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use tasklane_core::TasklaneError;
use tasklane_core::user::UserProfile;

/// User object as sent by the auth endpoints.
///
/// Document stores commonly expose the id as `_id`; both spellings are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfileDto {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl TryFrom<UserProfileDto> for UserProfile {
    type Error = TasklaneError;

    fn try_from(dto: UserProfileDto) -> Result<Self, Self::Error> {
        if dto.id.trim().is_empty() {
            return Err(TasklaneError::malformed("user id is empty"));
        }

        Ok(UserProfile {
            id: dto.id,
            name: dto.name,
            email: dto.email,
            extra: dto.extra,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_underscore_id() {
        let dto: UserProfileDto =
            serde_json::from_str(r#"{"_id":"u1","name":"Ann","email":"a@b.com"}"#).unwrap();
        let profile = UserProfile::try_from(dto).unwrap();
        assert_eq!(profile.id, "u1");
        assert!(profile.extra.is_empty());
    }

    #[test]
    fn test_rejects_empty_id() {
        let dto: UserProfileDto = serde_json::from_str(r#"{"id":" ","name":"Ann"}"#).unwrap();
        assert!(UserProfile::try_from(dto).is_err());
    }
}

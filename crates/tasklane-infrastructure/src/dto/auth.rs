//! Login DTO

use serde::Deserialize;

use tasklane_core::TasklaneError;
use tasklane_core::auth::{Credential, LoginResponse};

use super::UserProfileDto;

/// Body of a successful `POST /api/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponseDto {
    pub user: UserProfileDto,
    pub token: String,
}

impl TryFrom<LoginResponseDto> for LoginResponse {
    type Error = TasklaneError;

    fn try_from(dto: LoginResponseDto) -> Result<Self, Self::Error> {
        if dto.token.trim().is_empty() {
            return Err(TasklaneError::malformed("login returned an empty token"));
        }

        Ok(LoginResponse {
            user: dto.user.try_into()?,
            token: Credential::new(dto.token),
        })
    }
}

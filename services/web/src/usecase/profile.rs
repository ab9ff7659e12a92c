use paddock_domain::id::ExternalId;

use crate::domain::repository::UserRepository;
use crate::domain::types::User;
use crate::error::WebError;
use crate::usecase::login::validate_name_and_email;

// ── GetProfile ────────────────────────────────────────────────────────────────

pub struct GetProfileUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetProfileUseCase<U> {
    pub async fn execute(&self, external_id: &ExternalId) -> Result<User, WebError> {
        self.users
            .find_by_external_id(external_id)
            .await?
            .ok_or(WebError::UserNotFound)
    }
}

// ── UpdateProfile ─────────────────────────────────────────────────────────────

pub struct ProfileInput {
    pub name: String,
    pub email: String,
}

pub struct UpdateProfileUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> UpdateProfileUseCase<U> {
    /// Edit the session user's own name and email. The farm association is
    /// left alone.
    pub async fn execute(
        &self,
        external_id: &ExternalId,
        input: ProfileInput,
    ) -> Result<User, WebError> {
        validate_name_and_email(&input.name, &input.email)?;
        let user = self
            .users
            .find_by_external_id(external_id)
            .await?
            .ok_or(WebError::UserNotFound)?;
        let updated = self
            .users
            .update_profile(user.id, input.name.trim(), input.email.trim())
            .await?
            .ok_or(WebError::UserNotFound)?;
        tracing::info!(user_id = %updated.id, "profile updated");
        Ok(updated)
    }
}

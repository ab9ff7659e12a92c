use paddock_domain::id::{ExternalId, FarmId};

use crate::domain::repository::{FarmRepository, UserRepository};
use crate::domain::types::{Farm, User};
use crate::error::WebError;

const MAX_FARM_NAME_LEN: usize = 120;

fn validate_farm_name(name: &str) -> Result<&str, WebError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(WebError::InvalidForm("farm name is required"));
    }
    if name.chars().count() > MAX_FARM_NAME_LEN {
        return Err(WebError::InvalidForm("farm name is too long"));
    }
    Ok(name)
}

// ── CreateOrAttachFarm ────────────────────────────────────────────────────────

pub struct CreateFarmUseCase<U: UserRepository, F: FarmRepository> {
    pub users: U,
    pub farms: F,
}

impl<U: UserRepository, F: FarmRepository> CreateFarmUseCase<U, F> {
    /// Create the session user's farm, or return the one they already have.
    pub async fn execute(&self, external_id: &ExternalId, name: &str) -> Result<Farm, WebError> {
        let name = validate_farm_name(name)?;
        let user = self
            .users
            .find_by_external_id(external_id)
            .await?
            .ok_or(WebError::UserNotFound)?;
        self.farms.create_or_attach(name, user.id).await
    }
}

// ── AuthorizeFarm ─────────────────────────────────────────────────────────────

/// The session user together with the farm they are allowed to act on.
#[derive(Debug, Clone)]
pub struct FarmAccess {
    pub user: User,
    pub farm: Farm,
}

pub struct AuthorizeFarmUseCase<U: UserRepository, F: FarmRepository> {
    pub users: U,
    pub farms: F,
}

impl<U: UserRepository, F: FarmRepository> AuthorizeFarmUseCase<U, F> {
    /// Tenant check: the session user may only reach their own farm.
    pub async fn execute(
        &self,
        external_id: &ExternalId,
        farm_id: FarmId,
    ) -> Result<FarmAccess, WebError> {
        let user = self
            .users
            .find_by_external_id(external_id)
            .await?
            .ok_or(WebError::UserNotFound)?;
        if user.farm_id != Some(farm_id) {
            return Err(WebError::Forbidden);
        }
        let farm = self
            .farms
            .find_by_id(farm_id)
            .await?
            .ok_or(WebError::FarmNotFound)?;
        Ok(FarmAccess { user, farm })
    }
}

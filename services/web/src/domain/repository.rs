//! Persistence ports.
//!
//! Methods return `Send` futures so generic axum handlers over a [`Store`]
//! stay `Send`. Implementations may still be written as `async fn`.

use std::future::Future;

use paddock_domain::id::{ExternalId, FarmId, HorseId, UserId};

use crate::domain::types::{Farm, Horse, User};
use crate::error::WebError;

/// Identity store: users keyed by provider `external_id`.
pub trait UserRepository: Send + Sync {
    fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> impl Future<Output = Result<Option<User>, WebError>> + Send;

    fn find_by_id(&self, id: UserId) -> impl Future<Output = Result<Option<User>, WebError>> + Send;

    /// Insert or update the user for `external_id`. Name and email are always
    /// overwritten; `farm_id` is never touched. Safe under concurrent calls for
    /// the same `external_id`.
    fn upsert(
        &self,
        external_id: &ExternalId,
        name: &str,
        email: &str,
    ) -> impl Future<Output = Result<User, WebError>> + Send;

    /// Overwrite name and email of an existing user. `None` if `id` is unknown.
    fn update_profile(
        &self,
        id: UserId,
        name: &str,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, WebError>> + Send;
}

/// Tenancy store: farms and the user-to-farm association.
pub trait FarmRepository: Send + Sync {
    fn find_by_id(&self, id: FarmId) -> impl Future<Output = Result<Option<Farm>, WebError>> + Send;

    /// Return the user's farm if already set; otherwise create a farm owned by
    /// the user and point the user at it, atomically.
    ///
    /// Errors with [`WebError::UserNotFound`] if `user_id` does not exist.
    fn create_or_attach(
        &self,
        name: &str,
        user_id: UserId,
    ) -> impl Future<Output = Result<Farm, WebError>> + Send;
}

/// Horse records, always scoped by farm.
pub trait HorseRepository: Send + Sync {
    fn list_by_farm(
        &self,
        farm_id: FarmId,
    ) -> impl Future<Output = Result<Vec<Horse>, WebError>> + Send;

    fn find(
        &self,
        farm_id: FarmId,
        id: HorseId,
    ) -> impl Future<Output = Result<Option<Horse>, WebError>> + Send;

    fn create(&self, horse: &Horse) -> impl Future<Output = Result<(), WebError>> + Send;

    /// Returns `true` if deleted, `false` if no such horse on that farm.
    fn delete(
        &self,
        farm_id: FarmId,
        id: HorseId,
    ) -> impl Future<Output = Result<bool, WebError>> + Send;
}

/// Backing store handed to [`AppState`](crate::state::AppState): one source of
/// every repository.
pub trait Store: Clone + Send + Sync + 'static {
    type Users: UserRepository;
    type Farms: FarmRepository;
    type Horses: HorseRepository;

    fn user_repo(&self) -> Self::Users;
    fn farm_repo(&self) -> Self::Farms;
    fn horse_repo(&self) -> Self::Horses;

    /// Readiness check: succeeds when the store can serve queries.
    fn ping(&self) -> impl Future<Output = Result<(), WebError>> + Send;
}

use std::sync::Arc;

use paddock_auth_types::token::SessionJwtVerifier;

use crate::domain::provider::{CredentialKind, MagicLinkProvider};
use crate::domain::repository::Store;
use crate::usecase::session::AuthenticateSessionUseCase;

/// Session cookie and validation settings, fixed at startup.
pub struct SessionSettings {
    pub cookie_name: String,
    pub credential_kind: CredentialKind,
    pub trust_forwarded_proto: bool,
    /// Local verifier for session JWTs. `None` means every check goes to the provider.
    pub verifier: Option<SessionJwtVerifier>,
}

/// Shared application state passed to every handler via axum `State`.
///
/// Built once at startup; nothing in it is mutated per request.
pub struct AppState<S: Store> {
    pub store: S,
    pub provider: Arc<dyn MagicLinkProvider>,
    pub session: Arc<SessionSettings>,
}

impl<S: Store> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            provider: Arc::clone(&self.provider),
            session: Arc::clone(&self.session),
        }
    }
}

impl<S: Store> AppState<S> {
    pub fn user_repo(&self) -> S::Users {
        self.store.user_repo()
    }

    pub fn farm_repo(&self) -> S::Farms {
        self.store.farm_repo()
    }

    pub fn horse_repo(&self) -> S::Horses {
        self.store.horse_repo()
    }

    pub fn cookie_name(&self) -> &str {
        &self.session.cookie_name
    }

    pub fn authenticator(&self) -> AuthenticateSessionUseCase<'_> {
        AuthenticateSessionUseCase {
            provider: self.provider.as_ref(),
            verifier: self.session.verifier.as_ref(),
            credential_kind: self.session.credential_kind,
        }
    }
}

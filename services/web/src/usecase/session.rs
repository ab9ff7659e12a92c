use std::time::Duration;

use paddock_auth_types::token::{SessionJwtVerifier, looks_like_jwt};
use paddock_domain::id::ExternalId;

use crate::domain::provider::{CredentialKind, MagicLinkProvider};

/// Upper bound on any single provider call made while serving a request.
pub const PROVIDER_CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// A session that passed validation, with the credential the cookie should
/// now carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSession {
    pub external_id: ExternalId,
    pub credential: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// No credential was presented.
    Unauthenticated,
    /// A credential was presented and did not validate, or validation could not
    /// complete in time.
    Invalid,
    Authenticated(AuthenticatedSession),
}

// ── Authenticate ──────────────────────────────────────────────────────────────

/// Validates an inbound session credential. Never touches the database.
pub struct AuthenticateSessionUseCase<'a> {
    pub provider: &'a dyn MagicLinkProvider,
    pub verifier: Option<&'a SessionJwtVerifier>,
    pub credential_kind: CredentialKind,
}

impl AuthenticateSessionUseCase<'_> {
    pub async fn execute(&self, credential: Option<&str>) -> AuthOutcome {
        let Some(credential) = credential.filter(|c| !c.is_empty()) else {
            return AuthOutcome::Unauthenticated;
        };

        if let Some(session) = self.verify_locally(credential) {
            return AuthOutcome::Authenticated(session);
        }

        let validated =
            tokio::time::timeout(PROVIDER_CALL_TIMEOUT, self.provider.validate_session(credential))
                .await;
        let session = match validated {
            Ok(Ok(session)) => session,
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "session validation failed");
                return AuthOutcome::Invalid;
            }
            Err(_) => {
                tracing::warn!("session validation timed out");
                return AuthOutcome::Invalid;
            }
        };

        // A provider that rotates nothing leaves the presented credential valid.
        let credential = self
            .credential_kind
            .pick(&session)
            .unwrap_or_else(|| credential.to_owned());
        AuthOutcome::Authenticated(AuthenticatedSession {
            external_id: session.external_id,
            credential,
        })
    }

    /// Local JWT check, bounded by the verifier's trust window. `None` means
    /// "ask the provider", never "reject": a JWT past its window, even one that
    /// has not expired, always gets the remote check.
    fn verify_locally(&self, credential: &str) -> Option<AuthenticatedSession> {
        let verifier = self.verifier?;
        if !looks_like_jwt(credential) {
            return None;
        }
        match verifier.verify(credential) {
            Ok(claims) => Some(AuthenticatedSession {
                external_id: ExternalId::from(claims.sub),
                credential: credential.to_owned(),
            }),
            Err(e) => {
                tracing::debug!(error = %e, "local session jwt check failed, asking provider");
                None
            }
        }
    }
}

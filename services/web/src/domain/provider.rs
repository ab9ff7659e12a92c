//! Magic-link provider port.
//!
//! The provider owns sessions: it mints them when a callback token is
//! exchanged, validates and refreshes them, and revokes them on logout. The web
//! service only stores the credential in a cookie.

use async_trait::async_trait;

use paddock_domain::id::ExternalId;

/// A session as reported by the provider after a callback exchange or a
/// validation. Either credential may be empty if the provider omitted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSession {
    pub external_id: ExternalId,
    pub session_token: String,
    pub session_jwt: String,
}

/// Which provider credential the session cookie carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialKind {
    /// Opaque session token; every validation is a provider round trip.
    #[default]
    Token,
    /// Short-lived session JWT; may be verified locally while fresh.
    Jwt,
}

impl CredentialKind {
    /// Pick the credential to store in the cookie, falling back to the other
    /// one when the preferred credential is empty.
    pub fn pick(self, session: &ProviderSession) -> Option<String> {
        let (preferred, fallback) = match self {
            Self::Token => (&session.session_token, &session.session_jwt),
            Self::Jwt => (&session.session_jwt, &session.session_token),
        };
        [preferred, fallback]
            .into_iter()
            .find(|c| !c.is_empty())
            .cloned()
    }
}

impl std::str::FromStr for CredentialKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "token" => Ok(Self::Token),
            "jwt" => Ok(Self::Jwt),
            other => Err(format!("unknown session credential kind: {other}")),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider answered and said no: unknown/expired token, revoked session.
    #[error("rejected by provider")]
    Rejected,
    #[error("provider call timed out")]
    Timeout,
    #[error("provider transport error: {0}")]
    Transport(String),
    #[error("provider returned {status}")]
    Upstream { status: u16 },
    #[error("unexpected provider response: {0}")]
    Decode(String),
}

/// Capabilities the web service needs from the magic-link provider.
#[async_trait]
pub trait MagicLinkProvider: Send + Sync {
    /// Send (or reuse) a login link for `email`. Returns the provider user id,
    /// which exists before the link is clicked.
    async fn send_login_link(
        &self,
        email: &str,
        next: Option<&str>,
    ) -> Result<ExternalId, ProviderError>;

    /// Exchange the one-time token from a magic link for a new session.
    async fn exchange_callback_token(&self, token: &str) -> Result<ProviderSession, ProviderError>;

    /// Validate a session credential. The returned session carries refreshed
    /// credentials that supersede the one presented.
    async fn validate_session(&self, credential: &str) -> Result<ProviderSession, ProviderError>;

    async fn revoke_session(&self, credential: &str) -> Result<(), ProviderError>;
}

//! Local verification of provider-issued session JWTs.
//!
//! The magic-link provider signs a short-lived JWT (≤5 minutes) alongside every
//! session. Verifying it locally lets a request skip the provider round trip while
//! the JWT is fresh; once it leaves [`LOCAL_TRUST_WINDOW_SECS`] the caller must go
//! back to the provider.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

/// Claims read from a session JWT.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionClaims {
    /// Provider user id (the external subject id).
    pub sub: String,
    /// Expiration timestamp (seconds since UNIX epoch).
    pub exp: u64,
    /// Issued-at timestamp. Tokens without it are never trusted locally.
    #[serde(default)]
    pub iat: Option<u64>,
}

/// Longest a session JWT is accepted without a provider round trip, counted
/// from `iat`. Tokens whose `exp` lies further out than this are not trusted
/// locally either.
pub const LOCAL_TRUST_WINDOW_SECS: u64 = 300;

/// Errors returned by [`SessionJwtVerifier::verify`].
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("invalid verification key")]
    InvalidKey,
    #[error("token outside local trust window")]
    OutsideTrustWindow,
}

/// Verifies session JWTs against a fixed key.
///
/// Validation: exp checked with zero leeway, required claims `exp` + `sub`,
/// audience checked only when one is configured, and `iat`/`exp` both within
/// [`LOCAL_TRUST_WINDOW_SECS`] of now.
#[derive(Clone)]
pub struct SessionJwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl SessionJwtVerifier {
    /// Verifier for RS256 JWTs signed by the provider's private key.
    pub fn from_rsa_pem(pem: &[u8], audience: Option<&str>) -> Result<Self, AuthError> {
        let key = DecodingKey::from_rsa_pem(pem).map_err(|_| AuthError::InvalidKey)?;
        Ok(Self::new(key, Algorithm::RS256, audience))
    }

    /// Verifier for HS256 JWTs signed with a shared secret.
    pub fn from_secret(secret: &[u8], audience: Option<&str>) -> Self {
        Self::new(DecodingKey::from_secret(secret), Algorithm::HS256, audience)
    }

    fn new(key: DecodingKey, algorithm: Algorithm, audience: Option<&str>) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.required_spec_claims.clear();
        validation.set_required_spec_claims(&["exp", "sub"]);
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }
        Self { key, validation }
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        self.verify_at(token, unix_now())
    }

    /// [`verify`](Self::verify) with the trust window measured from `now`
    /// (seconds since UNIX epoch).
    pub fn verify_at(&self, token: &str, now: u64) -> Result<SessionClaims, AuthError> {
        let data = decode::<SessionClaims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature
                | jsonwebtoken::errors::ErrorKind::InvalidEcdsaKey
                | jsonwebtoken::errors::ErrorKind::InvalidRsaKey(_) => AuthError::InvalidSignature,
                _ => AuthError::Malformed,
            }
        })?;
        if data.claims.sub.is_empty() {
            return Err(AuthError::Malformed);
        }
        if !within_trust_window(&data.claims, now) {
            return Err(AuthError::OutsideTrustWindow);
        }
        Ok(data.claims)
    }
}

fn within_trust_window(claims: &SessionClaims, now: u64) -> bool {
    let Some(iat) = claims.iat else {
        return false;
    };
    now.saturating_sub(iat) <= LOCAL_TRUST_WINDOW_SECS
        && claims.exp.saturating_sub(now) <= LOCAL_TRUST_WINDOW_SECS
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Whether a credential has the three-segment shape of a compact JWT.
pub fn looks_like_jwt(credential: &str) -> bool {
    let mut segments = credential.split('.');
    let shaped = (0..3).all(|_| segments.next().is_some_and(|s| !s.is_empty()));
    shaped && segments.next().is_none()
}

//! Request-scoped identity of an authenticated session.

use axum::extract::FromRequestParts;
use http::StatusCode;
use http::request::Parts;

use paddock_domain::id::ExternalId;

/// The authenticated subject of the current request.
///
/// Inserted into the request extensions by the session gate after the session
/// credential validates. Extracting it on a route the gate does not cover
/// returns 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub external_id: ExternalId,
}

impl<S> FromRequestParts<S> for SessionIdentity
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let identity = parts.extensions.get::<SessionIdentity>().cloned();
        async move { identity.ok_or(StatusCode::UNAUTHORIZED) }
    }
}

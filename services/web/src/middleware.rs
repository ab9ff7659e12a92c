//! Session gate for tenant-scoped routes.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;

use paddock_auth_types::cookie::{is_secure_request, set_session_cookie};
use paddock_auth_types::identity::SessionIdentity;

use crate::domain::repository::Store;
use crate::error::WebError;
use crate::state::AppState;
use crate::usecase::login::LOGIN_PATH;
use crate::usecase::session::AuthOutcome;

/// Authenticate the session cookie before the handler runs.
///
/// - no cookie: 303 to `/login`, or 401 JSON for clients that only accept JSON
/// - cookie that does not validate: 401, never a redirect
/// - valid: the handler sees a [`SessionIdentity`] and its response carries the
///   refreshed session cookie
pub async fn require_session<S: Store>(
    State(state): State<AppState<S>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let secure = is_secure_request(
        request.headers(),
        request.uri(),
        state.session.trust_forwarded_proto,
    );
    let credential = jar.get(state.cookie_name()).map(|c| c.value().to_owned());

    match state.authenticator().execute(credential.as_deref()).await {
        AuthOutcome::Unauthenticated => {
            if wants_json(request.headers()) {
                WebError::Unauthenticated.into_response()
            } else {
                Redirect::to(LOGIN_PATH).into_response()
            }
        }
        AuthOutcome::Invalid => WebError::InvalidSession.into_response(),
        AuthOutcome::Authenticated(session) => {
            request.extensions_mut().insert(SessionIdentity {
                external_id: session.external_id,
            });
            let response = next.run(request).await;
            let jar = set_session_cookie(jar, state.cookie_name(), session.credential, secure);
            (jar, response).into_response()
        }
    }
}

/// Whether the client asked for JSON and not for an HTML page.
pub fn wants_json(headers: &HeaderMap) -> bool {
    let accept = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    accept.contains("application/json") && !accept.contains("text/html")
}

use axum::{
    Form,
    extract::{Query, State},
    http::{HeaderMap, Uri},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use paddock_auth_types::cookie::{clear_session_cookie, is_secure_request, set_session_cookie};

use crate::domain::repository::Store;
use crate::state::AppState;
use crate::usecase::login::{
    ConsumeCallbackUseCase, IssueLoginLinkInput, IssueLoginLinkUseCase, LogoutUseCase,
    ResolveHomeUseCase, is_safe_next,
};
use crate::usecase::session::AuthOutcome;
use crate::views::{self, IndexPage, LoginPage, LoginSentPage, error_message};

fn session_credential<S: Store>(state: &AppState<S>, jar: &CookieJar) -> Option<String> {
    jar.get(state.cookie_name()).map(|c| c.value().to_owned())
}

// ── GET / ─────────────────────────────────────────────────────────────────────

pub async fn index() -> Response {
    views::page(&IndexPage { app_name: "Paddock" })
}

// ── GET /login ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// Login form, or a redirect home when the session is already valid.
///
/// Lookup failures after a valid session fall back to the form.
pub async fn render_login<S: Store>(
    State(state): State<AppState<S>>,
    jar: CookieJar,
    headers: HeaderMap,
    uri: Uri,
    Query(query): Query<LoginQuery>,
) -> Response {
    let form = LoginPage {
        next: query.next.filter(|n| is_safe_next(n)),
        ..Default::default()
    };
    let credential = session_credential(&state, &jar);
    let AuthOutcome::Authenticated(session) =
        state.authenticator().execute(credential.as_deref()).await
    else {
        return views::page(&form);
    };

    let secure = is_secure_request(&headers, &uri, state.session.trust_forwarded_proto);
    let jar = set_session_cookie(jar, state.cookie_name(), session.credential, secure);

    let usecase = ResolveHomeUseCase {
        users: state.user_repo(),
    };
    match usecase.execute(&session.external_id).await {
        Ok(Some(home)) => (jar, Redirect::to(&home.path())).into_response(),
        // Link was issued but the local user never materialized: let them
        // submit the form again.
        Ok(None) => (jar, views::page(&form)).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "login redirect lookup failed, showing form");
            (jar, views::page(&form)).into_response()
        }
    }
}

// ── POST /login ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub next: Option<String>,
}

pub async fn issue_link<S: Store>(
    State(state): State<AppState<S>>,
    Form(form): Form<LoginForm>,
) -> Response {
    let usecase = IssueLoginLinkUseCase {
        users: state.user_repo(),
        provider: state.provider.as_ref(),
    };
    let input = IssueLoginLinkInput {
        name: form.name.clone(),
        email: form.email.clone(),
        next: form.next.clone(),
    };
    match usecase.execute(input).await {
        Ok(user) => views::page(&LoginSentPage { email: user.email }),
        Err(e) => {
            let page = LoginPage {
                name: form.name,
                email: form.email,
                next: form.next.filter(|n| is_safe_next(n)),
                error: Some(error_message(&e)),
            };
            views::render_with_error(&page, &e)
        }
    }
}

// ── GET /auth/callback ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CallbackQuery {
    pub token: Option<String>,
    pub next: Option<String>,
}

pub async fn consume_callback<S: Store>(
    State(state): State<AppState<S>>,
    jar: CookieJar,
    headers: HeaderMap,
    uri: Uri,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let usecase = ConsumeCallbackUseCase {
        users: state.user_repo(),
        provider: state.provider.as_ref(),
        credential_kind: state.session.credential_kind,
    };
    match usecase
        .execute(query.token.as_deref(), query.next.as_deref())
        .await
    {
        Ok(outcome) => {
            let secure = is_secure_request(&headers, &uri, state.session.trust_forwarded_proto);
            let jar = set_session_cookie(jar, state.cookie_name(), outcome.credential, secure);
            (jar, Redirect::to(&outcome.redirect)).into_response()
        }
        Err(e) => {
            let page = LoginPage {
                error: Some(error_message(&e)),
                ..Default::default()
            };
            views::render_with_error(&page, &e)
        }
    }
}

// ── POST /logout ──────────────────────────────────────────────────────────────

/// Revoke (best effort), clear the cookie, go home. Never fails.
pub async fn logout<S: Store>(
    State(state): State<AppState<S>>,
    jar: CookieJar,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let credential = session_credential(&state, &jar);
    LogoutUseCase {
        provider: state.provider.as_ref(),
    }
    .execute(credential.as_deref())
    .await;

    let secure = is_secure_request(&headers, &uri, state.session.trust_forwarded_proto);
    let jar = clear_session_cookie(jar, state.cookie_name(), secure);
    (jar, Redirect::to("/")).into_response()
}

use paddock_domain::id::ExternalId;

use crate::domain::provider::{CredentialKind, MagicLinkProvider};
use crate::domain::repository::UserRepository;
use crate::domain::types::{Home, User};
use crate::error::WebError;
use crate::usecase::session::PROVIDER_CALL_TIMEOUT;

/// Where a callback without a usable local user or `next` lands.
pub const LOGIN_PATH: &str = "/login";

/// Whether `next` is a same-origin path that is safe to redirect to.
///
/// Accepts `/farm/...`; rejects `//evil.example`, `/\evil.example`, absolute
/// URLs, and anything not starting with `/`.
pub fn is_safe_next(next: &str) -> bool {
    next.starts_with('/')
        && !next.starts_with("//")
        && !next.contains('\\')
        && !next.chars().any(char::is_control)
}

// ── IssueLoginLink ────────────────────────────────────────────────────────────

pub struct IssueLoginLinkInput {
    pub name: String,
    pub email: String,
    pub next: Option<String>,
}

impl IssueLoginLinkInput {
    fn validate(&self) -> Result<(), WebError> {
        validate_name_and_email(&self.name, &self.email)
    }
}

/// Shared by the login form and the profile form.
pub(crate) fn validate_name_and_email(name: &str, email: &str) -> Result<(), WebError> {
    if name.trim().is_empty() {
        return Err(WebError::InvalidForm("name is required"));
    }
    let email = email.trim();
    if email.is_empty() {
        return Err(WebError::InvalidForm("email is required"));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(WebError::InvalidForm("email is not valid")),
    }
}

pub struct IssueLoginLinkUseCase<'a, U: UserRepository> {
    pub users: U,
    pub provider: &'a dyn MagicLinkProvider,
}

impl<U: UserRepository> IssueLoginLinkUseCase<'_, U> {
    /// Send the magic link, then materialize the local user.
    ///
    /// A send failure creates no local state. An upsert failure after a
    /// successful send is an internal error; the link is already out, and
    /// re-submitting the form retries the upsert.
    pub async fn execute(&self, input: IssueLoginLinkInput) -> Result<User, WebError> {
        input.validate()?;
        let name = input.name.trim();
        let email = input.email.trim();
        let next = input.next.as_deref().filter(|n| is_safe_next(n));

        let external_id = match tokio::time::timeout(
            PROVIDER_CALL_TIMEOUT,
            self.provider.send_login_link(email, next),
        )
        .await
        {
            Ok(Ok(id)) => id,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "send login link failed");
                return Err(WebError::LinkNotSent);
            }
            Err(_) => {
                tracing::warn!("send login link timed out");
                return Err(WebError::LinkNotSent);
            }
        };

        self.users.upsert(&external_id, name, email).await
    }
}

// ── ResolveHome ───────────────────────────────────────────────────────────────

pub struct ResolveHomeUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ResolveHomeUseCase<U> {
    /// `None` when no local user exists for the identity yet.
    pub async fn execute(&self, external_id: &ExternalId) -> Result<Option<Home>, WebError> {
        let user = self.users.find_by_external_id(external_id).await?;
        Ok(user.as_ref().map(Home::for_user))
    }
}

// ── ConsumeCallback ───────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct CallbackOutcome {
    /// Credential to store in the session cookie.
    pub credential: String,
    /// Path to redirect to.
    pub redirect: String,
}

pub struct ConsumeCallbackUseCase<'a, U: UserRepository> {
    pub users: U,
    pub provider: &'a dyn MagicLinkProvider,
    pub credential_kind: CredentialKind,
}

impl<U: UserRepository> ConsumeCallbackUseCase<'_, U> {
    pub async fn execute(
        &self,
        token: Option<&str>,
        next: Option<&str>,
    ) -> Result<CallbackOutcome, WebError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(WebError::MissingToken)?;

        let session = match tokio::time::timeout(
            PROVIDER_CALL_TIMEOUT,
            self.provider.exchange_callback_token(token),
        )
        .await
        {
            Ok(Ok(session)) => session,
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "callback token exchange failed");
                return Err(WebError::InvalidLink);
            }
            Err(_) => {
                tracing::warn!("callback token exchange timed out");
                return Err(WebError::InvalidLink);
            }
        };
        let credential = self
            .credential_kind
            .pick(&session)
            .ok_or(WebError::InvalidLink)?;

        let redirect = match next.filter(|n| is_safe_next(n)) {
            Some(next) => next.to_owned(),
            None => self.farm_aware_target(&session.external_id).await,
        };
        Ok(CallbackOutcome {
            credential,
            redirect,
        })
    }

    /// The session is already minted at this point, so lookup problems send the
    /// user to the login page (which short-circuits once the user exists)
    /// instead of failing the callback.
    async fn farm_aware_target(&self, external_id: &ExternalId) -> String {
        match self.users.find_by_external_id(external_id).await {
            Ok(Some(user)) => Home::for_user(&user).path(),
            Ok(None) => {
                tracing::warn!(%external_id, "callback for identity without a local user");
                LOGIN_PATH.to_owned()
            }
            Err(e) => {
                e.report();
                LOGIN_PATH.to_owned()
            }
        }
    }
}

// ── Logout ────────────────────────────────────────────────────────────────────

pub struct LogoutUseCase<'a> {
    pub provider: &'a dyn MagicLinkProvider,
}

impl LogoutUseCase<'_> {
    /// Best-effort revoke. Never fails.
    pub async fn execute(&self, credential: Option<&str>) {
        let Some(credential) = credential.filter(|c| !c.is_empty()) else {
            return;
        };
        match tokio::time::timeout(PROVIDER_CALL_TIMEOUT, self.provider.revoke_session(credential))
            .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "session revoke failed"),
            Err(_) => tracing::warn!("session revoke timed out"),
        }
    }
}

//! HTTP client for a Stytch-compatible magic-link provider.

use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use url::Url;

use paddock_auth_types::token::looks_like_jwt;
use paddock_domain::id::ExternalId;

use crate::domain::provider::{MagicLinkProvider, ProviderError, ProviderSession};

/// Per-request timeout for provider calls.
pub const PROVIDER_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

const CALLBACK_PATH: &str = "/auth/callback";

pub struct HttpMagicLinkProvider {
    client: Client,
    api_url: Url,
    project_id: String,
    secret: String,
    callback_url: Url,
    session_duration_minutes: u32,
}

impl HttpMagicLinkProvider {
    pub fn new(
        api_url: &str,
        project_id: &str,
        secret: &str,
        public_base_url: &str,
        session_duration_minutes: u32,
    ) -> anyhow::Result<Self> {
        Self::with_timeout(
            api_url,
            project_id,
            secret,
            public_base_url,
            session_duration_minutes,
            PROVIDER_HTTP_TIMEOUT,
        )
    }

    pub fn with_timeout(
        api_url: &str,
        project_id: &str,
        secret: &str,
        public_base_url: &str,
        session_duration_minutes: u32,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("build provider http client")?;
        let api_url = Url::parse(api_url).context("parse MAGIC_LINK_API_URL")?;
        let callback_url = Url::parse(public_base_url)
            .and_then(|base| base.join(CALLBACK_PATH))
            .context("parse PUBLIC_BASE_URL")?;
        Ok(Self {
            client,
            api_url,
            project_id: project_id.to_owned(),
            secret: secret.to_owned(),
            callback_url,
            session_duration_minutes,
        })
    }

    /// Magic-link target: `{PUBLIC_BASE_URL}/auth/callback[?next=...]`.
    pub fn callback_url(&self, next: Option<&str>) -> String {
        let mut url = self.callback_url.clone();
        if let Some(next) = next {
            url.query_pairs_mut().append_pair("next", next);
        }
        url.into()
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ProviderError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self
            .api_url
            .join(path)
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        let response = self
            .client
            .post(url)
            .basic_auth(&self.project_id, Some(&self.secret))
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_client_error() {
            tracing::debug!(path, status = status.as_u16(), "provider rejected request");
            return Err(ProviderError::Rejected);
        }
        if !status.is_success() {
            tracing::warn!(path, status = status.as_u16(), "provider upstream error");
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
            });
        }
        response
            .json::<R>()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }

    /// Provider field name for a credential, chosen by its shape.
    fn credential_field(credential: &str) -> CredentialField<'_> {
        if looks_like_jwt(credential) {
            CredentialField {
                session_token: None,
                session_jwt: Some(credential),
            }
        } else {
            CredentialField {
                session_token: Some(credential),
                session_jwt: None,
            }
        }
    }
}

fn transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Transport(e.to_string())
    }
}

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct LoginOrCreateRequest<'a> {
    email: &'a str,
    login_magic_link_url: &'a str,
    signup_magic_link_url: &'a str,
}

#[derive(Deserialize)]
struct LoginOrCreateResponse {
    user_id: String,
}

#[derive(Serialize)]
struct AuthenticateTokenRequest<'a> {
    token: &'a str,
    session_duration_minutes: u32,
}

#[derive(Deserialize)]
struct AuthenticateTokenResponse {
    user_id: String,
    #[serde(default)]
    session_token: String,
    #[serde(default)]
    session_jwt: String,
}

#[derive(Serialize)]
struct CredentialField<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    session_token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_jwt: Option<&'a str>,
}

#[derive(Serialize)]
struct AuthenticateSessionRequest<'a> {
    #[serde(flatten)]
    credential: CredentialField<'a>,
    session_duration_minutes: u32,
}

#[derive(Deserialize)]
struct SessionBody {
    user_id: String,
}

#[derive(Deserialize)]
struct AuthenticateSessionResponse {
    session: SessionBody,
    #[serde(default)]
    session_token: String,
    #[serde(default)]
    session_jwt: String,
}

#[derive(Deserialize)]
struct Ignored {}

fn external_id(user_id: String) -> Result<ExternalId, ProviderError> {
    if user_id.is_empty() {
        return Err(ProviderError::Decode("empty user_id".to_owned()));
    }
    Ok(ExternalId::from(user_id))
}

#[async_trait]
impl MagicLinkProvider for HttpMagicLinkProvider {
    async fn send_login_link(
        &self,
        email: &str,
        next: Option<&str>,
    ) -> Result<ExternalId, ProviderError> {
        let callback = self.callback_url(next);
        let response: LoginOrCreateResponse = self
            .post(
                "/v1/magic_links/email/login_or_create",
                &LoginOrCreateRequest {
                    email,
                    login_magic_link_url: &callback,
                    signup_magic_link_url: &callback,
                },
            )
            .await?;
        external_id(response.user_id)
    }

    async fn exchange_callback_token(&self, token: &str) -> Result<ProviderSession, ProviderError> {
        let response: AuthenticateTokenResponse = self
            .post(
                "/v1/magic_links/authenticate",
                &AuthenticateTokenRequest {
                    token,
                    session_duration_minutes: self.session_duration_minutes,
                },
            )
            .await?;
        Ok(ProviderSession {
            external_id: external_id(response.user_id)?,
            session_token: response.session_token,
            session_jwt: response.session_jwt,
        })
    }

    async fn validate_session(&self, credential: &str) -> Result<ProviderSession, ProviderError> {
        let response: AuthenticateSessionResponse = self
            .post(
                "/v1/sessions/authenticate",
                &AuthenticateSessionRequest {
                    credential: Self::credential_field(credential),
                    session_duration_minutes: self.session_duration_minutes,
                },
            )
            .await?;
        Ok(ProviderSession {
            external_id: external_id(response.session.user_id)?,
            session_token: response.session_token,
            session_jwt: response.session_jwt,
        })
    }

    async fn revoke_session(&self, credential: &str) -> Result<(), ProviderError> {
        let _: Ignored = self
            .post("/v1/sessions/revoke", &Self::credential_field(credential))
            .await?;
        Ok(())
    }
}

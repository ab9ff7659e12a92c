use std::time::Duration;

use paddock_auth_types::cookie::DEFAULT_SESSION_COOKIE;

use crate::domain::provider::CredentialKind;

const DEFAULT_API_URL: &str = "https://test.stytch.com";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:4242";
const DEFAULT_WEB_PORT: u16 = 4242;
const DEFAULT_SESSION_DURATION_MINUTES: u32 = 60;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Startup configuration errors. Any of these stops the process before it
/// binds a listener.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Web service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Magic-link provider project id. Also the expected session JWT audience.
    pub project_id: String,
    /// Magic-link provider secret.
    pub secret: String,
    /// Provider API base URL (default `https://test.stytch.com`).
    pub api_url: String,
    /// External origin used to build magic-link callback URLs.
    pub public_base_url: String,
    /// TCP port to listen on (default 4242). Env var: `WEB_PORT`.
    pub web_port: u16,
    pub session_cookie_name: String,
    pub session_credential: CredentialKind,
    /// RS256 public key (PEM) for local session JWT verification.
    pub session_jwt_public_key: Option<String>,
    pub session_duration_minutes: u32,
    pub trust_forwarded_proto: bool,
    pub request_timeout: Duration,
}

impl WebConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            project_id: required("MAGIC_LINK_PROJECT_ID")?,
            secret: required("MAGIC_LINK_SECRET")?,
            api_url: get("MAGIC_LINK_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_owned()),
            public_base_url: get("PUBLIC_BASE_URL")
                .unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.to_owned()),
            web_port: parse_or(get("WEB_PORT"), "WEB_PORT", DEFAULT_WEB_PORT)?,
            session_cookie_name: get("SESSION_COOKIE_NAME")
                .unwrap_or_else(|| DEFAULT_SESSION_COOKIE.to_owned()),
            session_credential: parse_or(
                get("SESSION_CREDENTIAL"),
                "SESSION_CREDENTIAL",
                CredentialKind::Token,
            )?,
            session_jwt_public_key: get("SESSION_JWT_PUBLIC_KEY"),
            session_duration_minutes: parse_or(
                get("SESSION_DURATION_MINUTES"),
                "SESSION_DURATION_MINUTES",
                DEFAULT_SESSION_DURATION_MINUTES,
            )?,
            trust_forwarded_proto: parse_or(
                get("TRUST_FORWARDED_PROTO"),
                "TRUST_FORWARDED_PROTO",
                true,
            )?,
            request_timeout: Duration::from_secs(parse_or(
                get("REQUEST_TIMEOUT_SECS"),
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: v }),
    }
}

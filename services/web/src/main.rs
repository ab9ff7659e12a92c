use std::sync::Arc;

use anyhow::Context as _;
use sea_orm::{ConnectOptions, Database};
use tracing::info;

use paddock_auth_types::token::SessionJwtVerifier;
use paddock_core::tracing::init_tracing;
use paddock_web::config::WebConfig;
use paddock_web::domain::provider::CredentialKind;
use paddock_web::infra::db::DbStore;
use paddock_web::infra::provider::HttpMagicLinkProvider;
use paddock_web::router::build_router;
use paddock_web::state::{AppState, SessionSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = WebConfig::from_env().context("load configuration")?;

    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .connect_timeout(std::time::Duration::from_secs(5))
        .acquire_timeout(std::time::Duration::from_secs(5))
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .context("connect to database")?;

    let provider = HttpMagicLinkProvider::new(
        &config.api_url,
        &config.project_id,
        &config.secret,
        &config.public_base_url,
        config.session_duration_minutes,
    )?;

    let verifier = match (&config.session_jwt_public_key, config.session_credential) {
        (Some(pem), CredentialKind::Jwt) => Some(
            SessionJwtVerifier::from_rsa_pem(pem.as_bytes(), Some(&config.project_id))
                .context("parse SESSION_JWT_PUBLIC_KEY")?,
        ),
        _ => None,
    };

    let state = AppState {
        store: DbStore { db },
        provider: Arc::new(provider),
        session: Arc::new(SessionSettings {
            cookie_name: config.session_cookie_name.clone(),
            credential_kind: config.session_credential,
            trust_forwarded_proto: config.trust_forwarded_proto,
            verifier,
        }),
    };

    let router = build_router(state, config.request_timeout);
    let addr = format!("0.0.0.0:{}", config.web_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;

    info!(
        %addr,
        credential = ?config.session_credential,
        local_jwt = config.session_jwt_public_key.is_some(),
        "paddock web listening"
    );
    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
